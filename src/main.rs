//! MinimaxChess UCI Chess Engine

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use minimax_chess::config::{EngineConfig, SearchAlgorithm};
use minimax_chess::uci::UCI;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Opening book file
    #[arg(long)]
    book: Option<PathBuf>,

    /// Search depth when no clock is given
    #[arg(long)]
    depth: Option<u32>,

    /// Transposition table ceiling in MB
    #[arg(long)]
    hash: Option<usize>,

    /// minimax, alphabeta or alphabetatt
    #[arg(long, default_value = "alphabetatt")]
    algorithm: SearchAlgorithm,

    #[arg(long)]
    no_quiescence: bool,

    #[arg(long)]
    no_ordering: bool,

    #[arg(long)]
    no_iterative_deepening: bool,
}

impl Args {
    fn config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            algorithm: self.algorithm,
            default_depth: self.depth.unwrap_or(defaults.default_depth).max(1),
            tt_max_mb: self.hash.unwrap_or(defaults.tt_max_mb).max(1),
            iterative_deepening: !self.no_iterative_deepening,
            quiescence: !self.no_quiescence,
            move_ordering: !self.no_ordering,
            book_path: self.book.clone(),
            ..defaults
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .write_style(env_logger::WriteStyle::Never)
    .init();

    let mut uci = UCI::with_config(args.config())?;
    uci.run()?;
    Ok(())
}
