use log::{debug, error, warn};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use vampirc_uci::uci::{UciSearchControl, UciTimeControl};
use vampirc_uci::{parser, UciMessage};

use crate::config::EngineConfig;
use crate::core::{uci_string, Board};
use crate::engine::book::OpeningBook;
use crate::engine::eval::Phase;
use crate::engine::search::{pv, SearchLimits, Searcher};
use crate::error::EngineResult;

const ENGINE_NAME: &str = concat!("MinimaxChess ", env!("CARGO_PKG_VERSION"));

/// A `go` running on its own thread. The searcher travels with it and comes
/// back through the join handle.
struct SearchThread {
    handle: JoinHandle<Searcher>,
    stop: Arc<AtomicBool>,
    infinite: bool,
}

pub struct UCI {
    pub board: Board,
    searcher: Option<Searcher>,
    search: Option<SearchThread>,
}

impl UCI {
    pub fn new() -> Self {
        UCI {
            board: Board::new(),
            searcher: Some(Searcher::new()),
            search: None,
        }
    }

    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        Ok(UCI {
            board: Board::new(),
            searcher: Some(Searcher::with_config(config)?),
            search: None,
        })
    }

    /// The searcher, once any running search has been stopped and collected.
    pub fn searcher(&mut self) -> &mut Searcher {
        self.finish_search(true);
        self.searcher.get_or_insert_with(Searcher::new)
    }

    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        self.run_with(stdin.lock(), io::stdout())
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// Everything written to `output` goes through one printer thread, so
    /// `go` can search in the background while `stop` and `isready` are
    /// still answered.
    pub fn run_with<R: BufRead, W: Write + Send>(&mut self, input: R, output: W) -> io::Result<()> {
        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            let printer = scope.spawn(move || print_lines(rx, output));

            let read = self.read_commands(input, &tx);
            // End of input lets a bounded search finish; `infinite` never would.
            let infinite = self.search.as_ref().is_some_and(|s| s.infinite);
            self.finish_search(infinite);
            drop(tx);

            let printed = printer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("output thread panicked")));
            read.and(printed)
        })
    }

    fn read_commands<R: BufRead>(&mut self, input: R, tx: &Sender<String>) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parser::parse_one(line) {
                UciMessage::Uci => send(tx, self.cmd_uci()),
                UciMessage::IsReady => send(tx, "readyok"),
                UciMessage::SetOption { name, value } => {
                    self.apply_setoption(name.trim(), value.as_deref());
                }
                UciMessage::UciNewGame => self.cmd_ucinewgame(),
                UciMessage::Position { startpos, fen, moves } => {
                    let fen_str = fen.as_ref().map(|f| f.as_str());
                    let move_strs: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
                    self.apply_position(startpos, fen_str, &move_strs);
                }
                UciMessage::Go { time_control, search_control } => {
                    let limits = go_to_limits(time_control.as_ref(), search_control.as_ref());
                    self.do_go(limits, tx);
                }
                UciMessage::Stop => self.finish_search(true),
                UciMessage::Quit => {
                    self.finish_search(true);
                    break;
                }
                UciMessage::Unknown(ref s, _) => match s.split_whitespace().next() {
                    Some("d") | Some("printboard") => send(tx, format!("{:?}", self.board)),
                    Some("eval") => send(tx, self.cmd_eval()),
                    _ => debug!("ignoring '{}'", s),
                },
                _ => {}
            }
        }
        Ok(())
    }

    /// Collect the running search, if any, raising its stop flag first when
    /// `stop` is set. The flag is lowered again so the next `go` starts clean.
    fn finish_search(&mut self, stop: bool) {
        let Some(search) = self.search.take() else {
            return;
        };
        if stop {
            search.stop.store(true, Ordering::Relaxed);
        }
        let searcher = search.handle.join().unwrap_or_else(|_| {
            error!("search thread panicked, starting over with a fresh searcher");
            Searcher::new()
        });
        searcher.stop_flag().store(false, Ordering::Relaxed);
        self.searcher = Some(searcher);
    }

    fn cmd_uci(&mut self) -> String {
        let config = self.searcher().config();
        [
            format!("id name {}", ENGINE_NAME),
            "id author MinimaxChess developers".to_string(),
            format!(
                "option name Hash type spin default {} min 1 max 4096",
                config.tt_max_mb
            ),
            "option name BookPath type string default".to_string(),
            format!("option name OwnBook type check default {}", config.use_book),
            "uciok".to_string(),
        ]
        .join("\n")
    }

    fn apply_setoption(&mut self, name: &str, value: Option<&str>) {
        let opt = name.to_lowercase().replace([' ', '_'], "");
        let value = value.unwrap_or("").trim();
        let searcher = self.searcher();
        match opt.as_str() {
            "hash" => match value.parse::<usize>() {
                Ok(size) => searcher.set_hash_size(size),
                Err(_) => warn!("invalid Hash value '{}'", value),
            },
            "bookpath" if value.is_empty() => searcher.set_book(None),
            "bookpath" => match OpeningBook::load(Path::new(value)) {
                Ok(book) => searcher.set_book(Some(book)),
                Err(e) => warn!("{}", e),
            },
            "ownbook" => {
                searcher.set_use_book(value.eq_ignore_ascii_case("true") || value == "1");
            }
            _ => debug!("unknown option '{}'", name),
        }
    }

    pub fn cmd_ucinewgame(&mut self) {
        self.searcher().clear();
        self.board.reset();
    }

    fn apply_position(&mut self, startpos: bool, fen: Option<&str>, move_strs: &[String]) {
        if startpos {
            self.board.reset();
        } else if let Some(fen_str) = fen {
            if let Err(e) = self.board.set_fen(fen_str) {
                // The moves belong to the rejected position, not the old board.
                warn!("{}, ignoring position", e);
                return;
            }
        }

        for s in move_strs {
            if let Err(e) = self.board.push_uci(s) {
                warn!("skipping move: {}", e);
            }
        }
    }

    /// Start searching a copy of the current position. The worker reports
    /// `info` lines and `bestmove` itself; the board is not advanced, the GUI
    /// sends the move back with the next `position`.
    fn do_go(&mut self, limits: SearchLimits, tx: &Sender<String>) {
        self.finish_search(true);
        let mut searcher = self.searcher.take().unwrap_or_default();
        let stop = searcher.stop_flag();
        let infinite = limits.infinite;
        let mut board = self.board.clone();
        let tx = tx.clone();

        let handle = thread::spawn(move || {
            let turn = board.turn();
            let outcome = searcher.search(&mut board, limits);
            for info in &outcome.iterations {
                send(&tx, pv::info_line(info, turn));
            }
            match outcome.best_move {
                Some(mv) => send(&tx, format!("bestmove {}", uci_string(&mv))),
                None => send(&tx, "bestmove 0000"),
            }
            searcher
        });
        self.search = Some(SearchThread { handle, stop, infinite });
    }

    fn cmd_eval(&mut self) -> String {
        self.finish_search(true);
        let searcher = self.searcher.get_or_insert_with(Searcher::new);
        let phase = Phase::of(&self.board);
        let score = searcher.evaluator().evaluate(&self.board, 0, phase.ending);
        format!("Evaluation: {} cp (White's view)", score)
    }
}

/// Queue a line for the printer. A closed channel means the printer already
/// failed, and `run_with` reports that error.
fn send(tx: &Sender<String>, line: impl Into<String>) {
    let _ = tx.send(line.into());
}

fn print_lines<W: Write>(lines: Receiver<String>, mut output: W) -> io::Result<()> {
    for line in lines {
        writeln!(output, "{}", line)?;
        output.flush()?;
    }
    Ok(())
}

/// Build SearchLimits from a parsed `go` command.
fn go_to_limits(
    time_control: Option<&UciTimeControl>,
    search_control: Option<&UciSearchControl>,
) -> SearchLimits {
    let mut limits = SearchLimits::default();

    if let Some(sc) = search_control {
        limits.depth = sc.depth.map(u32::from);
        limits.nodes = sc.nodes;
    }

    match time_control {
        Some(UciTimeControl::Infinite) => limits.infinite = true,
        Some(UciTimeControl::MoveTime(d)) => limits.movetime = Some(duration_to_millis(d)),
        Some(UciTimeControl::TimeLeft {
            white_time,
            black_time,
            white_increment,
            black_increment,
            ..
        }) => {
            limits.wtime = white_time.as_ref().map(duration_to_millis);
            limits.btime = black_time.as_ref().map(duration_to_millis);
            limits.winc = white_increment.as_ref().map(duration_to_millis);
            limits.binc = black_increment.as_ref().map(duration_to_millis);
        }
        _ => {}
    }

    limits
}

fn duration_to_millis(d: &chrono::Duration) -> u64 {
    d.num_milliseconds().max(0) as u64
}

impl Default for UCI {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_depth() {
        let UciMessage::Go { time_control, search_control } = parser::parse_one("go depth 6")
        else {
            panic!("not a go command");
        };
        let limits = go_to_limits(time_control.as_ref(), search_control.as_ref());
        assert_eq!(limits.depth, Some(6));
        assert_eq!(limits.wtime, None);
    }

    #[test]
    fn go_clock() {
        let UciMessage::Go { time_control, search_control } =
            parser::parse_one("go wtime 60000 btime 30000 winc 1000")
        else {
            panic!("not a go command");
        };
        let limits = go_to_limits(time_control.as_ref(), search_control.as_ref());
        assert_eq!(limits.depth, None);
        assert_eq!(limits.wtime, Some(60000));
        assert_eq!(limits.btime, Some(30000));
        assert_eq!(limits.winc, Some(1000));
        assert_eq!(limits.binc, None);
    }

    #[test]
    fn go_movetime() {
        let UciMessage::Go { time_control, search_control } = parser::parse_one("go movetime 250")
        else {
            panic!("not a go command");
        };
        let limits = go_to_limits(time_control.as_ref(), search_control.as_ref());
        assert_eq!(limits.movetime, Some(250));
        assert!(!limits.infinite);
    }
}
