//! Engine configuration.

use std::path::PathBuf;

/// Search depth used when neither a depth nor a time budget is given.
pub const DEFAULT_DEPTH: u32 = 4;
/// Transposition table ceiling in megabytes.
pub const DEFAULT_TT_MAX_MB: usize = 64;
/// Killer moves remembered per depth.
pub const DEFAULT_KILLER_SLOTS: usize = 2;
/// Nodes between two wall-clock checks.
pub const DEFAULT_NODE_CHECK_INTERVAL: u64 = 2048;

/// Tree search variant used for every iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchAlgorithm {
    /// Full minimax with static evaluation at the horizon.
    Minimax,
    /// Alpha-beta with quiescence, no transposition table.
    AlphaBeta,
    /// Alpha-beta with quiescence and transposition table.
    #[default]
    AlphaBetaTt,
}

impl std::str::FromStr for SearchAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "minimax" => Ok(SearchAlgorithm::Minimax),
            "alphabeta" => Ok(SearchAlgorithm::AlphaBeta),
            "alphabetatt" | "tt" => Ok(SearchAlgorithm::AlphaBetaTt),
            other => Err(format!("unknown search algorithm '{other}'")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub algorithm: SearchAlgorithm,
    pub default_depth: u32,
    pub tt_max_mb: usize,
    pub killer_slots: usize,
    pub node_check_interval: u64,
    pub iterative_deepening: bool,
    pub quiescence: bool,
    pub move_ordering: bool,
    pub use_book: bool,
    /// Opening book in `pos <fen>` / `<move> <freq>` format.
    pub book_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithm: SearchAlgorithm::default(),
            default_depth: DEFAULT_DEPTH,
            tt_max_mb: DEFAULT_TT_MAX_MB,
            killer_slots: DEFAULT_KILLER_SLOTS,
            node_check_interval: DEFAULT_NODE_CHECK_INTERVAL,
            iterative_deepening: true,
            quiescence: true,
            move_ordering: true,
            use_book: true,
            book_path: None,
        }
    }
}
