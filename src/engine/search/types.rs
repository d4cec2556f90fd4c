//! Search limits, stats, results and constants.

use std::time::Duration;

use shakmaty::Move;

pub use crate::engine::eval::{DRAW_SCORE, MATE_SCORE};

pub const INFINITY: i32 = 1_000_000;
/// Depth ceiling used when searching against a clock.
pub const MAX_DEPTH: u32 = 32;
/// Scores at least this far from zero are mate scores.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;

#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub infinite: bool,
}

impl SearchLimits {
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            depth: Some(depth),
            ..Default::default()
        }
    }

    pub fn movetime(ms: u64) -> Self {
        SearchLimits {
            movetime: Some(ms),
            ..Default::default()
        }
    }
}

/// Per-call counters, reset at the start of every search.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes_searched: u64,
    pub nodes_evaluated: u64,
    pub tt_found: u64,
    pub tt_used: u64,
}

/// The search ran out of budget; the result of the interrupted subtree is void.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aborted;

pub type SearchResult<T> = Result<T, Aborted>;

/// One finished iterative-deepening iteration.
#[derive(Clone, Debug)]
pub struct IterationInfo {
    pub depth: u32,
    /// White's point of view.
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
    /// Transposition table fill in permille of the configured size.
    pub hashfull: usize,
    /// False if the iteration was cut short but had already settled a move.
    pub complete: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    /// White's point of view; `None` for book moves or when nothing was searched.
    pub score: Option<i32>,
    /// Deepest fully completed iteration.
    pub depth: u32,
    pub from_book: bool,
    pub iterations: Vec<IterationInfo>,
    pub stats: SearchStats,
}
