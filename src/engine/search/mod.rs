//! Search: iterative deepening, alpha-beta, quiescence.

mod alphabeta;
pub mod ordering;
pub mod pv;
mod searcher;
mod types;

pub use searcher::Searcher;
pub use types::{
    Aborted, IterationInfo, SearchLimits, SearchOutcome, SearchResult, SearchStats, DRAW_SCORE,
    INFINITY, MATE_SCORE, MATE_THRESHOLD, MAX_DEPTH,
};
