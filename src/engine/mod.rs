//! Chess engine components
//!
//! This module contains the core engine functionality:
//! - Material and piece-square evaluation
//! - Alpha-beta search with quiescence and move ordering
//! - Transposition and repetition tables
//! - Opening book

pub mod book;
pub mod eval;
pub mod repetition;
pub mod search;
pub mod tt;

pub use book::OpeningBook;
pub use eval::{Evaluator, Phase};
pub use repetition::RepetitionTable;
pub use search::{SearchLimits, SearchOutcome, SearchStats, Searcher, INFINITY, MATE_SCORE};
pub use tt::{TTEntry, TTFlag, TTProbe, TranspositionTable};
