pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod uci;

pub use crate::config::{EngineConfig, SearchAlgorithm};
pub use crate::core::Board;
pub use crate::engine::search::{SearchLimits, SearchOutcome, Searcher};
pub use crate::error::{EngineError, EngineResult};
pub use crate::uci::UCI;
pub use shakmaty;
