//! Error types for the engine
//!
//! Board setup, move parsing and opening-book loading report failures through
//! [`EngineError`]. Running out of time during a search is not an error; see
//! [`crate::engine::search::Aborted`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur outside of the search itself
#[derive(Error, Debug)]
pub enum EngineError {
    /// Opening book (or other file) could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// FEN string could not be parsed or describes an impossible position
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// Text is not a move in UCI notation
    #[error("invalid UCI move '{0}'")]
    InvalidMove(String),

    /// Move is well formed but not legal in the current position
    #[error("illegal move '{0}' in current position")]
    IllegalMove(String),

    /// Attempted to pop past the root position
    #[error("cannot pop: board is at its root position")]
    EmptyHistory,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
