//! Core chess types
//!
//! Rules, move generation and hashing come from `shakmaty`; this module adapts
//! them to the push/pop board the search mutates in place.

pub mod board;

pub use board::{book_key, uci_string, Board, ScopedMove, STARTING_FEN};
pub use shakmaty::{Color, Move, Role, Square};
