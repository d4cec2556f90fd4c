//! Opening book: positions keyed by FEN (without move clocks), each with a
//! weighted list of known replies.
//!
//! File format:
//! ```text
//! pos rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -
//! e2e4 120
//! d2d4 80
//! pos ...
//! ```

use log::debug;
use shakmaty::Move;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::{book_key, Board};
use crate::error::{EngineError, EngineResult};

/// Opening book: position key -> list of (UCI move, frequency).
#[derive(Default, Debug)]
pub struct OpeningBook {
    entries: HashMap<String, Vec<(String, u32)>>,
}

impl OpeningBook {
    /// Load an opening book. A missing or unreadable file is an error;
    /// malformed lines are skipped.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let io_err = |source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        };
        let f = File::open(path).map_err(io_err)?;
        let mut lines = Vec::new();
        for line in BufReader::new(f).lines() {
            lines.push(line.map_err(io_err)?);
        }
        let book = Self::parse(lines.iter().map(String::as_str));
        debug!("loaded opening book {} ({} positions)", path.display(), book.len());
        Ok(book)
    }

    /// Parse book text line by line.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut book = OpeningBook::default();
        let mut current: Option<String> = None;

        for (number, line) in lines.into_iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(fen) = line.strip_prefix("pos ") {
                let key = book_key(fen);
                book.entries.entry(key.clone()).or_default();
                current = Some(key);
                continue;
            }
            let Some(key) = current.as_ref() else {
                debug!("book line {}: move outside a position block", number + 1);
                continue;
            };
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next().map(str::parse::<u32>), parts.next()) {
                (Some(mv), Some(Ok(freq)), None) => {
                    if let Some(moves) = book.entries.get_mut(key) {
                        moves.push((mv.to_string(), freq));
                    }
                }
                _ => debug!("book line {}: skipping malformed '{}'", number + 1, line),
            }
        }

        book
    }

    /// Build a book in memory from `(fen, [(uci move, frequency)])` pairs.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, Vec<(&'a str, u32)>)>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|(fen, moves)| {
                let moves = moves.into_iter().map(|(m, f)| (m.to_string(), f)).collect();
                (book_key(fen), moves)
            })
            .collect();
        OpeningBook { entries }
    }

    /// Recorded (move, frequency) pairs for the current position.
    pub fn moves_for(&self, board: &Board) -> Option<&[(String, u32)]> {
        self.entries.get(&board.book_key()).map(Vec::as_slice)
    }

    /// Probe the book for the current position. Returns a frequency-weighted
    /// random book move, or `None` if the position is unknown or the chosen
    /// entry is not legal here.
    pub fn probe(&self, board: &Board) -> Option<Move> {
        let moves = self.moves_for(board)?;
        if moves.is_empty() {
            return None;
        }
        let total: u64 = moves.iter().map(|&(_, f)| u64::from(f)).sum();
        let (uci_move, _) = if total == 0 {
            moves.get(rand::random::<u64>() as usize % moves.len())?
        } else {
            let mut pick = rand::random::<u64>() % total;
            moves.iter().find(|&&(_, f)| {
                let f = u64::from(f);
                if pick < f {
                    true
                } else {
                    pick -= f;
                    false
                }
            })?
        };
        board.parse_uci(uci_move).ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
