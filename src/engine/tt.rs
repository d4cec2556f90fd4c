//! Transposition Table
//!
//! A hash table that stores previously searched positions to avoid
//! redundant work. Entries are keyed by the 64-bit Zobrist hash alone;
//! two positions sharing a hash will share an entry.

use std::collections::HashMap;

use shakmaty::Move;

use crate::engine::search::MATE_THRESHOLD;

/// Bound type of a stored score
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TTFlag {
    /// Exact score
    Exact,
    /// Lower bound (failed high)
    LowerBound,
    /// Upper bound (failed low)
    UpperBound,
}

/// A single entry in the transposition table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TTEntry {
    /// Remaining depth the score was searched to
    pub depth: u32,
    /// Score, White's point of view
    pub score: i32,
    /// Entry type
    pub flag: TTFlag,
    /// Best move found
    pub best_move: Option<Move>,
}

/// Result of probing the table for a node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TTProbe {
    /// Nothing stored for this hash
    Miss,
    /// An entry exists but cannot replace searching the node
    Stored(TTEntry),
    /// The entry settles the node for the requested depth and window
    Cutoff(TTEntry),
}

/// Transposition table
#[derive(Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key` for a search of `depth` within `(alpha, beta)`.
    ///
    /// The window is taken by value; the caller's bounds are never changed.
    pub fn probe(&self, key: u64, depth: u32, ply: u32, alpha: i32, beta: i32) -> TTProbe {
        let Some(stored) = self.entries.get(&key) else {
            return TTProbe::Miss;
        };
        let entry = TTEntry {
            score: score_from_tt(stored.score, ply),
            ..stored.clone()
        };
        if entry.depth >= depth {
            let usable = match entry.flag {
                TTFlag::Exact => true,
                TTFlag::LowerBound => entry.score >= beta,
                TTFlag::UpperBound => entry.score <= alpha,
            };
            if usable {
                return TTProbe::Cutoff(entry);
            }
        }
        TTProbe::Stored(entry)
    }

    /// Raw lookup, used for PV reconstruction. Mate scores are node-relative.
    pub fn get(&self, key: u64) -> Option<&TTEntry> {
        self.entries.get(&key)
    }

    /// Store an entry found `ply` plies from the root, replacing whatever was there
    pub fn store(
        &mut self,
        key: u64,
        depth: u32,
        ply: u32,
        score: i32,
        flag: TTFlag,
        best_move: Option<Move>,
    ) {
        self.entries.insert(
            key,
            TTEntry {
                depth,
                score: score_to_tt(score, ply),
                flag,
                best_move,
            },
        );
    }

    /// Clear the table and release its memory
    pub fn clear(&mut self) {
        self.entries = HashMap::new();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rough memory footprint in bytes, including hash map slack
    pub fn approx_bytes(&self) -> usize {
        let per_entry = std::mem::size_of::<u64>() + std::mem::size_of::<TTEntry>() + 1;
        self.entries.capacity() * per_entry
    }

    /// Whether the footprint exceeds `max_mb` megabytes
    pub fn exceeds(&self, max_mb: usize) -> bool {
        self.approx_bytes() > max_mb * 1024 * 1024
    }

    /// Fill rate in permille of the `max_mb` budget
    pub fn hashfull(&self, max_mb: usize) -> usize {
        let budget = (max_mb * 1024 * 1024).max(1);
        (self.approx_bytes() * 1000 / budget).min(1000)
    }
}

/// Mate scores count plies from the root; stored entries count them from the
/// node itself so they stay valid wherever the position comes up again.
fn score_to_tt(score: i32, ply: u32) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: u32) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}
