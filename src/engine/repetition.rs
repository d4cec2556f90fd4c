//! Repetition table for the line currently being searched.

use std::collections::HashMap;

/// Occurrences after which a position counts as repeated in the search line.
pub const REPETITION_THRESHOLD: u32 = 2;

/// Counts position hashes along the current recursive search line.
#[derive(Default, Debug)]
pub struct RepetitionTable {
    positions: HashMap<u64, u32>,
}

impl RepetitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hash: u64) {
        *self.positions.entry(hash).or_insert(0) += 1;
    }

    /// Decrement; the key is dropped once its count reaches zero.
    pub fn remove(&mut self, hash: u64) {
        if let Some(count) = self.positions.get_mut(&hash) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.positions.remove(&hash);
            }
        }
    }

    pub fn is_repetition(&self, hash: u64) -> bool {
        self.count(hash) >= REPETITION_THRESHOLD
    }

    pub fn count(&self, hash: u64) -> u32 {
        self.positions.get(&hash).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
