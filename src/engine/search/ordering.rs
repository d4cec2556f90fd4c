//! Move ordering: PV move, MVV-LVA captures, promotions, threatened
//! destinations and killer moves.

use std::collections::{HashMap, VecDeque};

use shakmaty::Move;

use crate::core::Board;
use crate::engine::eval::piece_value;

pub const PV_SCORE: i32 = 100_000;
pub const KILLER_SCORE: i32 = 3_500;
pub const RECENT_KILLER_BONUS: i32 = 1_000;

/// Quiet moves that caused a beta cutoff, keyed by remaining depth.
pub struct KillerMoves {
    moves: HashMap<u32, VecDeque<Move>>,
    slots: usize,
}

impl KillerMoves {
    pub fn new(slots: usize) -> Self {
        KillerMoves {
            moves: HashMap::new(),
            slots,
        }
    }

    /// Remember `mv` at `depth`. Captures are ignored, duplicates are skipped
    /// and the oldest killer is evicted once all slots are used.
    pub fn store(&mut self, depth: u32, mv: &Move) {
        if mv.is_capture() || self.slots == 0 {
            return;
        }
        let killers = self.moves.entry(depth).or_default();
        if killers.contains(mv) {
            return;
        }
        if killers.len() >= self.slots {
            killers.pop_front();
        }
        killers.push_back(mv.clone());
    }

    /// Ordering bonus of `mv` at `depth`.
    pub fn score(&self, mv: &Move, depth: u32) -> i32 {
        let Some(killers) = self.moves.get(&depth) else {
            return 0;
        };
        match killers.iter().position(|k| k == mv) {
            Some(i) if killers.len() == self.slots && i + 1 == killers.len() => {
                KILLER_SCORE + RECENT_KILLER_BONUS
            }
            Some(_) => KILLER_SCORE,
            None => 0,
        }
    }

    pub fn get(&self, depth: u32) -> impl Iterator<Item = &Move> {
        self.moves.get(&depth).into_iter().flatten()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }
}

/// Order all legal moves of `board`, best guess first.
pub fn order_moves(
    board: &Board,
    pv_move: Option<&Move>,
    depth: u32,
    killers: &KillerMoves,
) -> Vec<Move> {
    let them = !board.turn();
    let mut scored: Vec<(Move, i32)> = board
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let mut score = 0;
            if pv_move == Some(&mv) {
                score += PV_SCORE;
            }
            if let (Some(victim), Some(from)) = (mv.capture(), mv.from()) {
                if board.attacks(from).contains(mv.to()) {
                    score += 10 * piece_value(victim) - piece_value(mv.role());
                }
            }
            if let Some(promotion) = mv.promotion() {
                score += 10 * piece_value(promotion);
            }
            // Checked on the board before the move, so only an estimate.
            if board.is_attacked_by(them, mv.to()) {
                score -= piece_value(mv.role());
            }
            score += killers.score(&mv, depth);
            (mv, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(mv, _)| mv).collect()
}

/// Captures and promotions only, ordered by MVV-LVA and promotion value.
pub fn order_quiescence_moves(board: &Board) -> Vec<Move> {
    let mut scored: Vec<(Move, i32)> = board
        .legal_moves()
        .into_iter()
        .filter(|mv| mv.is_capture() || mv.is_promotion())
        .map(|mv| {
            let mut score = 0;
            if let Some(victim) = mv.capture() {
                score += 10 * piece_value(victim) - piece_value(mv.role());
            }
            if let Some(promotion) = mv.promotion() {
                score += 10 * piece_value(promotion);
            }
            (mv, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(mv, _)| mv).collect()
}
