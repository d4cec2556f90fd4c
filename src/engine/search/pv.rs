//! Principal variation reconstruction and UCI info reporting.

use shakmaty::{Color, Move};

use crate::core::{uci_string, Board};
use crate::engine::tt::TranspositionTable;

use super::types::{IterationInfo, MATE_SCORE, MATE_THRESHOLD, MAX_DEPTH};

/// `first` followed by the best moves stored in `tt`, up to `max_plies`.
pub fn get_pv_from_tt(
    tt: &TranspositionTable,
    board: &Board,
    first: &Move,
    max_plies: usize,
) -> Vec<Move> {
    let mut pv = Vec::with_capacity(max_plies.min(MAX_DEPTH as usize));
    let mut cur = board.clone();
    if cur.push(first).is_err() {
        return pv;
    }
    pv.push(first.clone());
    while pv.len() < max_plies && !cur.is_game_over() {
        let Some(mv) = tt.get(cur.hash()).and_then(|e| e.best_move.clone()) else {
            break;
        };
        if cur.push(&mv).is_err() {
            break;
        }
        pv.push(mv);
    }
    pv
}

pub fn pv_string(pv: &[Move]) -> String {
    pv.iter().map(uci_string).collect::<Vec<_>>().join(" ")
}

/// UCI score for a side-to-move relative score.
pub fn format_score(score: i32) -> String {
    if score.abs() >= MATE_THRESHOLD {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {}", score)
    }
}

/// `info` line for one iteration, score relative to `turn`.
pub fn info_line(info: &IterationInfo, turn: Color) -> String {
    let score = match turn {
        Color::White => info.score,
        Color::Black => -info.score,
    };
    let millis = info.elapsed.as_millis();
    let nps = if millis > 0 {
        u128::from(info.nodes) * 1000 / millis
    } else {
        0
    };
    format!(
        "info depth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
        info.depth,
        format_score(score),
        info.nodes,
        nps,
        info.hashfull,
        millis,
        pv_string(&info.pv)
    )
}
