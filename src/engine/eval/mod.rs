//! Static evaluation: material plus phase-aware piece-square tables.
//!
//! Scores are in centipawns from White's point of view.

mod pst;

use shakmaty::{Color, Position, Role, Square};

use crate::core::Board;

/// Score of a mate delivered at the root; mates found `n` plies deeper score
/// `MATE_SCORE - n`.
pub const MATE_SCORE: i32 = 100_000;
pub const DRAW_SCORE: i32 = 0;

const ROLES: [Role; 6] = [
    Role::Pawn,
    Role::Knight,
    Role::Bishop,
    Role::Rook,
    Role::Queen,
    Role::King,
];

pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 300,
        Role::Bishop => 300,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 20000,
    }
}

fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

/// Game phase chosen once per search call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Phase {
    /// Use endgame tables.
    pub ending: bool,
    /// Extra plies granted to the search.
    pub depth_bonus: u32,
}

impl Phase {
    /// Classify by the number of knights, bishops, rooks and queens left.
    pub fn of(board: &Board) -> Phase {
        let b = board.position().board();
        let pieces = (b.occupied() & !(b.pawns() | b.kings())).count();
        match pieces {
            0..=1 => Phase { ending: true, depth_bonus: 4 },
            2 => Phase { ending: true, depth_bonus: 2 },
            3..=5 => Phase { ending: true, depth_bonus: 1 },
            _ => Phase::default(),
        }
    }
}

/// Piece-square maps for every (phase, piece type, color), built once.
pub struct Evaluator {
    maps: [[[[i32; 64]; 2]; 6]; 2],
}

impl Evaluator {
    pub fn new() -> Self {
        let mut maps = [[[[0; 64]; 2]; 6]; 2];
        for (phase, ending) in [false, true].into_iter().enumerate() {
            for role in ROLES {
                let table = pst::table(role, ending);
                for sq in 0..64 {
                    let (file, rank) = (sq % 8, sq / 8);
                    maps[phase][role_index(role)][0][sq] = table[file + (7 - rank) * 8];
                    maps[phase][role_index(role)][1][sq] = table[file + rank * 8];
                }
            }
        }
        Evaluator { maps }
    }

    /// Positional bonus for a piece standing on `sq`.
    #[inline]
    pub fn square_bonus(&self, role: Role, color: Color, sq: Square, ending: bool) -> i32 {
        self.maps[ending as usize][role_index(role)][color_index(color)][sq as usize]
    }

    /// Evaluate `board`, `ply` plies away from the search root.
    ///
    /// Checkmate scores `MATE_SCORE - ply` for the mating side so shorter
    /// mates are preferred; stalemate and dead positions score exactly zero.
    pub fn evaluate(&self, board: &Board, ply: u32, ending: bool) -> i32 {
        if board.is_checkmate() {
            let mate = MATE_SCORE - ply as i32;
            return match board.turn() {
                Color::White => -mate,
                Color::Black => mate,
            };
        }
        if board.is_stalemate() || board.is_insufficient_material() {
            return DRAW_SCORE;
        }
        self.material_and_position(board, ending)
    }

    /// Material and piece-square sum, ignoring game-end conditions.
    pub fn material_and_position(&self, board: &Board, ending: bool) -> i32 {
        let b = board.position().board();
        let mut score = 0;
        for sq in b.occupied() {
            if let Some(piece) = b.piece_at(sq) {
                let value =
                    piece_value(piece.role) + self.square_bonus(piece.role, piece.color, sq, ending);
                match piece.color {
                    Color::White => score += value,
                    Color::Black => score -= value,
                }
            }
        }
        score
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
