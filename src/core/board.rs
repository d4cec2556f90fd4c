//! Board adapter
//!
//! Wraps `shakmaty` positions behind the push/pop interface the search works
//! with. Every pushed move keeps its own position and Zobrist hash on a stack,
//! so popping is exact and repetition counting can look at the whole line.

use std::fmt;
use std::ops::{Deref, DerefMut};

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Position, Role, Square,
};

use crate::error::{EngineError, EngineResult};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn position_hash(pos: &Chess) -> u64 {
    let z: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
    z.0
}

/// Game position plus the line of positions that led to it.
#[derive(Clone)]
pub struct Board {
    positions: Vec<Chess>,
    hashes: Vec<u64>,
}

impl Board {
    /// Standard starting position.
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    pub fn from_position(pos: Chess) -> Self {
        let hash = position_hash(&pos);
        Board {
            positions: vec![pos],
            hashes: vec![hash],
        }
    }

    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let mut board = Board::new();
        board.set_fen(fen)?;
        Ok(board)
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> &Chess {
        // The root position is never popped, so the stack is never empty.
        &self.positions[self.positions.len() - 1]
    }

    /// Zobrist hash of the current position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hashes[self.hashes.len() - 1]
    }

    pub fn turn(&self) -> Color {
        self.position().turn()
    }

    /// Number of moves pushed since the last `set_fen`/`reset`.
    pub fn ply(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn reset(&mut self) {
        *self = Board::new();
    }

    /// Replace the whole line with the position described by `fen`.
    /// On error the board is left unchanged.
    pub fn set_fen(&mut self, fen: &str) -> EngineResult<()> {
        let invalid = |reason: String| EngineError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        *self = Board::from_position(pos);
        Ok(())
    }

    pub fn get_fen(&self) -> String {
        Fen(self.position().clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    /// FEN without the half-move clock and full-move number.
    pub fn book_key(&self) -> String {
        book_key(&self.get_fen())
    }

    pub fn legal_moves(&self) -> MoveList {
        self.position().legal_moves()
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        self.position().is_legal(mv)
    }

    /// Play `mv` on top of the current position.
    pub fn push(&mut self, mv: &Move) -> EngineResult<()> {
        let next = self
            .position()
            .clone()
            .play(mv)
            .map_err(|_| EngineError::IllegalMove(uci_string(mv)))?;
        self.hashes.push(position_hash(&next));
        self.positions.push(next);
        Ok(())
    }

    /// Undo the last pushed move.
    pub fn pop(&mut self) -> EngineResult<()> {
        if self.positions.len() <= 1 {
            return Err(EngineError::EmptyHistory);
        }
        self.positions.pop();
        self.hashes.pop();
        Ok(())
    }

    /// Push `mv` and return a guard that pops it again when dropped.
    pub fn push_scoped(&mut self, mv: &Move) -> EngineResult<ScopedMove<'_>> {
        self.push(mv)?;
        Ok(ScopedMove { board: self })
    }

    /// Parse a move in UCI notation for the current position.
    pub fn parse_uci(&self, text: &str) -> EngineResult<Move> {
        let uci: UciMove = text
            .parse()
            .map_err(|_| EngineError::InvalidMove(text.to_string()))?;
        let mv = uci
            .to_move(self.position())
            .map_err(|_| EngineError::IllegalMove(text.to_string()))?;
        if self.is_legal(&mv) {
            Ok(mv)
        } else {
            Err(EngineError::IllegalMove(text.to_string()))
        }
    }

    pub fn push_uci(&mut self, text: &str) -> EngineResult<Move> {
        let mv = self.parse_uci(text)?;
        self.push(&mv)?;
        Ok(mv)
    }

    pub fn is_check(&self) -> bool {
        self.position().is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position().is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position().is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.position().is_insufficient_material()
    }

    /// True if the current position occurred at least `count` times in the line,
    /// counting the current occurrence.
    pub fn is_repetition(&self, count: usize) -> bool {
        let current = self.hash();
        self.hashes.iter().filter(|&&h| h == current).count() >= count
    }

    pub fn is_game_over(&self) -> bool {
        self.position().is_game_over()
    }

    pub fn piece_type_at(&self, sq: Square) -> Option<Role> {
        self.position().board().role_at(sq)
    }

    pub fn is_attacked_by(&self, color: Color, sq: Square) -> bool {
        let board = self.position().board();
        board.attacks_to(sq, color, board.occupied()).any()
    }

    /// Squares attacked by the piece on `sq` (empty if there is none).
    pub fn attacks(&self, sq: Square) -> Bitboard {
        self.position().board().attacks_from(sq)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?}", self.position().board())?;
        write!(f, "Fen: {}", self.get_fen())
    }
}

/// A move pushed onto a [`Board`]; popped again on drop.
pub struct ScopedMove<'a> {
    board: &'a mut Board,
}

impl Deref for ScopedMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        &*self.board
    }
}

impl DerefMut for ScopedMove<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        &mut *self.board
    }
}

impl Drop for ScopedMove<'_> {
    fn drop(&mut self) {
        let _ = self.board.pop();
    }
}

/// Strip the move clocks from a FEN string.
pub fn book_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

pub fn uci_string(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}
