//! Searcher: book lookup, iterative deepening driver, time/node limits and
//! session state.

use log::debug;
use shakmaty::{Color, Move};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{EngineConfig, SearchAlgorithm};
use crate::core::{uci_string, Board};
use crate::engine::book::OpeningBook;
use crate::engine::eval::{Evaluator, Phase};
use crate::engine::repetition::RepetitionTable;
use crate::engine::tt::TranspositionTable;
use crate::error::EngineResult;

use super::ordering::{self, KillerMoves};
use super::pv;
use super::types::{
    IterationInfo, SearchLimits, SearchOutcome, SearchResult, SearchStats, INFINITY, MATE_SCORE,
    MAX_DEPTH,
};

pub struct Searcher {
    pub(super) config: EngineConfig,
    pub(super) evaluator: Evaluator,
    pub(super) tt: TranspositionTable,
    pub(super) killers: KillerMoves,
    pub(super) repetitions: RepetitionTable,
    pub(super) book: Option<OpeningBook>,
    pub(super) in_opening: bool,
    pub(super) stats: SearchStats,
    pub(super) stop: Arc<AtomicBool>,
    pub(super) start_time: Instant,
    pub(super) time_limit: Option<Duration>,
    pub(super) node_limit: Option<u64>,
    /// Endgame tables in use for the current call.
    pub(super) ending: bool,
    /// Best root move of the last finished iteration.
    pub(super) pv_move: Option<Move>,
}

impl Searcher {
    /// Searcher with the default configuration and no opening book.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Searcher for `config`; fails if the configured opening book cannot be read.
    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        let book = match (&config.book_path, config.use_book) {
            (Some(path), true) => Some(OpeningBook::load(path)?),
            _ => None,
        };
        let mut searcher = Self::build(config);
        searcher.book = book;
        Ok(searcher)
    }

    fn build(config: EngineConfig) -> Self {
        Searcher {
            killers: KillerMoves::new(config.killer_slots),
            config,
            evaluator: Evaluator::new(),
            tt: TranspositionTable::new(),
            repetitions: RepetitionTable::new(),
            book: None,
            in_opening: true,
            stats: SearchStats::default(),
            stop: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
            time_limit: None,
            node_limit: None,
            ending: false,
            pv_move: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn set_hash_size(&mut self, size_mb: usize) {
        self.config.tt_max_mb = size_mb.max(1);
    }

    pub fn set_book(&mut self, book: Option<OpeningBook>) {
        self.book = book;
        self.in_opening = true;
    }

    pub fn set_use_book(&mut self, use_book: bool) {
        self.config.use_book = use_book;
    }

    pub fn book(&self) -> Option<&OpeningBook> {
        self.book.as_ref()
    }

    /// Still consulting the opening book.
    pub fn in_opening(&self) -> bool {
        self.in_opening
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Forget everything learned this game. Never called mid-search.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.repetitions.clear();
        self.stats = SearchStats::default();
        self.in_opening = true;
        self.pv_move = None;
        self.ending = false;
        self.stop.store(false, Ordering::Relaxed);
    }

    pub(super) fn time_exceeded(&self) -> bool {
        self.time_limit
            .is_some_and(|limit| self.start_time.elapsed() >= limit)
    }

    pub(super) fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
            || self.node_limit.is_some_and(|n| self.stats.nodes_searched >= n)
            || self.time_exceeded()
    }

    /// Time to spend on this move: `movetime` if given, otherwise a fiftieth of
    /// the remaining clock plus the increment, never more than half the clock.
    pub fn calculate_time(&self, limits: &SearchLimits, side: Color) -> Option<Duration> {
        if limits.infinite {
            return None;
        }
        if let Some(mt) = limits.movetime {
            return Some(Duration::from_millis(mt));
        }
        let (time, inc) = match side {
            Color::White => (limits.wtime?, limits.winc.unwrap_or(0)),
            Color::Black => (limits.btime?, limits.binc.unwrap_or(0)),
        };
        let time_for_move = time / 50 + inc;
        Some(Duration::from_millis(time_for_move.min(time / 2)))
    }

    pub(super) fn evaluate(&mut self, board: &Board, ply: u32) -> i32 {
        self.stats.nodes_evaluated += 1;
        self.evaluator.evaluate(board, ply, self.ending)
    }

    pub(super) fn order_moves(&self, board: &Board, hint: Option<&Move>, depth: u32) -> Vec<Move> {
        if self.config.move_ordering {
            ordering::order_moves(board, hint, depth, &self.killers)
        } else {
            board.legal_moves().into_iter().collect()
        }
    }

    /// Book move for `board`, while the game is still in book. The first miss
    /// ends book play until the next `clear`.
    fn book_move(&mut self, board: &Board) -> Option<Move> {
        if !self.config.use_book || !self.in_opening {
            return None;
        }
        let book = self.book.as_ref()?;
        match book.probe(board) {
            Some(mv) => {
                debug!("book move {}", uci_string(&mv));
                Some(mv)
            }
            None => {
                debug!("out of book");
                self.in_opening = false;
                None
            }
        }
    }

    fn search_root(&mut self, board: &mut Board, depth: u32) -> SearchResult<(i32, Option<Move>)> {
        match self.config.algorithm {
            SearchAlgorithm::Minimax => self.minimax(board, depth, 0),
            SearchAlgorithm::AlphaBeta => {
                self.alpha_beta(board, depth, -INFINITY, INFINITY, 0, false)
            }
            SearchAlgorithm::AlphaBetaTt => {
                self.alpha_beta(board, depth, -INFINITY, INFINITY, 0, true)
            }
        }
    }

    /// Choose a move for the side to move. `board` is left as it was found.
    pub fn make_move(&mut self, board: &mut Board, limits: SearchLimits) -> Option<Move> {
        self.search(board, limits).best_move
    }

    pub fn search(&mut self, board: &mut Board, limits: SearchLimits) -> SearchOutcome {
        if let Some(mv) = self.book_move(board) {
            return SearchOutcome {
                best_move: Some(mv),
                from_book: true,
                ..SearchOutcome::default()
            };
        }

        self.start_time = Instant::now();
        self.stats = SearchStats::default();
        self.time_limit = self.calculate_time(&limits, board.turn());
        self.node_limit = limits.nodes;
        self.pv_move = None;

        let phase = Phase::of(board);
        self.ending = phase.ending;
        let base_depth = limits.depth.unwrap_or(if self.time_limit.is_some() || limits.infinite {
            MAX_DEPTH
        } else {
            self.config.default_depth
        });
        let max_depth = base_depth.max(1) + phase.depth_bonus;

        self.repetitions.clear();
        self.repetitions.add(board.hash());

        if self.tt.exceeds(self.config.tt_max_mb) {
            debug!(
                "transposition table over {} MB ({} entries), clearing",
                self.config.tt_max_mb,
                self.tt.len()
            );
            self.tt.clear();
        }

        let mut outcome = SearchOutcome::default();
        let first_depth = if self.config.iterative_deepening {
            1
        } else {
            max_depth
        };

        for depth in first_depth..=max_depth {
            if self.should_stop() {
                break;
            }

            let (score, mv) = match self.search_root(board, depth) {
                Ok((score, Some(mv))) => (score, mv),
                Ok((_, None)) | Err(_) => break,
            };
            let complete = !self.stop.load(Ordering::Relaxed);

            let info = IterationInfo {
                depth,
                score,
                nodes: self.stats.nodes_searched,
                elapsed: self.start_time.elapsed(),
                pv: pv::get_pv_from_tt(&self.tt, board, &mv, depth as usize),
                hashfull: self.tt.hashfull(self.config.tt_max_mb),
                complete,
            };
            debug!(
                "depth {} score {} nodes {} time {}ms pv {}{}",
                depth,
                score,
                info.nodes,
                info.elapsed.as_millis(),
                pv::pv_string(&info.pv),
                if complete { "" } else { " (partial)" }
            );

            self.pv_move = Some(mv.clone());
            outcome.best_move = Some(mv);
            outcome.score = Some(score);
            outcome.iterations.push(info);
            if !complete {
                break;
            }
            outcome.depth = depth;

            if score.abs() >= MATE_SCORE - depth as i32 {
                break;
            }
        }

        if outcome.best_move.is_none() {
            outcome.best_move = self.order_moves(board, None, 0).into_iter().next();
        }
        outcome.stats = self.stats.clone();
        // A stop raised before this search began still applies to it, so the
        // flag is only lowered once the search is over.
        self.stop.store(false, Ordering::Relaxed);
        outcome
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}
