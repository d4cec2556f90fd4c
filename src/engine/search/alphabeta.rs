//! Alpha-beta, quiescence and plain minimax.
//!
//! Scores are from White's point of view: White maximizes, Black minimizes.
//! Every recursive call pushes its move through a scoped guard, so the board
//! is restored on every return path, aborts included.

use shakmaty::{Color, Move};
use std::sync::atomic::Ordering;

use crate::core::Board;
use crate::engine::tt::{TTFlag, TTProbe};

use super::ordering::order_quiescence_moves;
use super::searcher::Searcher;
use super::types::{Aborted, SearchResult, DRAW_SCORE, INFINITY};

impl Searcher {
    /// Count a visited node and poll the budget every `node_check_interval`
    /// nodes. Once tripped, the stop flag unwinds every active frame.
    pub(super) fn visit_node(&mut self) -> SearchResult<()> {
        if self.stop.load(Ordering::Relaxed) {
            return Err(Aborted);
        }
        if self
            .node_limit
            .is_some_and(|limit| self.stats.nodes_searched >= limit)
        {
            self.stop.store(true, Ordering::Relaxed);
            return Err(Aborted);
        }
        self.stats.nodes_searched += 1;
        let interval = self.config.node_check_interval.max(1);
        if self.stats.nodes_searched % interval == 0 && self.time_exceeded() {
            self.stop.store(true, Ordering::Relaxed);
            return Err(Aborted);
        }
        Ok(())
    }

    /// Draw by repetition inside the search line, or by the game's own
    /// threefold rule. Never applied at the root.
    fn is_repetition_draw(&self, board: &Board, ply: u32) -> bool {
        ply > 0 && (self.repetitions.is_repetition(board.hash()) || board.is_repetition(3))
    }

    /// Search `mv` one ply deeper with the repetition table kept in step.
    fn search_child<T>(
        &mut self,
        board: &mut Board,
        mv: &Move,
        search: impl FnOnce(&mut Self, &mut Board) -> SearchResult<T>,
    ) -> Option<SearchResult<T>> {
        let mut child = board.push_scoped(mv).ok()?;
        let hash = child.hash();
        self.repetitions.add(hash);
        let result = search(&mut *self, &mut *child);
        self.repetitions.remove(hash);
        Some(result)
    }

    pub(super) fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        ply: u32,
        use_tt: bool,
    ) -> SearchResult<(i32, Option<Move>)> {
        self.visit_node()?;

        if self.is_repetition_draw(board, ply) {
            return Ok((DRAW_SCORE, None));
        }
        if board.is_game_over() {
            return Ok((self.evaluate(board, ply), None));
        }
        if depth == 0 {
            return Ok((self.quiescence(board, alpha, beta, ply)?, None));
        }

        let hash = board.hash();
        let mut hint = if ply == 0 { self.pv_move.clone() } else { None };
        if use_tt {
            match self.tt.probe(hash, depth, ply, alpha, beta) {
                TTProbe::Cutoff(entry) => {
                    self.stats.tt_found += 1;
                    self.stats.tt_used += 1;
                    return Ok((entry.score, entry.best_move));
                }
                TTProbe::Stored(entry) => {
                    self.stats.tt_found += 1;
                    if hint.is_none() {
                        hint = entry.best_move;
                    }
                }
                TTProbe::Miss => {}
            }
        }

        let moves = self.order_moves(board, hint.as_ref(), depth);
        let (alpha_orig, beta_orig) = (alpha, beta);
        let maximizing = board.turn() == Color::White;
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move: Option<Move> = None;

        for mv in moves {
            let Some(result) = self.search_child(board, &mv, |s, child| {
                s.alpha_beta(child, depth - 1, alpha, beta, ply + 1, use_tt)
            }) else {
                continue;
            };
            let score = match result {
                Ok((score, _)) => score,
                // A root that already settled a move keeps it.
                Err(Aborted) if ply == 0 && best_move.is_some() => {
                    return Ok((best_score, best_move));
                }
                Err(aborted) => return Err(aborted),
            };

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv.clone());
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv.clone());
                }
                beta = beta.min(score);
            }

            if alpha >= beta {
                self.killers.store(depth, &mv);
                break;
            }
        }

        if best_move.is_none() {
            return Ok((self.evaluate(board, ply), None));
        }

        if use_tt {
            let flag = if best_score <= alpha_orig {
                TTFlag::UpperBound
            } else if best_score >= beta_orig {
                TTFlag::LowerBound
            } else {
                TTFlag::Exact
            };
            self.tt
                .store(hash, depth, ply, best_score, flag, best_move.clone());
        }

        Ok((best_score, best_move))
    }

    /// Captures and promotions only, starting from the stand-pat evaluation.
    pub(super) fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        mut beta: i32,
        ply: u32,
    ) -> SearchResult<i32> {
        self.visit_node()?;

        let stand_pat = self.evaluate(board, ply);
        if !self.config.quiescence {
            return Ok(stand_pat);
        }

        let maximizing = board.turn() == Color::White;
        let mut best = stand_pat;
        if maximizing {
            if best >= beta {
                return Ok(best);
            }
            alpha = alpha.max(best);
        } else {
            if best <= alpha {
                return Ok(best);
            }
            beta = beta.min(best);
        }

        for mv in order_quiescence_moves(board) {
            let score = {
                let Ok(mut child) = board.push_scoped(&mv) else {
                    continue;
                };
                self.quiescence(&mut child, alpha, beta, ply + 1)?
            };

            if maximizing {
                if score >= beta {
                    return Ok(score);
                }
                alpha = alpha.max(score);
                best = best.max(score);
            } else {
                if score <= alpha {
                    return Ok(score);
                }
                beta = beta.min(score);
                best = best.min(score);
            }
        }

        Ok(best)
    }

    /// Full-width minimax to `depth`, static evaluation at the horizon.
    pub(super) fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        ply: u32,
    ) -> SearchResult<(i32, Option<Move>)> {
        self.visit_node()?;

        if self.is_repetition_draw(board, ply) {
            return Ok((DRAW_SCORE, None));
        }
        if depth == 0 || board.is_game_over() {
            return Ok((self.evaluate(board, ply), None));
        }

        let hint = if ply == 0 { self.pv_move.clone() } else { None };
        let moves = self.order_moves(board, hint.as_ref(), depth);
        let maximizing = board.turn() == Color::White;
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move: Option<Move> = None;

        for mv in moves {
            let Some(result) =
                self.search_child(board, &mv, |s, child| s.minimax(child, depth - 1, ply + 1))
            else {
                continue;
            };
            let score = match result {
                Ok((score, _)) => score,
                Err(Aborted) if ply == 0 && best_move.is_some() => {
                    return Ok((best_score, best_move));
                }
                Err(aborted) => return Err(aborted),
            };
            let better = if maximizing {
                score > best_score
            } else {
                score < best_score
            };
            if better {
                best_score = score;
                best_move = Some(mv.clone());
            }
        }

        if best_move.is_none() {
            return Ok((self.evaluate(board, ply), None));
        }
        Ok((best_score, best_move))
    }
}
