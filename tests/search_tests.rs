//! Search Tests
//!
//! Iterative deepening, algorithm agreement, mates, draws and budgets.

use std::time::{Duration, Instant};

use minimax_chess::config::{EngineConfig, SearchAlgorithm};
use minimax_chess::core::{uci_string, Board, STARTING_FEN};
use minimax_chess::engine::search::{SearchLimits, Searcher, MATE_SCORE};
use shakmaty::Color;

fn searcher_with(algorithm: SearchAlgorithm, quiescence: bool) -> Searcher {
    Searcher::with_config(EngineConfig {
        algorithm,
        quiescence,
        ..EngineConfig::default()
    })
    .unwrap()
}

fn best_uci(searcher: &mut Searcher, fen: &str, depth: u32) -> Option<String> {
    let mut board = Board::from_fen(fen).unwrap();
    searcher
        .make_move(&mut board, SearchLimits::depth(depth))
        .map(|mv| uci_string(&mv))
}

// ============================================================================
// Basic Search Tests
// ============================================================================

#[test]
fn test_search_startpos_depth_one() {
    let mut board = Board::new();
    let mut searcher = Searcher::new();
    let outcome = searcher.search(&mut board, SearchLimits::depth(1));
    let mv = outcome.best_move.unwrap();
    assert!(board.is_legal(&mv));
    assert_eq!(outcome.depth, 1);
    assert!(!outcome.from_book);
}

#[test]
fn test_search_leaves_board_untouched() {
    let mut board = Board::new();
    board.push_uci("e2e4").unwrap();
    let fen = board.get_fen();
    let mut searcher = Searcher::new();
    searcher.search(&mut board, SearchLimits::depth(3));
    assert_eq!(board.get_fen(), fen);
    assert_eq!(board.ply(), 1);
}

#[test]
fn test_iterations_reported_per_depth() {
    let mut board = Board::new();
    let mut searcher = Searcher::new();
    let outcome = searcher.search(&mut board, SearchLimits::depth(3));
    let depths: Vec<u32> = outcome.iterations.iter().map(|i| i.depth).collect();
    assert_eq!(depths, vec![1, 2, 3]);
    assert!(outcome.iterations.iter().all(|i| i.complete && !i.pv.is_empty()));
    assert_eq!(outcome.score, outcome.iterations.last().map(|i| i.score));
    assert!(outcome.stats.nodes_searched > 0);
    assert!(outcome.stats.nodes_evaluated > 0);
}

#[test]
fn test_without_iterative_deepening_only_target_depth_runs() {
    let mut board = Board::new();
    let mut searcher = Searcher::with_config(EngineConfig {
        iterative_deepening: false,
        ..EngineConfig::default()
    })
    .unwrap();
    let outcome = searcher.search(&mut board, SearchLimits::depth(3));
    assert_eq!(outcome.iterations.len(), 1);
    assert_eq!(outcome.depth, 3);
}

#[test]
fn test_no_legal_moves() {
    let mut board = Board::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    let mut searcher = Searcher::new();
    let outcome = searcher.search(&mut board, SearchLimits::depth(3));
    assert!(outcome.best_move.is_none());
    assert!(outcome.iterations.is_empty());
}

// ============================================================================
// Algorithm Agreement Tests
// ============================================================================

#[test]
fn test_minimax_and_alphabeta_agree() {
    for fen in [
        STARTING_FEN,
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    ] {
        let mut board = Board::from_fen(fen).unwrap();
        let minimax = searcher_with(SearchAlgorithm::Minimax, false)
            .search(&mut board, SearchLimits::depth(2));
        let alphabeta = searcher_with(SearchAlgorithm::AlphaBeta, false)
            .search(&mut board, SearchLimits::depth(2));
        assert_eq!(minimax.score, alphabeta.score, "{fen}");
        assert!(minimax.stats.nodes_searched >= alphabeta.stats.nodes_searched);
    }
}

#[test]
fn test_transposition_table_does_not_change_score() {
    let mut board = Board::new();
    let plain = searcher_with(SearchAlgorithm::AlphaBeta, false)
        .search(&mut board, SearchLimits::depth(3));
    let mut tt_searcher = searcher_with(SearchAlgorithm::AlphaBetaTt, false);
    let with_tt = tt_searcher.search(&mut board, SearchLimits::depth(3));
    assert_eq!(plain.score, with_tt.score);
    assert!(!tt_searcher.tt().is_empty());
}

#[test]
fn test_alphabeta_without_ordering_agrees() {
    let mut board = Board::new();
    let ordered = searcher_with(SearchAlgorithm::AlphaBeta, true)
        .search(&mut board, SearchLimits::depth(3));
    let mut unordered = Searcher::with_config(EngineConfig {
        algorithm: SearchAlgorithm::AlphaBeta,
        move_ordering: false,
        ..EngineConfig::default()
    })
    .unwrap();
    let unordered = unordered.search(&mut board, SearchLimits::depth(3));
    assert_eq!(ordered.score, unordered.score);
}

// ============================================================================
// Mate and Draw Tests
// ============================================================================

#[test]
fn test_mate_in_one_back_rank() {
    let mut searcher = Searcher::new();
    assert_eq!(
        best_uci(&mut searcher, "k7/8/1K6/8/8/8/8/7R w - - 0 1", 2).as_deref(),
        Some("h1h8")
    );
}

#[test]
fn test_mate_in_one_corner() {
    for algorithm in [
        SearchAlgorithm::Minimax,
        SearchAlgorithm::AlphaBeta,
        SearchAlgorithm::AlphaBetaTt,
    ] {
        let mut board = Board::from_fen("8/8/8/8/8/1K6/7R/k7 w - - 0 1").unwrap();
        let outcome = searcher_with(algorithm, true).search(&mut board, SearchLimits::depth(1));
        assert_eq!(outcome.best_move.map(|m| uci_string(&m)).as_deref(), Some("h2h1"));
        assert_eq!(outcome.score, Some(MATE_SCORE - 1));
    }
}

#[test]
fn test_black_finds_mate() {
    let mut board = Board::from_fen("K7/7r/1k6/8/8/8/8/8 b - - 0 1").unwrap();
    let outcome = Searcher::new().search(&mut board, SearchLimits::depth(2));
    assert_eq!(outcome.best_move.map(|m| uci_string(&m)).as_deref(), Some("h7h8"));
    assert_eq!(outcome.score, Some(-(MATE_SCORE - 1)));
}

#[test]
fn test_shorter_mate_is_preferred() {
    // Ra8 mates at once; Ra7 Kg8 Ra8 mates a move later.
    let fen = "7k/8/6K1/8/8/8/3N4/RNB1NB2 w - - 0 1";
    for algorithm in [
        SearchAlgorithm::Minimax,
        SearchAlgorithm::AlphaBeta,
        SearchAlgorithm::AlphaBetaTt,
    ] {
        let mut searcher = Searcher::with_config(EngineConfig {
            algorithm,
            iterative_deepening: false,
            ..EngineConfig::default()
        })
        .unwrap();
        let mut board = Board::from_fen(fen).unwrap();
        let outcome = searcher.search(&mut board, SearchLimits::depth(4));
        assert_eq!(outcome.depth, 4, "{algorithm:?}");
        assert_eq!(outcome.score, Some(MATE_SCORE - 1), "{algorithm:?}");

        let mv = outcome.best_move.unwrap();
        board.push(&mv).unwrap();
        assert!(board.is_checkmate(), "{algorithm:?} played {}", uci_string(&mv));
    }
}

#[test]
fn test_stored_mate_scores_survive_earlier_moves() {
    // Black's only move is Ka1, then Rh1 mates.
    let forced = "8/8/8/8/8/1K2B3/7R/1k6 b - - 0 1";
    // Kb3 reaches the position above, so the mate is three plies away.
    let root = "8/8/8/8/8/2K1B3/7R/1k6 w - - 0 1";

    let mut reused = searcher_with(SearchAlgorithm::AlphaBetaTt, true);
    assert_eq!(best_uci(&mut reused, forced, 1).as_deref(), Some("b1a1"));
    let mut board = Board::from_fen(root).unwrap();
    let with_tt = reused.search(&mut board, SearchLimits::depth(1));

    let mut fresh = searcher_with(SearchAlgorithm::AlphaBeta, true);
    let mut board = Board::from_fen(root).unwrap();
    let without_tt = fresh.search(&mut board, SearchLimits::depth(1));

    assert_eq!(without_tt.score, Some(MATE_SCORE - 3));
    assert_eq!(with_tt.score, without_tt.score);
}

#[test]
fn test_threefold_is_scored_as_draw() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
    for mv in ["e1e2", "e8e7", "e2e1", "e7e8", "e1e2", "e8e7", "e2e1"] {
        board.push_uci(mv).unwrap();
    }
    assert_eq!(board.turn(), Color::Black);

    let mut searcher = Searcher::new();
    let outcome = searcher.search(&mut board, SearchLimits::depth(1));
    assert_eq!(outcome.best_move.map(|m| uci_string(&m)).as_deref(), Some("e7e8"));
    assert_eq!(outcome.score, Some(0));
}

// ============================================================================
// Budget Tests
// ============================================================================

#[test]
fn test_movetime_is_respected() {
    let mut board = Board::new();
    let mut searcher = Searcher::with_config(EngineConfig {
        node_check_interval: 256,
        ..EngineConfig::default()
    })
    .unwrap();
    let start = Instant::now();
    let outcome = searcher.search(&mut board, SearchLimits::movetime(200));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "stopped early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(450), "overran budget: {elapsed:?}");
    assert!(outcome.best_move.is_some());
}

#[test]
fn test_node_limit_stops_search() {
    let mut board = Board::new();
    let mut searcher = Searcher::new();
    let limits = SearchLimits {
        depth: Some(10),
        nodes: Some(500),
        ..Default::default()
    };
    let outcome = searcher.search(&mut board, limits);
    assert!(outcome.best_move.is_some());
    assert!(outcome.stats.nodes_searched <= 500);
    assert!(outcome.depth < 10);
}

#[test]
fn test_calculate_time() {
    let searcher = Searcher::new();
    let clock = SearchLimits {
        wtime: Some(60_000),
        winc: Some(1_000),
        btime: Some(1_000),
        binc: Some(5_000),
        ..Default::default()
    };
    assert_eq!(
        searcher.calculate_time(&clock, Color::White),
        Some(Duration::from_millis(2_200))
    );
    // Never more than half the remaining time.
    assert_eq!(
        searcher.calculate_time(&clock, Color::Black),
        Some(Duration::from_millis(500))
    );
    assert_eq!(
        searcher.calculate_time(&SearchLimits::movetime(300), Color::Black),
        Some(Duration::from_millis(300))
    );
    let infinite = SearchLimits {
        infinite: true,
        ..Default::default()
    };
    assert_eq!(searcher.calculate_time(&infinite, Color::White), None);
    assert_eq!(searcher.calculate_time(&SearchLimits::depth(3), Color::White), None);
}
