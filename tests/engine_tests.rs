//! Engine Module Tests
//!
//! Opening book, evaluation, transposition table and book play through the searcher.

use std::fs;

use minimax_chess::config::EngineConfig;
use minimax_chess::core::{uci_string, Board, STARTING_FEN};
use minimax_chess::engine::book::OpeningBook;
use minimax_chess::engine::eval::{Evaluator, Phase};
use minimax_chess::engine::search::{SearchLimits, Searcher};
use minimax_chess::engine::tt::{TTFlag, TTProbe, TranspositionTable};
use minimax_chess::error::EngineError;

const BOOK: &str = "\
pos rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -
e2e4 100
pos rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq -
c7c5 60
e7e5 40
";

fn book_config(dir: &tempfile::TempDir) -> EngineConfig {
    let path = dir.path().join("book.txt");
    fs::write(&path, BOOK).unwrap();
    EngineConfig {
        book_path: Some(path),
        ..EngineConfig::default()
    }
}

// ============================================================================
// Opening Book Tests
// ============================================================================

#[test]
fn test_book_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = book_config(&dir);
    let book = OpeningBook::load(config.book_path.as_deref().unwrap()).unwrap();
    assert_eq!(book.len(), 2);

    let mut board = Board::new();
    assert_eq!(uci_string(&book.probe(&board).unwrap()), "e2e4");
    board.push_uci("e2e4").unwrap();
    for _ in 0..20 {
        let reply = uci_string(&book.probe(&board).unwrap());
        assert!(reply == "c7c5" || reply == "e7e5");
    }
}

#[test]
fn test_book_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = OpeningBook::load(&dir.path().join("nope.txt"));
    assert!(matches!(result, Err(EngineError::Io { .. })));

    let config = EngineConfig {
        book_path: Some(dir.path().join("nope.txt")),
        ..EngineConfig::default()
    };
    assert!(Searcher::with_config(config).is_err());
}

#[test]
fn test_searcher_plays_book_then_leaves_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut searcher = Searcher::with_config(book_config(&dir)).unwrap();

    let mut board = Board::new();
    let outcome = searcher.search(&mut board, SearchLimits::depth(2));
    assert!(outcome.from_book);
    assert_eq!(outcome.score, None);
    assert_eq!(uci_string(&outcome.best_move.unwrap()), "e2e4");

    board.push_uci("d2d4").unwrap();
    let outcome = searcher.search(&mut board, SearchLimits::depth(1));
    assert!(!outcome.from_book);
    assert!(!searcher.in_opening());

    // Out of book stays out of book, even for known positions.
    let mut start = Board::new();
    assert!(!searcher.search(&mut start, SearchLimits::depth(1)).from_book);

    searcher.clear();
    assert!(searcher.in_opening());
    assert!(searcher.search(&mut start, SearchLimits::depth(1)).from_book);
}

#[test]
fn test_book_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut searcher = Searcher::with_config(book_config(&dir)).unwrap();
    searcher.set_use_book(false);
    let outcome = searcher.search(&mut Board::new(), SearchLimits::depth(1));
    assert!(!outcome.from_book);
    assert!(searcher.book().is_some());
}

// ============================================================================
// Evaluation Tests
// ============================================================================

#[test]
fn test_eval_material_advantage() {
    let eval = Evaluator::new();
    let no_black_queen =
        Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    assert!(eval.evaluate(&no_black_queen, 0, false) > 800);
}

#[test]
fn test_eval_is_color_symmetric() {
    let eval = Evaluator::new();
    let white = Board::from_fen("4k3/8/8/8/3N4/8/4P3/4K3 w - - 0 1").unwrap();
    let black = Board::from_fen("4k3/4p3/8/3n4/8/8/8/4K3 b - - 0 1").unwrap();
    let ending = Phase::of(&white).ending;
    assert_eq!(
        eval.evaluate(&white, 0, ending),
        -eval.evaluate(&black, 0, ending)
    );
}

#[test]
fn test_eval_insufficient_material_is_draw() {
    let eval = Evaluator::new();
    let kn = Board::from_fen("4k3/8/8/8/8/8/8/3NK3 w - - 0 1").unwrap();
    assert_eq!(eval.evaluate(&kn, 0, true), 0);
}

// ============================================================================
// Transposition Table Tests
// ============================================================================

#[test]
fn test_tt_probe_respects_depth_and_bounds() {
    let mut tt = TranspositionTable::new();
    let board = Board::new();
    let mv = board.parse_uci("e2e4").unwrap();
    tt.store(board.hash(), 4, 0, 30, TTFlag::LowerBound, Some(mv.clone()));

    // Too shallow for a deeper request.
    assert!(matches!(tt.probe(board.hash(), 5, 0, -100, 100), TTProbe::Stored(_)));
    // Lower bound at or above beta cuts.
    assert!(matches!(tt.probe(board.hash(), 4, 0, -100, 30), TTProbe::Cutoff(_)));
    // Lower bound inside the window does not.
    match tt.probe(board.hash(), 3, 0, -100, 100) {
        TTProbe::Stored(entry) => assert_eq!(entry.best_move, Some(mv)),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tt.probe(1, 1, 0, -100, 100), TTProbe::Miss);
}

#[test]
fn test_searcher_clear_empties_tables() {
    let mut searcher = Searcher::new();
    let mut board = Board::from_fen(STARTING_FEN).unwrap();
    searcher.search(&mut board, SearchLimits::depth(3));
    assert!(!searcher.tt().is_empty());
    searcher.clear();
    assert!(searcher.tt().is_empty());
    assert_eq!(searcher.stats().nodes_searched, 0);
}
