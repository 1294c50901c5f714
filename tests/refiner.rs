use cozy_chess::Board;
use std::time::{Duration, Instant};

use castellan::board::legal_moves;
use castellan::search::control::{CancelToken, SearchControl};
use castellan::search::refine::refine_root;

#[test]
fn refiner_only_selects_legal_moves() {
    let b = Board::from_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3",
        false,
    )
    .expect("valid fen");
    let ctl = SearchControl::unbounded(CancelToken::new());
    let report = refine_root(&b, &ctl, 64, b.hash());
    assert_eq!(report.rollouts, 64, "unbounded control runs to the cap");
    let bm = report.bestmove.expect("visited moves exist");
    assert!(legal_moves(&b).contains(&bm), "refined move must be legal");
}

#[test]
fn refiner_finds_the_hanging_queen() {
    let b = Board::from_fen("k7/8/8/8/8/8/3qQ3/7K w - - 0 1", false).expect("valid fen");
    let ctl = SearchControl::unbounded(CancelToken::new());
    let report = refine_root(&b, &ctl, 256, 7);
    let bm = report.bestmove.expect("visited moves exist");
    assert_eq!(format!("{bm}"), "e2d2", "taking the queen has the best mean value");
}

#[test]
fn refiner_respects_the_deadline() {
    let b = Board::default();
    let cancel = CancelToken::new();
    let ctl = SearchControl::until(cancel, Instant::now() + Duration::from_millis(80));
    let t0 = Instant::now();
    let report = refine_root(&b, &ctl, u32::MAX, 1);
    assert!(
        t0.elapsed() < Duration::from_millis(300),
        "refiner ran past its deadline"
    );
    assert!(report.rollouts > 0, "some rollouts should fit in 80ms");
}

#[test]
fn refiner_reports_nothing_when_out_of_time() {
    let b = Board::default();
    let cancel = CancelToken::new();
    cancel.cancel();
    let ctl = SearchControl::unbounded(cancel);
    let report = refine_root(&b, &ctl, u32::MAX, 1);
    assert_eq!(report.rollouts, 0);
    assert!(report.bestmove.is_none(), "nothing visited, nothing chosen");
}

#[test]
fn refiner_handles_terminal_positions() {
    let stalemate =
        Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", false).expect("valid fen");
    let ctl = SearchControl::unbounded(CancelToken::new());
    let report = refine_root(&stalemate, &ctl, 16, 1);
    assert!(report.bestmove.is_none());
    assert_eq!(report.rollouts, 0);
}

#[test]
fn refiner_is_deterministic_for_a_fixed_seed() {
    let b = Board::default();
    let ctl = SearchControl::unbounded(CancelToken::new());
    let a = refine_root(&b, &ctl, 128, 42).bestmove;
    let c = refine_root(&b, &ctl, 128, 42).bestmove;
    assert_eq!(a, c, "same seed and rollout count must agree");
}
