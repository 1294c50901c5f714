use cozy_chess::Board;

use castellan::board::legal_moves;
use castellan::search::alphabeta::Searcher;
use castellan::search::control::{CancelToken, SearchControl};
use castellan::search::Session;

fn fresh_search(b: &Board, depth: u32) -> castellan::search::alphabeta::SearchResult {
    let mut session = Session::new(16);
    let ctl = SearchControl::unbounded(CancelToken::new());
    let mut searcher = Searcher::new(&mut session, &ctl, &[b.hash()]);
    searcher.search_depth(b, depth, 0)
}

#[test]
fn search_returns_legal_move_startpos() {
    let b = Board::default();
    let res = fresh_search(&b, 1);
    let bm = res.bestmove.expect("no move found at depth 1");
    assert!(legal_moves(&b).contains(&bm), "bestmove must be legal");
    assert!(res.nodes > 0, "search must visit nodes");
}

#[test]
fn search_prefers_winning_queen_capture() {
    // Qe2xd2 wins a queen.
    let b = Board::from_fen("k7/8/8/8/8/8/3qQ3/7K w - - 0 1", false).expect("valid fen");
    let res = fresh_search(&b, 1);
    let bm = res.bestmove.expect("expected a best move");
    assert_eq!(format!("{bm}"), "e2d2", "expected Qe2xd2, got {bm}");
}

#[test]
fn startpos_depth_4_scenario() {
    let b = Board::default();
    let res = fresh_search(&b, 4);
    let bm = res.bestmove.expect("depth 4 must produce a move");
    assert!(legal_moves(&b).contains(&bm));
    assert!(res.pv.len() <= 4, "pv longer than depth: {:?}", res.pv);
    assert!(!res.pv.is_empty(), "pv should not be empty");
    assert_eq!(res.pv[0], bm, "pv must start with the best move");
    assert!(res.nodes > 0);
}

#[test]
fn mate_in_one_found_and_scored_as_mate() {
    use castellan::search::eval::MATE_THRESHOLD;
    let b = Board::from_fen("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1", false).expect("valid fen");
    for depth in 1..=3 {
        let res = fresh_search(&b, depth);
        let bm = res.bestmove.expect("mating move expected");
        assert_eq!(format!("{bm}"), "a1a8", "depth {depth}: expected Ra8#, got {bm}");
        assert!(
            res.score_cp >= MATE_THRESHOLD,
            "depth {depth}: score {} is not a mate sentinel",
            res.score_cp
        );
    }
}

#[test]
fn stalemate_root_reports_zero_and_no_move() {
    let b = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", false).expect("valid fen");
    let res = fresh_search(&b, 3);
    assert!(res.bestmove.is_none(), "no move may be offered in stalemate");
    assert_eq!(res.score_cp, 0, "stalemate scores zero");
}

#[test]
fn check_evasion_is_legal() {
    // Black to move, in check from the rook.
    let b = Board::from_fen("k7/8/8/8/8/8/8/R3K3 b - - 0 1", false).expect("valid fen");
    let res = fresh_search(&b, 3);
    let bm = res.bestmove.expect("must find an evasion");
    assert!(legal_moves(&b).contains(&bm));
}

#[test]
fn deeper_search_does_not_hang_on_repetition() {
    // K+R vs K: the search must converge without shuffling forever.
    let b = Board::from_fen("8/8/8/3k4/8/8/3K4/7R w - - 0 1", false).expect("valid fen");
    let res = fresh_search(&b, 5);
    assert!(res.bestmove.is_some());
    assert!(res.score_cp > 300, "rook-up side should be winning: {}", res.score_cp);
}
