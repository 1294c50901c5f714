use std::time::Duration;

use castellan::engine::uci::parse_go;
use castellan::engine::{create, ab::uci_score, Engine, EngineConfig};

fn new_engine() -> Box<dyn Engine> {
    create("ab", &EngineConfig { tt_mb: 8 })
}

#[test]
fn parse_go_depth_and_rollouts() {
    let p = parse_go(" depth 6 rollouts 150");
    assert_eq!(p.depth, Some(6));
    assert_eq!(p.rollouts, Some(150));
    assert_eq!(p.movetime, None);
}

#[test]
fn parse_go_movetime() {
    let p = parse_go(" movetime 2500");
    assert_eq!(p.movetime, Some(Duration::from_millis(2500)));
    assert_eq!(p.depth, None);
}

#[test]
fn parse_go_ignores_junk_tokens() {
    let p = parse_go(" wtime 1000 depth 3 ponder");
    assert_eq!(p.depth, Some(3));
}

#[test]
fn unknown_engine_falls_back_to_default() {
    let eng = create("definitely-not-registered", &EngineConfig::default());
    assert_eq!(eng.name(), "Castellan 0.1");
}

#[test]
fn position_startpos_with_moves() {
    let mut eng = new_engine();
    eng.handle_position("startpos moves e2e4 e7e5 g1f3")
        .expect("legal move sequence");
    // Knight is on f3 now; the immediate fallback move must be legal.
    let bm = eng.best_move_now();
    assert_ne!(bm, "0000");
}

#[test]
fn position_fen_roundtrip() {
    let mut eng = new_engine();
    eng.handle_position("fen r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3")
        .expect("valid fen");
}

#[test]
fn position_bad_fen_is_rejected() {
    let mut eng = new_engine();
    assert!(eng.handle_position("fen not a real fen at all x").is_err());
    // The engine must still be usable afterwards.
    assert_ne!(eng.best_move_now(), "0000");
}

#[test]
fn position_illegal_move_is_never_applied() {
    let mut eng = new_engine();
    assert!(eng.handle_position("startpos moves e2e5").is_err());
}

#[test]
fn best_move_now_is_0000_without_legal_moves() {
    let mut eng = new_engine();
    eng.handle_position("fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1")
        .expect("stalemate fen parses");
    assert_eq!(eng.best_move_now(), "0000");
}

#[test]
fn uci_score_formats_cp_and_mate() {
    use castellan::search::eval::MATE;
    assert_eq!(uci_score(35), "cp 35");
    assert_eq!(uci_score(-120), "cp -120");
    assert_eq!(uci_score(MATE - 1), "mate 1");
    assert_eq!(uci_score(MATE - 3), "mate 2");
    assert_eq!(uci_score(-(MATE - 2)), "mate -1");
}
