//! End-to-end: the real worker binary supervised by the bridge.

use castellan::board::{legal_moves, Position};
use castellan::bridge::{EngineEvent, Score, SearchRequest, UciBridge};

fn worker_bridge() -> UciBridge {
    UciBridge::new(vec![env!("CARGO_BIN_EXE_castellan").to_string()])
}

#[test]
fn depth_search_round_trips_a_legal_move() {
    let bridge = worker_bridge();
    let req = SearchRequest {
        depth: Some(2),
        ..Default::default()
    };
    let mut events = Vec::new();
    let mv = bridge
        .search(&req, &mut |e| events.push(e))
        .expect("worker search should finish");
    bridge.shutdown();

    let pos = Position::startpos();
    let found = legal_moves(pos.board())
        .iter()
        .any(|m| format!("{m}") == mv);
    assert!(found, "worker returned illegal move {mv}");

    let depths: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Info(p) => p.depth,
            _ => None,
        })
        .collect();
    assert!(
        depths.contains(&1) && depths.contains(&2),
        "one info event per completed depth: {depths:?}"
    );
    assert!(matches!(events.last(), Some(EngineEvent::Done)));
}

#[test]
fn mate_in_one_reports_mate_score_over_the_wire() {
    let bridge = worker_bridge();
    let req = SearchRequest {
        fen: Some("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1".to_string()),
        depth: Some(2),
        ..Default::default()
    };
    let mut events = Vec::new();
    let mv = bridge
        .search(&req, &mut |e| events.push(e))
        .expect("worker search should finish");
    bridge.shutdown();

    assert_eq!(mv, "a1a8", "only Ra8 mates");
    let saw_mate = events.iter().any(|e| {
        matches!(e, EngineEvent::Info(p) if matches!(p.score, Some(Score::Mate(n)) if n > 0))
    });
    assert!(saw_mate, "score must be a mate sentinel, not centipawns: {events:?}");
}

#[test]
fn movetime_search_finishes_promptly() {
    use std::time::{Duration, Instant};
    let bridge = worker_bridge();
    let req = SearchRequest {
        movetime_ms: Some(200),
        ..Default::default()
    };
    let t0 = Instant::now();
    let mut events = Vec::new();
    let mv = bridge
        .search(&req, &mut |e| events.push(e))
        .expect("timed search should finish");
    bridge.shutdown();

    assert_ne!(mv, "0000");
    // Budget plus margin plus process/protocol slack.
    assert!(
        t0.elapsed() < Duration::from_millis(200) + Duration::from_secs(2),
        "timed search took {:?}",
        t0.elapsed()
    );
}

#[test]
fn new_game_resets_and_stays_ready() {
    let bridge = worker_bridge();
    bridge.ensure_started().expect("worker starts");
    assert!(bridge.new_game().expect("probe"), "worker must come back ready");
    bridge.shutdown();
}
