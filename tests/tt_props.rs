use castellan::search::tt::{from_tt, to_tt, Bound, Entry, Tt};

fn entry(key: u64, depth: u32, score: i32) -> Entry {
    Entry {
        key,
        depth,
        score,
        best: None,
        bound: Bound::Exact,
        gen: 0,
    }
}

#[test]
fn exact_entry_round_trips() {
    let tt = Tt::with_capacity_entries(1024);
    tt.store(entry(42, 6, 133));
    let e = tt.probe(42).expect("stored entry must probe back");
    assert_eq!(e.score, 133);
    assert_eq!(e.depth, 6);
    assert_eq!(e.bound, Bound::Exact);
}

#[test]
fn deeper_entry_replaces_same_key() {
    let tt = Tt::with_capacity_entries(1024);
    tt.store(entry(7, 3, 10));
    tt.store(entry(7, 5, 20));
    assert_eq!(tt.probe(7).unwrap().score, 20, "deeper store must win");
}

#[test]
fn shallower_entry_kept_out_same_generation() {
    let tt = Tt::with_capacity_entries(1024);
    tt.store(entry(7, 5, 20));
    tt.store(entry(7, 2, 99));
    assert_eq!(
        tt.probe(7).unwrap().score,
        20,
        "shallower same-generation store must not replace"
    );
}

#[test]
fn stale_generation_is_replaceable() {
    let tt = Tt::with_capacity_entries(1024);
    tt.store(entry(7, 9, 20));
    tt.bump_generation();
    tt.store(entry(7, 1, 55));
    assert_eq!(
        tt.probe(7).unwrap().score,
        55,
        "entry from an old search loses to any new store"
    );
}

#[test]
fn eviction_prefers_shallowest_then_oldest() {
    // Single 4-way bucket so every key collides.
    let tt = Tt::with_capacity_entries(4);
    tt.store(entry(1, 5, 0));
    tt.bump_generation();
    tt.store(entry(2, 5, 0));
    tt.bump_generation();
    tt.store(entry(3, 5, 0));
    tt.bump_generation();
    tt.store(entry(4, 5, 0));
    tt.bump_generation();
    tt.store(entry(99, 5, 0));
    assert!(tt.probe(1).is_none(), "oldest equal-depth entry not evicted");
    assert!(tt.probe(99).is_some(), "new entry not inserted");
}

#[test]
fn clear_empties_table() {
    let tt = Tt::with_capacity_entries(64);
    tt.store(entry(1, 1, 1));
    assert!(!tt.is_empty());
    tt.clear();
    assert!(tt.is_empty());
}

#[test]
fn mate_scores_normalize_per_ply() {
    use castellan::search::eval::MATE;
    // A mate score stored at one ply and read at another keeps the same
    // distance-to-mate from the reading node's perspective.
    for &(score, ply) in &[(MATE - 10, 4), (-(MATE - 7), 9), (123, 30)] {
        assert_eq!(
            from_tt(to_tt(score, ply), ply),
            score,
            "round trip at same ply must be exact"
        );
    }
    let stored = to_tt(MATE - 10, 4);
    assert_eq!(
        stored,
        MATE - 6,
        "stored form is distance from the storing node"
    );
    assert_eq!(from_tt(stored, 2), MATE - 8, "read at a shallower ply");
}
