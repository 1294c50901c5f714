use cozy_chess::Move;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::search::eval::MATE_THRESHOLD;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    /// Mate-normalized score; pass through `to_tt`/`from_tt` at the boundary.
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
    pub gen: u32,
}

const WAYS: usize = 4;

#[derive(Default, Clone, Copy)]
struct Slot(Option<Entry>);

#[derive(Default)]
struct Bucket {
    slots: [Slot; WAYS],
}

/// Bounded transposition table: 4-way buckets, generation-aware eviction.
///
/// The generation is bumped once per top-level search; entries from older
/// generations are replaceable regardless of depth.
pub struct Tt {
    buckets: Vec<Mutex<Bucket>>,
    gen: AtomicU32,
}

impl Tt {
    pub fn new() -> Self {
        Self::with_capacity_entries(4096)
    }

    pub fn with_capacity_entries(cap: usize) -> Self {
        let entries = cap.max(WAYS);
        let buckets = (entries + WAYS - 1) / WAYS;
        let mut v = Vec::with_capacity(buckets);
        v.resize_with(buckets, || Mutex::new(Bucket::default()));
        Self {
            buckets: v,
            gen: AtomicU32::new(0),
        }
    }

    pub fn with_capacity_mb(mb: usize) -> Self {
        // ~64 bytes per entry
        let entries = ((mb.saturating_mul(1024) * 1024) / 64).max(WAYS);
        Self::with_capacity_entries(entries)
    }

    pub fn clear(&self) {
        for b in &self.buckets {
            let mut g = b.lock().unwrap();
            *g = Bucket::default();
        }
    }

    pub fn generation(&self) -> u32 {
        self.gen.load(Ordering::Relaxed)
    }

    pub fn bump_generation(&self) {
        self.gen.fetch_add(1, Ordering::Relaxed);
    }

    fn bucket_index(&self, key: u64) -> usize {
        let mixed = key ^ (key >> 32);
        (mixed as usize) % self.buckets.len()
    }

    pub fn probe(&self, key: u64) -> Option<Entry> {
        let g = self.buckets[self.bucket_index(key)].lock().unwrap();
        for slot in &g.slots {
            if let Some(e) = slot.0 {
                if e.key == key {
                    return Some(e);
                }
            }
        }
        None
    }

    pub fn store(&self, e: Entry) {
        let mut g = self.buckets[self.bucket_index(e.key)].lock().unwrap();
        let cur_gen = self.gen.load(Ordering::Relaxed);
        let mut e = e;
        e.gen = cur_gen;
        // Same key: replace when at least as deep or when the stored entry
        // is from an older search.
        for slot in &mut g.slots {
            if let Some(cur) = slot.0 {
                if cur.key == e.key {
                    if e.depth >= cur.depth || cur.gen != cur_gen {
                        slot.0 = Some(e);
                    }
                    return;
                }
            }
        }
        for slot in &mut g.slots {
            if slot.0.is_none() {
                slot.0 = Some(e);
                return;
            }
        }
        // Evict the shallowest entry, ties broken toward the oldest.
        let mut victim = 0usize;
        let mut victim_key = (u32::MAX, u32::MAX);
        for (i, slot) in g.slots.iter().enumerate() {
            if let Some(cur) = slot.0 {
                let k = (cur.depth, cur.gen);
                if k < victim_key {
                    victim_key = k;
                    victim = i;
                }
            }
        }
        g.slots[victim].0 = Some(e);
    }

    pub fn len(&self) -> usize {
        let mut n = 0;
        for b in &self.buckets {
            let g = b.lock().unwrap();
            n += g.slots.iter().filter(|s| s.0.is_some()).count();
        }
        n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Tt {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift a mate score so the stored value is distance-to-mate from this
/// node, independent of where the root happens to be.
pub fn to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

pub fn from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}
