use cozy_chess::{Board, Color, Move, Square};
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::board::{gives_check, is_capture};
use crate::search::eval::{piece_value, PAWN};

const TT_MOVE: i64 = 1_000_000;
const CAPTURE_BASE: i64 = 200_000;
const KILLER_FIRST: i64 = 150_000;
const KILLER_SECOND: i64 = 140_000;
const CHECK_BONUS: i64 = 10_000;

/// Victim-attacker capture score; 0 for quiet moves.
pub fn mvv_lva(board: &Board, mv: Move) -> i32 {
    if !is_capture(board, mv) {
        return 0;
    }
    let victim = board.piece_on(mv.to).map(piece_value).unwrap_or(PAWN);
    let attacker = board.piece_on(mv.from).map(piece_value).unwrap_or(PAWN);
    victim * 10 - attacker
}

/// Two quiet cutoff moves per ply, most recent first.
pub struct Killers {
    slots: Vec<[Option<Move>; 2]>,
}

impl Killers {
    pub fn new(max_ply: usize) -> Self {
        Self {
            slots: vec![[None, None]; max_ply],
        }
    }

    pub fn clear(&mut self) {
        for s in &mut self.slots {
            *s = [None, None];
        }
    }

    pub fn get(&self, ply: i32) -> [Option<Move>; 2] {
        self.slots
            .get(ply as usize)
            .copied()
            .unwrap_or([None, None])
    }

    pub fn record(&mut self, ply: i32, mv: Move) {
        let p = ply as usize;
        if p >= self.slots.len() {
            return;
        }
        let slot = &mut self.slots[p];
        if slot[0] == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }
}

/// Quiet-cutoff counts keyed by (side to move, destination square),
/// bumped by depth squared and never decayed.
#[derive(Default)]
pub struct History {
    table: HashMap<(Color, Square), i32>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn bump(&mut self, side: Color, dest: Square, depth: i32) {
        *self.table.entry((side, dest)).or_insert(0) += depth * depth;
    }

    pub fn score(&self, side: Color, dest: Square) -> i32 {
        self.table.get(&(side, dest)).copied().unwrap_or(0)
    }
}

/// Sort moves for the searcher: TT move, then captures by MVV-LVA, then
/// killers, then check-givers, then history, then the rest.
pub fn order_moves(
    board: &Board,
    moves: &mut [Move],
    tt_move: Option<Move>,
    killers: [Option<Move>; 2],
    history: &History,
) {
    let us = board.side_to_move();
    moves.sort_by_key(|&m| {
        let mut k = 0i64;
        if tt_move == Some(m) {
            k += TT_MOVE;
        }
        let cap = mvv_lva(board, m);
        if cap > 0 {
            k += CAPTURE_BASE + cap as i64;
        }
        if killers[0] == Some(m) {
            k += KILLER_FIRST;
        } else if killers[1] == Some(m) {
            k += KILLER_SECOND;
        }
        if gives_check(board, m) {
            k += CHECK_BONUS;
        }
        k += history.score(us, m.to) as i64;
        Reverse(k)
    });
}
