use cozy_chess::{Board, Move};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use crate::board::{gives_check, is_capture, legal_moves};
use crate::search::control::SearchControl;
use crate::search::eval::evaluate;
use crate::search::ordering::mvv_lva;
use crate::search::scheduler::SAFETY_MARGIN;

const C_PUCT: f64 = 1.5;
const ROLLOUT_PLIES: u32 = 8;
/// Centipawn scale mapping leaf evaluations into [-1, 1].
const VALUE_SCALE: f64 = 600.0;
/// Soft-max temperature over the capture/check prior scores.
const PRIOR_TEMP: f64 = 400.0;
const CHECK_PRIOR: f64 = 0.5;

struct Candidate {
    mv: Move,
    prior: f64,
    visits: u32,
    total: f64,
}

impl Candidate {
    fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total / self.visits as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefineReport {
    pub bestmove: Option<Move>,
    pub rollouts: u32,
}

/// Monte-Carlo refinement over the root candidate moves, consuming whatever
/// time is left on the shared deadline (minus the safety margin) or up to
/// `max_rollouts`, whichever comes first. Returns the most valuable visited
/// move, or nothing if no rollout completed.
pub fn refine_root(
    board: &Board,
    ctl: &SearchControl,
    max_rollouts: u32,
    seed: u64,
) -> RefineReport {
    let moves = legal_moves(board);
    if moves.is_empty() {
        return RefineReport {
            bestmove: None,
            rollouts: 0,
        };
    }

    // Capture/check weighted soft-max prior.
    let raw: Vec<f64> = moves
        .iter()
        .map(|&m| {
            let mut s = mvv_lva(board, m) as f64 / PRIOR_TEMP;
            if gives_check(board, m) {
                s += CHECK_PRIOR;
            }
            s
        })
        .collect();
    let denom: f64 = raw.iter().map(|s| s.exp()).sum();
    let mut cands: Vec<Candidate> = moves
        .iter()
        .zip(&raw)
        .map(|(&mv, &s)| Candidate {
            mv,
            prior: s.exp() / denom,
            visits: 0,
            total: 0.0,
        })
        .collect();

    let root_side = board.side_to_move();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut rollouts = 0u32;

    while rollouts < max_rollouts && !out_of_time(ctl) {
        let n_total: u32 = cands.iter().map(|c| c.visits).sum();
        let pick = select(&cands, n_total);

        let mut child = board.clone();
        child.play(cands[pick].mv);
        let value = rollout_value(&child, root_side, &mut rng);

        cands[pick].visits += 1;
        cands[pick].total += value;
        rollouts += 1;
    }

    let bestmove = cands
        .iter()
        .filter(|c| c.visits > 0)
        .max_by(|a, b| a.mean().partial_cmp(&b.mean()).unwrap_or(std::cmp::Ordering::Equal))
        .map(|c| c.mv);

    RefineReport { bestmove, rollouts }
}

fn out_of_time(ctl: &SearchControl) -> bool {
    if ctl.token().is_cancelled() {
        return true;
    }
    match ctl.deadline() {
        Some(dl) => Instant::now() + SAFETY_MARGIN >= dl,
        None => false,
    }
}

/// Mean value plus an exploration bonus scaled by the prior and shrunk by
/// the visit count.
fn select(cands: &[Candidate], n_total: u32) -> usize {
    let sqrt_n = ((n_total + 1) as f64).sqrt();
    let mut best = 0usize;
    let mut best_u = f64::NEG_INFINITY;
    for (i, c) in cands.iter().enumerate() {
        let u = c.mean() + C_PUCT * c.prior * sqrt_n / (1.0 + c.visits as f64);
        if u > best_u {
            best_u = u;
            best = i;
        }
    }
    best
}

/// Short heuristic-guided playout: follow the loudest capture/check line up
/// to the ply budget, stop when the position goes quiet, then score the
/// leaf statically from the root mover's perspective.
fn rollout_value(after_root_move: &Board, root_side: cozy_chess::Color, rng: &mut SmallRng) -> f64 {
    let mut cur = after_root_move.clone();
    for _ in 0..ROLLOUT_PLIES {
        let moves = legal_moves(&cur);
        if moves.is_empty() {
            break;
        }
        let mut best: Option<(Move, i32)> = None;
        for m in moves {
            if !is_capture(&cur, m) && !gives_check(&cur, m) {
                continue;
            }
            // Small jitter diversifies equal-looking lines between rollouts.
            let score = mvv_lva(&cur, m) + rng.gen_range(0..16);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((m, score));
            }
        }
        let Some((m, _)) = best else {
            break;
        };
        cur.play(m);
    }

    let v = (evaluate(&cur) as f64 / VALUE_SCALE).clamp(-1.0, 1.0);
    if cur.side_to_move() == root_side {
        v
    } else {
        -v
    }
}
