use cozy_chess::{Board, Move};
use std::cmp::Reverse;
use std::time::{Duration, Instant};

use crate::board::{gives_check, is_capture, legal_moves, Position};
use crate::search::alphabeta::{SearchResult, Searcher};
use crate::search::control::{CancelToken, SearchControl};
use crate::search::eval::{evaluate, MAX_DEPTH};
use crate::search::ordering::mvv_lva;
use crate::search::refine::refine_root;
use crate::search::Session;

pub const DEFAULT_DEPTH: u32 = 8;

/// Wall-clock kept in hand so the request never overruns its budget.
pub const SAFETY_MARGIN: Duration = Duration::from_millis(25);

/// Least refiner time the deepening loop must leave on the clock.
const REFINER_RESERVE_CAP: Duration = Duration::from_millis(500);

/// Per-depth cost growth: assumed factor with a single sample, and the
/// bounds on the measured ratio of the last two depths.
const GROWTH_SINGLE_SAMPLE: f64 = 3.0;
const GROWTH_MIN: f64 = 1.8;
const GROWTH_MAX: f64 = 6.0;

/// Rollout wall cap when the request is depth-driven rather than timed.
const DEPTH_MODE_ROLLOUT_BUDGET: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub rollouts: Option<u32>,
    pub movetime: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chosen {
    Refiner,
    Searcher,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub bestmove: Option<Move>,
    pub score_cp: i32,
    pub nodes: u64,
    pub depth: u32,
    pub rollouts: u32,
    pub chosen: Chosen,
}

/// Drive one request: iterative deepening with a predictive per-depth cost
/// model, then hand the remaining budget to the root refiner. `on_depth`
/// fires after every completed depth with the cumulative elapsed time.
pub fn run(
    session: &mut Session,
    pos: &Position,
    params: &GoParams,
    cancel: CancelToken,
    mut on_depth: impl FnMut(&SearchResult, Duration),
) -> Outcome {
    let start = Instant::now();
    let deadline = params.movetime.map(|b| start + b);
    let ctl = match deadline {
        Some(dl) => SearchControl::until(cancel.clone(), dl),
        None => SearchControl::unbounded(cancel.clone()),
    };
    let reserve = params
        .movetime
        .map(|b| (b / 4).min(REFINER_RESERVE_CAP))
        .unwrap_or(Duration::ZERO);

    session.tt.bump_generation();
    let board = pos.board();
    let max_depth = params.depth.unwrap_or(DEFAULT_DEPTH).clamp(1, MAX_DEPTH);

    let mut last: Option<SearchResult> = None;
    let mut last_score = evaluate(board);
    let mut durations: Vec<Duration> = Vec::new();

    let mut searcher = Searcher::new(session, &ctl, pos.key_history());
    for d in 1..=max_depth {
        if ctl.expired() {
            break;
        }
        if let Some(dl) = deadline {
            if let Some(predicted) = predict_next(&durations) {
                if Instant::now() + predicted + reserve + SAFETY_MARGIN >= dl {
                    break;
                }
            }
        }

        let t0 = Instant::now();
        let res = searcher.search_depth(board, d, last_score);
        if ctl.expired() {
            // Interrupted mid-depth; only completed depths count.
            break;
        }
        durations.push(t0.elapsed());
        last_score = res.score_cp;
        on_depth(&res, start.elapsed());
        last = Some(res);
    }
    let nodes = searcher.nodes;
    drop(searcher);

    let mut rollouts = 0u32;
    let mut refined: Option<Move> = None;
    if !cancel.is_cancelled() {
        let seed = board.hash();
        match deadline {
            Some(dl) => {
                if Instant::now() + SAFETY_MARGIN < dl {
                    let report = refine_root(board, &ctl, u32::MAX, seed);
                    rollouts = report.rollouts;
                    refined = report.bestmove;
                }
            }
            None => {
                if let Some(r) = params.rollouts.filter(|&r| r > 0) {
                    let rctl = SearchControl::until(
                        cancel.clone(),
                        Instant::now() + DEPTH_MODE_ROLLOUT_BUDGET,
                    );
                    let report = refine_root(board, &rctl, r, seed);
                    rollouts = report.rollouts;
                    refined = report.bestmove;
                }
            }
        }
    }

    let searcher_best = last.as_ref().and_then(|r| r.bestmove);
    let (bestmove, chosen) = if let Some(m) = refined {
        (Some(m), Chosen::Refiner)
    } else if let Some(m) = searcher_best {
        (Some(m), Chosen::Searcher)
    } else {
        (fallback_move(board), Chosen::Fallback)
    };

    Outcome {
        bestmove,
        score_cp: last.as_ref().map(|r| r.score_cp).unwrap_or(last_score),
        nodes,
        depth: last.as_ref().map(|r| r.depth).unwrap_or(0),
        rollouts,
        chosen,
    }
}

/// Predicted cost of the next depth: the last depth's duration times a
/// bounded growth ratio. `None` until one depth has completed.
fn predict_next(durations: &[Duration]) -> Option<Duration> {
    let n = durations.len();
    if n == 0 {
        return None;
    }
    let last = durations[n - 1].as_secs_f64();
    let ratio = if n >= 2 {
        let prev = durations[n - 2].as_secs_f64().max(1e-6);
        (last / prev).clamp(GROWTH_MIN, GROWTH_MAX)
    } else {
        GROWTH_SINGLE_SAMPLE
    };
    Some(Duration::from_secs_f64(last * ratio))
}

/// Deterministic last-resort move: captures first, then check-givers, then
/// the strongest capture by MVV-LVA; remaining ties keep generation order,
/// so a fully quiet position yields the first legal move. Never randomized.
pub fn fallback_move(board: &Board) -> Option<Move> {
    let mut moves = legal_moves(board);
    if moves.is_empty() {
        return None;
    }
    moves.sort_by_key(|&m| {
        Reverse((
            is_capture(board, m) as i32,
            gives_check(board, m) as i32,
            mvv_lva(board, m),
        ))
    });
    moves.into_iter().next()
}
