use cozy_chess::{Board, Move};
use std::collections::HashSet;

use crate::board::{in_check, is_capture, legal_moves};
use crate::search::control::SearchControl;
use crate::search::eval::{
    evaluate, insufficient_material, non_pawn_material, DRAW, INF, MATE, MAX_PLY,
};
use crate::search::ordering::{mvv_lva, order_moves};
use crate::search::tt::{from_tt, to_tt, Bound, Entry};
use crate::search::Session;

// Tunables
const ASP_WINDOW: i32 = 24;
const ASP_MAX_WIDEN: i32 = 2048;

const Q_INCLUDE_CHECKS: bool = true;
const Q_FUTILITY_MARGIN: i32 = 150;

const NMP_MIN_DEPTH: i32 = 3;
const NMP_R: i32 = 2;
const ZUGZWANG_MATERIAL: i32 = 1000;

const FUTILITY_MARGIN_BASE: i32 = 200;

const MCP_MIN_DEPTH: i32 = 3;
const MCP_START_AT: usize = 6;

const LMR_MIN_DEPTH: i32 = 3;
const LMR_BASE_REDUCTION: i32 = 1;
const LMR_START_AT: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub bestmove: Option<Move>,
    pub score_cp: i32,
    pub pv: Vec<Move>,
    pub nodes: u64,
    pub depth: u32,
}

/// One alpha-beta search over a borrowed session. Node counts accumulate
/// across depths of the same request.
pub struct Searcher<'a> {
    session: &'a mut Session,
    ctl: &'a SearchControl,
    game_keys: Vec<u64>,
    pub nodes: u64,
}

impl<'a> Searcher<'a> {
    /// `game_keys` is the hash of every position on the game line up to and
    /// including the root, used to recognize repetitions across the root.
    pub fn new(session: &'a mut Session, ctl: &'a SearchControl, game_keys: &[u64]) -> Self {
        Self {
            session,
            ctl,
            game_keys: game_keys.to_vec(),
            nodes: 0,
        }
    }

    /// Search one depth with an aspiration window seeded on the previous
    /// score: doubled and re-centered on the failing score until it holds,
    /// with one full-window re-search past the widening cap.
    pub fn search_depth(&mut self, board: &Board, depth: u32, last_score: i32) -> SearchResult {
        let mut window = ASP_WINDOW;
        let mut alpha = last_score - window;
        let mut beta = last_score + window;

        let (bestmove, score) = loop {
            let (bm, sc) = self.root_search(board, depth as i32, alpha, beta);
            if self.ctl.should_stop(self.nodes) {
                break (bm, sc);
            }
            if sc <= alpha || sc >= beta {
                if window < ASP_MAX_WIDEN {
                    window = (window * 2).min(ASP_MAX_WIDEN);
                    alpha = sc - window;
                    beta = sc + window;
                    continue;
                }
                break self.root_search(board, depth as i32, -INF + 1, INF - 1);
            }
            break (bm, sc);
        };

        let pv = self.pv_from_tt(board, depth as usize);
        SearchResult {
            bestmove,
            score_cp: score.clamp(-INF + 1, INF - 1),
            pv,
            nodes: self.nodes,
            depth,
        }
    }

    fn root_search(&mut self, board: &Board, depth: i32, alpha: i32, beta: i32) -> (Option<Move>, i32) {
        let mut a = alpha;
        let mut best_score = -INF;
        let mut best_move: Option<Move> = None;

        let key = board.hash();
        let tt_move = self.session.tt.probe(key).and_then(|e| e.best);
        let killers = self.session.killers.get(0);
        let mut moves = legal_moves(board);
        if moves.is_empty() {
            let score = if in_check(board) { -MATE } else { DRAW };
            return (None, score);
        }
        order_moves(board, &mut moves, tt_move, killers, &self.session.history);

        for (i, m) in moves.into_iter().enumerate() {
            if self.ctl.should_stop(self.nodes) {
                break;
            }
            let mut child = board.clone();
            child.play(m);

            let mut rep = self.game_keys.clone();
            let mut score;
            if i == 0 {
                score = -self.negamax(&child, depth - 1, -beta, -a, 1, true, &mut rep);
            } else {
                score = -self.negamax(&child, depth - 1, -a - 1, -a, 1, false, &mut rep);
                if score > a && score < beta {
                    score = -self.negamax(&child, depth - 1, -beta, -a, 1, true, &mut rep);
                }
            }

            if score > best_score {
                best_score = score;
                best_move = Some(m);
            }
            if score > a {
                a = score;
                if a >= beta {
                    break;
                }
            }
        }

        if let Some(bm) = best_move {
            let bound = if best_score <= alpha {
                Bound::Upper
            } else if best_score >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.session.tt.store(Entry {
                key,
                depth: depth.max(0) as u32,
                score: to_tt(best_score, 0),
                best: Some(bm),
                bound,
                gen: 0,
            });
        }
        (best_move, best_score)
    }

    fn negamax(
        &mut self,
        board: &Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: i32,
        is_pv: bool,
        rep: &mut Vec<u64>,
    ) -> i32 {
        if self.ctl.should_stop(self.nodes) {
            return alpha;
        }
        self.nodes += 1;

        alpha = alpha.max(-INF + 1);
        beta = beta.min(INF - 1);
        if alpha >= beta {
            alpha = beta - 1;
        }
        if ply >= MAX_PLY {
            return evaluate(board);
        }

        let key = board.hash();

        if let Some(tte) = self.session.tt.probe(key) {
            if tte.depth as i32 >= depth {
                let tts = from_tt(tte.score, ply);
                match tte.bound {
                    Bound::Exact => return tts,
                    Bound::Upper => {
                        if tts <= alpha {
                            return tts;
                        }
                    }
                    Bound::Lower => {
                        if tts >= beta {
                            return tts;
                        }
                    }
                }
            }
        }

        if board.halfmove_clock() >= 100 || insufficient_material(board) {
            return DRAW;
        }
        // Third occurrence of this position on the current line is a draw.
        if rep.iter().filter(|&&k| k == key).count() >= 2 {
            return DRAW;
        }
        rep.push(key);

        let we_are_checked = in_check(board);
        let local_depth = if we_are_checked { depth + 1 } else { depth };
        if local_depth <= 0 {
            let v = self.qsearch(board, alpha, beta, ply);
            rep.pop();
            return v;
        }

        // Null move: hand the turn over at reduced depth; a fail-high there
        // prunes this subtree. Skipped in check and with little non-pawn
        // material, where passing can be the only good "move".
        if !we_are_checked
            && local_depth >= NMP_MIN_DEPTH
            && non_pawn_material(board) > ZUGZWANG_MATERIAL
        {
            if let Some(nb) = board.null_move() {
                let score = -self.negamax(
                    &nb,
                    local_depth - 1 - NMP_R,
                    -beta,
                    -beta + 1,
                    ply + 1,
                    false,
                    rep,
                );
                if score >= beta {
                    rep.pop();
                    return beta;
                }
            }
        }

        let orig_alpha = alpha;
        let mut best_score = -INF;
        let mut best_move: Option<Move> = None;

        let killers = self.session.killers.get(ply);
        let tt_move = self.session.tt.probe(key).and_then(|e| e.best);
        let mut moves = legal_moves(board);
        if moves.is_empty() {
            rep.pop();
            return if we_are_checked { -(MATE - ply) } else { DRAW };
        }
        order_moves(board, &mut moves, tt_move, killers, &self.session.history);

        let mut static_eval: Option<i32> = None;
        if local_depth == 1 {
            static_eval = Some(evaluate(board));
        }

        for (idx, m) in moves.into_iter().enumerate() {
            if self.ctl.should_stop(self.nodes) {
                break;
            }

            let is_cap = is_capture(board, m);
            let mut child = board.clone();
            child.play(m);
            let gives_chk = in_check(&child);

            // Frontier futility: a quiet move at the frontier whose static
            // eval plus margin cannot reach alpha is not worth a qsearch.
            if local_depth == 1 && !is_cap && !gives_chk {
                let se = *static_eval.get_or_insert_with(|| evaluate(board));
                if se + FUTILITY_MARGIN_BASE <= alpha {
                    continue;
                }
            }

            // Move-count pruning: very late quiets at real depth.
            if local_depth >= MCP_MIN_DEPTH && idx >= MCP_START_AT && !is_cap && !gives_chk {
                continue;
            }

            let score;
            let do_lmr = local_depth >= LMR_MIN_DEPTH
                && !is_pv
                && !is_cap
                && !gives_chk
                && idx >= LMR_START_AT;

            if do_lmr {
                let reduce = LMR_BASE_REDUCTION + i32::from(idx >= 6);
                let new_depth = (local_depth - 1 - reduce).max(1);
                let mut s = -self.negamax(&child, new_depth, -alpha - 1, -alpha, ply + 1, false, rep);
                if s > alpha {
                    s = -self.negamax(&child, local_depth - 1, -beta, -alpha, ply + 1, false, rep);
                }
                score = s;
            } else if idx == 0 {
                score = -self.negamax(&child, local_depth - 1, -beta, -alpha, ply + 1, is_pv, rep);
            } else {
                let mut s = -self.negamax(&child, local_depth - 1, -alpha - 1, -alpha, ply + 1, false, rep);
                if s > alpha && s < beta {
                    s = -self.negamax(&child, local_depth - 1, -beta, -alpha, ply + 1, true, rep);
                }
                score = s;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(m);
            }
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    if !is_cap {
                        self.session.killers.record(ply, m);
                        self.session
                            .history
                            .bump(board.side_to_move(), m.to, local_depth);
                    }
                    break;
                }
            }
        }

        rep.pop();

        // Every move pruned away: fail low without polluting the table.
        let Some(bm) = best_move else {
            return alpha;
        };

        let bound = if best_score <= orig_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.session.tt.store(Entry {
            key,
            depth: local_depth as u32,
            score: to_tt(best_score, ply),
            best: Some(bm),
            bound,
            gen: 0,
        });

        best_score
    }

    fn qsearch(&mut self, board: &Board, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        if self.ctl.should_stop(self.nodes) {
            return alpha;
        }
        self.nodes += 1;

        if ply >= MAX_PLY {
            return evaluate(board);
        }

        let moves = legal_moves(board);
        if moves.is_empty() {
            return if in_check(board) { -(MATE - ply) } else { DRAW };
        }
        if board.halfmove_clock() >= 100 || insufficient_material(board) {
            return DRAW;
        }

        let stand = evaluate(board);
        if stand >= beta {
            return beta;
        }
        if stand > alpha {
            alpha = stand;
        }
        if stand + Q_FUTILITY_MARGIN < alpha {
            return alpha;
        }

        let mut noisy: Vec<Move> = Vec::new();
        for m in moves {
            let cap = is_capture(board, m);
            let checks = Q_INCLUDE_CHECKS && {
                let mut child = board.clone();
                child.play(m);
                in_check(&child)
            };
            if cap || checks {
                noisy.push(m);
            }
        }
        noisy.sort_by_key(|&m| std::cmp::Reverse(mvv_lva(board, m)));

        for m in noisy {
            if self.ctl.should_stop(self.nodes) {
                break;
            }
            let mut child = board.clone();
            child.play(m);
            let score = -self.qsearch(&child, -beta, -alpha, ply + 1);
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }

    /// Principal variation read back from TT best moves, bounded by the
    /// completed depth, stopping on an illegal continuation or the second
    /// visit to any position.
    fn pv_from_tt(&self, board: &Board, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut b = board.clone();
        let mut seen: HashSet<u64> = HashSet::new();
        seen.insert(b.hash());
        for _ in 0..max_len {
            let Some(tte) = self.session.tt.probe(b.hash()) else {
                break;
            };
            let Some(m) = tte.best else {
                break;
            };
            if !legal_moves(&b).contains(&m) {
                break;
            }
            pv.push(m);
            b.play(m);
            if !seen.insert(b.hash()) {
                break;
            }
        }
        pv
    }
}
