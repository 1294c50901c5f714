use cozy_chess::{Board, Color, Piece, Square};

use crate::board::{in_check, legal_moves};

pub const PAWN: i32 = 100;
pub const KNIGHT: i32 = 320;
pub const BISHOP: i32 = 330;
pub const ROOK: i32 = 500;
pub const QUEEN: i32 = 900;

/// Unreachable score bound; alpha/beta are clamped inside this.
pub const INF: i32 = 60_000;
/// Mate sentinel. Scores within MAX_PLY of it encode mate distance.
pub const MATE: i32 = 30_000;
pub const DRAW: i32 = 0;

pub const MAX_DEPTH: u32 = 64;
pub const MAX_PLY: i32 = 128;
pub const MATE_THRESHOLD: i32 = MATE - MAX_PLY;

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => 0,
    }
}

// Piece-square tables, White's point of view, written with rank 8 at the
// top. White squares index with `sq ^ 56`, Black squares directly.
#[rustfmt::skip]
const PST_PAWN: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];
#[rustfmt::skip]
const PST_KNIGHT: [i32; 64] = [
   -50,-40,-30,-30,-30,-30,-40,-50,
   -40,-20,  0,  0,  0,  0,-20,-40,
   -30,  0, 10, 15, 15, 10,  0,-30,
   -30,  5, 15, 20, 20, 15,  5,-30,
   -30,  0, 15, 20, 20, 15,  0,-30,
   -30,  5, 10, 15, 15, 10,  5,-30,
   -40,-20,  0,  5,  5,  0,-20,-40,
   -50,-40,-30,-30,-30,-30,-40,-50,
];
#[rustfmt::skip]
const PST_BISHOP: [i32; 64] = [
   -20,-10,-10,-10,-10,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5, 10, 10,  5,  0,-10,
   -10,  5,  5, 10, 10,  5,  5,-10,
   -10,  0, 10, 10, 10, 10,  0,-10,
   -10, 10, 10, 10, 10, 10, 10,-10,
   -10,  5,  0,  0,  0,  0,  5,-10,
   -20,-10,-10,-10,-10,-10,-10,-20,
];
#[rustfmt::skip]
const PST_ROOK: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];
#[rustfmt::skip]
const PST_QUEEN: [i32; 64] = [
   -20,-10,-10, -5, -5,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5,  5,  5,  5,  0,-10,
    -5,  0,  5,  5,  5,  5,  0, -5,
     0,  0,  5,  5,  5,  5,  0, -5,
   -10,  5,  5,  5,  5,  5,  0,-10,
   -10,  0,  5,  0,  0,  0,  0,-10,
   -20,-10,-10, -5, -5,-10,-10,-20,
];
#[rustfmt::skip]
const PST_KING: [i32; 64] = [
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -20,-30,-30,-40,-40,-30,-30,-20,
   -10,-20,-20,-20,-20,-20,-20,-10,
    20, 20,  0,  0,  0,  0, 20, 20,
    20, 30, 10,  0,  0, 10, 30, 20,
];

fn pst(piece: Piece, color: Color, sq: Square) -> i32 {
    let idx = sq as usize;
    let vi = if color == Color::White { idx ^ 56 } else { idx };
    match piece {
        Piece::Pawn => PST_PAWN[vi],
        Piece::Knight => PST_KNIGHT[vi],
        Piece::Bishop => PST_BISHOP[vi],
        Piece::Rook => PST_ROOK[vi],
        Piece::Queen => PST_QUEEN[vi],
        Piece::King => PST_KING[vi],
    }
}

fn count(board: &Board, color: Color, piece: Piece) -> i32 {
    (board.colors(color) & board.pieces(piece)).len() as i32
}

pub fn insufficient_material(board: &Board) -> bool {
    let no_heavy = board.pieces(Piece::Pawn).is_empty()
        && board.pieces(Piece::Rook).is_empty()
        && board.pieces(Piece::Queen).is_empty();
    if !no_heavy {
        return false;
    }
    let minors = |c: Color| {
        count(board, c, Piece::Knight) + count(board, c, Piece::Bishop)
    };
    minors(Color::White) <= 1 && minors(Color::Black) <= 1
}

/// Combined non-pawn material of both sides, the null-move zugzwang guard.
pub fn non_pawn_material(board: &Board) -> i32 {
    let np = |c: Color| {
        KNIGHT * count(board, c, Piece::Knight)
            + BISHOP * count(board, c, Piece::Bishop)
            + ROOK * count(board, c, Piece::Rook)
            + QUEEN * count(board, c, Piece::Queen)
    };
    np(Color::White) + np(Color::Black)
}

/// Static score in centipawns from the side to move's perspective.
///
/// Terminal positions short-circuit: checkmate is the mate sentinel,
/// stalemate / insufficient material / a claimable 50-move draw score 0.
/// Pure: repeated calls on the same position return the same score.
pub fn evaluate(board: &Board) -> i32 {
    let ours = legal_moves(board);
    if ours.is_empty() {
        return if in_check(board) { -MATE } else { DRAW };
    }
    if board.halfmove_clock() >= 100 || insufficient_material(board) {
        return DRAW;
    }

    let mut score = 0;
    for &color in &[Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        for &piece in &[
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            let bb = board.colors(color) & board.pieces(piece);
            for sq in bb {
                score += sign * (piece_value(piece) + pst(piece, color, sq));
            }
        }
    }

    let pov = if board.side_to_move() == Color::White {
        score
    } else {
        -score
    };
    (pov + ours.len() as i32 / 4).clamp(-INF + 1, INF - 1)
}
