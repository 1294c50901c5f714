use cozy_chess::{Board as CozyBoard, Color, Move, Piece, Rank, Square};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("FEN error: {0}")]
    Fen(String),
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Board facade over the rules backend, carrying the hash of every position
/// on the game line so the search can detect repetitions that straddle the
/// root.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    keys: Vec<u64>,
}

impl Position {
    pub fn startpos() -> Self {
        let board = CozyBoard::default();
        let keys = vec![board.hash()];
        Self { board, keys }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let board = CozyBoard::from_fen(fen, false)
            .map_err(|e| PositionError::Fen(format!("{e:?}")))?;
        let keys = vec![board.hash()];
        Ok(Self { board, keys })
    }

    pub fn board(&self) -> &CozyBoard {
        &self.board
    }

    /// Hashes of every position reached so far, current position last.
    pub fn key_history(&self) -> &[u64] {
        &self.keys
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// Apply a move given in the wire encoding. The move must parse and be
    /// legal in the current position; otherwise the position is unchanged.
    pub fn play_uci(&mut self, mv_uci: &str) -> Result<(), PositionError> {
        let mv = find_uci(&self.board, mv_uci)
            .ok_or_else(|| PositionError::IllegalMove(mv_uci.to_string()))?;
        self.board.play(mv);
        self.keys.push(self.board.hash());
        Ok(())
    }

    pub fn set_from_start_and_moves(moves: &[String]) -> Result<Self, PositionError> {
        let mut pos = Self::startpos();
        for m in moves {
            pos.play_uci(m)?;
        }
        Ok(pos)
    }
}

pub fn legal_moves(board: &CozyBoard) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    board.generate_moves(|ml| {
        for m in ml {
            moves.push(m);
        }
        false
    });
    moves
}

pub fn in_check(board: &CozyBoard) -> bool {
    !board.checkers().is_empty()
}

/// Look up a legal move by its textual encoding.
pub fn find_uci(board: &CozyBoard, mv_uci: &str) -> Option<Move> {
    let parsed = match Move::from_str(mv_uci) {
        Ok(m) => m,
        Err(_) => return None,
    };
    let mut found = None;
    board.generate_moves(|ml| {
        for m in ml {
            if m == parsed {
                found = Some(m);
                break;
            }
        }
        found.is_some()
    });
    found
}

pub fn is_capture(board: &CozyBoard, mv: Move) -> bool {
    let them = !board.side_to_move();
    if board.colors(them).has(mv.to) {
        return true;
    }
    // En passant: a pawn moving diagonally onto the ep square.
    if let Some(ep_file) = board.en_passant() {
        let ep_rank = if board.side_to_move() == Color::White {
            Rank::Sixth
        } else {
            Rank::Third
        };
        let ep_sq = Square::new(ep_file, ep_rank);
        if mv.to == ep_sq
            && board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
        {
            return true;
        }
    }
    false
}

pub fn gives_check(board: &CozyBoard, mv: Move) -> bool {
    let mut child = board.clone();
    child.play(mv);
    !child.checkers().is_empty()
}
