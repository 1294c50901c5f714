pub mod alphabeta;
pub mod control;
pub mod eval;
pub mod ordering;
pub mod refine;
pub mod scheduler;
pub mod tt;

use crate::search::eval::MAX_PLY;
use crate::search::ordering::{History, Killers};
use crate::search::tt::Tt;

/// Per-game search state: transposition table, killer slots and history
/// scores. Owned by one engine session, reset wholesale on a new game,
/// never shared between concurrent searches.
pub struct Session {
    pub tt: Tt,
    pub killers: Killers,
    pub history: History,
}

impl Session {
    pub fn new(tt_mb: usize) -> Self {
        Self {
            tt: Tt::with_capacity_mb(tt_mb),
            killers: Killers::new(MAX_PLY as usize),
            history: History::new(),
        }
    }

    pub fn reset(&mut self) {
        self.tt.clear();
        self.tt.bump_generation();
        self.killers.clear();
        self.history.clear();
    }
}
