pub mod ab;
pub mod uci;

use crate::board::PositionError;
use crate::search::scheduler::GoParams;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tt_mb: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { tt_mb: 64 }
    }
}

/// One playable engine behind the worker protocol loop.
///
/// `go` may run asynchronously; implementations own their search thread and
/// must guarantee exactly one `bestmove` line per search, with `stop`
/// cancelling cooperatively.
pub trait Engine: Send {
    fn name(&self) -> &'static str;
    fn author(&self) -> &'static str;
    /// Handle everything after `position `. On error the position is either
    /// unchanged or reset to the start position; no partial garbage.
    fn handle_position(&mut self, args: &str) -> Result<(), PositionError>;
    fn go(&mut self, params: &GoParams);
    /// Immediate deterministic best move for the current position.
    fn best_move_now(&self) -> String;
    fn stop(&mut self);
    fn on_new_game(&mut self);
    fn on_quit(&mut self);
}

type Factory = fn(&EngineConfig) -> Box<dyn Engine>;

/// Statically registered engines; first entry is the default.
const REGISTRY: &[(&str, Factory)] = &[("ab", ab::AbEngine::boxed)];

pub fn create(name: &str, config: &EngineConfig) -> Box<dyn Engine> {
    let wanted = name.trim().to_ascii_lowercase();
    for (n, factory) in REGISTRY {
        if *n == wanted {
            return factory(config);
        }
    }
    log::warn!("unknown engine '{name}', falling back to '{}'", REGISTRY[0].0);
    (REGISTRY[0].1)(config)
}
