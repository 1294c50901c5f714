use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation handle threaded through the search call chain.
/// Observed at defined points only, never preemptively.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Stop condition shared by the searcher and the refiner for one request:
/// the cancellation token plus the request's absolute deadline.
pub struct SearchControl {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl SearchControl {
    pub fn unbounded(cancel: CancelToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    pub fn until(cancel: CancelToken, deadline: Instant) -> Self {
        Self {
            cancel,
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the search must wind down. The clock is consulted every
    /// 1024 nodes; once the deadline has passed the token is latched so
    /// later calls are cheap.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        if nodes & 1023 != 0 {
            return false;
        }
        if let Some(dl) = self.deadline {
            if Instant::now() >= dl {
                self.cancel.cancel();
                return true;
            }
        }
        false
    }

    /// Deadline check independent of node cadence, for per-iteration and
    /// per-rollout boundaries.
    pub fn expired(&self) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        match self.deadline {
            Some(dl) => Instant::now() >= dl,
            None => false,
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }
}
