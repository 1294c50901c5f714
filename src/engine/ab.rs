use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::board::{Position, PositionError};
use crate::engine::{Engine, EngineConfig};
use crate::search::control::CancelToken;
use crate::search::eval::MATE_THRESHOLD;
use crate::search::scheduler::{self, GoParams};
use crate::search::Session;

/// Alpha-beta engine with the Monte-Carlo root refiner, driven by the
/// scheduler. Each `go` runs on its own thread; all session state lives
/// behind one mutex held for the duration of a search.
pub struct AbEngine {
    pos: Position,
    session: Arc<Mutex<Session>>,
    cancel: CancelToken,
    sent: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl AbEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            pos: Position::startpos(),
            session: Arc::new(Mutex::new(Session::new(config.tt_mb))),
            cancel: CancelToken::new(),
            sent: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn boxed(config: &EngineConfig) -> Box<dyn Engine> {
        Box::new(Self::new(config))
    }

    fn stop_and_join(&mut self) {
        self.cancel.cancel();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Engine for AbEngine {
    fn name(&self) -> &'static str {
        "Castellan 0.1"
    }

    fn author(&self) -> &'static str {
        "Castellan Team"
    }

    fn handle_position(&mut self, args: &str) -> Result<(), PositionError> {
        self.stop_and_join();
        let parts: Vec<&str> = args.split_whitespace().collect();
        let mut idx = 0;
        if parts.first() == Some(&"startpos") {
            self.pos = Position::startpos();
            idx = 1;
        } else if parts.first() == Some(&"fen") {
            if parts.len() < 7 {
                self.pos = Position::startpos();
                return Err(PositionError::Fen("expected 6 FEN fields".to_string()));
            }
            let fen = parts[1..7].join(" ");
            match Position::from_fen(&fen) {
                Ok(p) => self.pos = p,
                Err(e) => {
                    self.pos = Position::startpos();
                    return Err(e);
                }
            }
            idx = 7;
        } else {
            return Err(PositionError::Fen(
                "expected 'startpos' or 'fen'".to_string(),
            ));
        }

        if parts.get(idx) == Some(&"moves") {
            for mv in &parts[idx + 1..] {
                self.pos.play_uci(mv)?;
            }
        }
        Ok(())
    }

    fn go(&mut self, params: &GoParams) {
        self.stop_and_join();
        self.cancel = CancelToken::new();
        self.sent = Arc::new(AtomicBool::new(false));

        let pos = self.pos.clone();
        let session = Arc::clone(&self.session);
        let cancel = self.cancel.clone();
        let sent = Arc::clone(&self.sent);
        let params = params.clone();

        self.handle = Some(thread::spawn(move || {
            let mut guard = session.lock().unwrap();
            let outcome = scheduler::run(&mut guard, &pos, &params, cancel.clone(), |res, elapsed| {
                let secs = elapsed.as_secs_f64().max(1e-6);
                let nps = (res.nodes as f64 / secs) as u64;
                let pv = res
                    .pv
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                println!(
                    "info depth {} nodes {} nps {} score {} pv {}",
                    res.depth,
                    res.nodes,
                    nps,
                    uci_score(res.score_cp),
                    pv
                );
                std::io::stdout().flush().ok();
            });
            drop(guard);

            // A cancelled search leaves the bestmove line to `stop`.
            if cancel.is_cancelled() {
                return;
            }
            if !sent.swap(true, Ordering::SeqCst) {
                let mv = outcome
                    .bestmove
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "0000".to_string());
                println!("bestmove {mv}");
                std::io::stdout().flush().ok();
            }
        }));
    }

    fn best_move_now(&self) -> String {
        scheduler::fallback_move(self.pos.board())
            .map(|m| m.to_string())
            .unwrap_or_else(|| "0000".to_string())
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        if !self.sent.swap(true, Ordering::SeqCst) {
            println!("bestmove {}", self.best_move_now());
            std::io::stdout().flush().ok();
        }
    }

    fn on_new_game(&mut self) {
        self.stop_and_join();
        self.pos = Position::startpos();
        self.session.lock().unwrap().reset();
    }

    fn on_quit(&mut self) {
        self.stop_and_join();
    }
}

/// Render a score for the wire: mate distance in moves when inside the
/// sentinel band, centipawns otherwise.
pub fn uci_score(score: i32) -> String {
    if score >= MATE_THRESHOLD {
        format!("mate {}", (crate::search::eval::MATE - score + 1) / 2)
    } else if score <= -MATE_THRESHOLD {
        format!("mate -{}", (crate::search::eval::MATE + score + 1) / 2)
    } else {
        format!("cp {score}")
    }
}
