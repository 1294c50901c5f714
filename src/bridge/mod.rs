pub mod events;

pub use events::{parse_info_line, EngineEvent, InfoPayload, Score};

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);
const READY_TIMEOUT: Duration = Duration::from_secs(2);
const READY_SLICE: Duration = Duration::from_millis(250);
const READ_SLICE: Duration = Duration::from_secs(5);
const STOP_THROTTLE: Duration = Duration::from_millis(100);
const DRAIN_TIMEOUT: Duration = Duration::from_millis(800);
const DRAIN_SLICE: Duration = Duration::from_millis(100);
const QUIT_GRACE: Duration = Duration::from_millis(100);
const TAIL_LINES: usize = 50;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("worker pipes unavailable")]
    Pipe,
    #[error("write to worker failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("handshake timed out")]
    HandshakeTimeout,
    #[error("worker not ready")]
    NotReady,
    #[error("missing depth or movetime")]
    MissingLimits,
    #[error("{0}")]
    WorkerExited(String),
}

/// One search request issued through the bridge.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Six-field FEN; `None` means the start position.
    pub fen: Option<String>,
    pub moves: Vec<String>,
    pub depth: Option<u32>,
    pub rollouts: Option<u32>,
    pub movetime_ms: Option<u64>,
}

enum ReadOutcome {
    Line(String),
    TimedOut,
    Closed,
}

struct WorkerProc {
    child: Child,
    stdin: ChildStdin,
}

struct Feed {
    rx: Option<Receiver<String>>,
    tail: VecDeque<String>,
}

/// Supervises one worker process and serializes the conversation with it.
///
/// All stdout reads go through the `feed` mutex, so concurrent callers can
/// never interleave partial reads. `stop` is throttled and only drains the
/// stream when no other reader is active; otherwise the active reader
/// consumes the terminal `bestmove` itself.
pub struct UciBridge {
    command: Vec<String>,
    proc: Mutex<Option<WorkerProc>>,
    feed: Mutex<Feed>,
    search_active: AtomicBool,
    last_stop: Mutex<Option<Instant>>,
}

impl UciBridge {
    /// `command` is the worker argv; it is spawned lazily on first use.
    pub fn new(command: Vec<String>) -> Self {
        assert!(!command.is_empty(), "worker command must not be empty");
        Self {
            command,
            proc: Mutex::new(None),
            feed: Mutex::new(Feed {
                rx: None,
                tail: VecDeque::with_capacity(TAIL_LINES),
            }),
            search_active: AtomicBool::new(false),
            last_stop: Mutex::new(None),
        }
    }

    fn spawn(&self) -> Result<(), BridgeError> {
        debug!("starting worker: {:?}", self.command);
        let mut child = Command::new(&self.command[0])
            .args(&self.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(BridgeError::Spawn)?;
        let stdin = child.stdin.take().ok_or(BridgeError::Pipe)?;
        let stdout = child.stdout.take().ok_or(BridgeError::Pipe)?;

        let (tx, rx) = mpsc::channel::<String>();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(l) => {
                        if tx.send(l).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        *self.proc.lock().unwrap() = Some(WorkerProc { child, stdin });
        self.feed.lock().unwrap().rx = Some(rx);
        Ok(())
    }

    fn alive(&self) -> bool {
        let mut guard = self.proc.lock().unwrap();
        match guard.as_mut() {
            Some(wp) => matches!(wp.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn kill(&self) {
        if let Some(mut wp) = self.proc.lock().unwrap().take() {
            let _ = wp.child.kill();
            let _ = wp.child.wait();
        }
    }

    fn send_line(&self, s: &str) -> Result<(), BridgeError> {
        debug!(">> {s}");
        let mut guard = self.proc.lock().unwrap();
        let wp = guard.as_mut().ok_or(BridgeError::Pipe)?;
        writeln!(wp.stdin, "{s}").map_err(BridgeError::Write)?;
        wp.stdin.flush().map_err(BridgeError::Write)
    }

    fn read_locked(feed: &mut Feed, timeout: Duration) -> ReadOutcome {
        let Some(rx) = feed.rx.as_ref() else {
            return ReadOutcome::Closed;
        };
        match rx.recv_timeout(timeout) {
            Ok(line) => {
                let line = line.trim().to_string();
                debug!("<< {line}");
                if feed.tail.len() == TAIL_LINES {
                    feed.tail.pop_front();
                }
                feed.tail.push_back(line.clone());
                ReadOutcome::Line(line)
            }
            Err(RecvTimeoutError::Timeout) => ReadOutcome::TimedOut,
            Err(RecvTimeoutError::Disconnected) => {
                feed.rx = None;
                ReadOutcome::Closed
            }
        }
    }

    /// Read one line with a timeout, serialized behind the read guard.
    fn read_line(&self, timeout: Duration) -> ReadOutcome {
        let mut feed = self.feed.lock().unwrap();
        Self::read_locked(&mut feed, timeout)
    }

    fn tail(&self) -> String {
        let feed = self.feed.lock().unwrap();
        let n = feed.tail.len();
        feed.tail
            .iter()
            .skip(n.saturating_sub(5))
            .cloned()
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn handshake(&self) -> Result<(), BridgeError> {
        self.send_line("uci")?;
        let overall = Instant::now() + HANDSHAKE_TIMEOUT;
        loop {
            let left = overall.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(BridgeError::HandshakeTimeout);
            }
            match self.read_line(left.min(READY_SLICE)) {
                ReadOutcome::Line(l) if l == "uciok" => {
                    debug!("handshake ok");
                    return Ok(());
                }
                ReadOutcome::Line(_) => {}
                ReadOutcome::TimedOut => {}
                ReadOutcome::Closed => {
                    return Err(BridgeError::WorkerExited(
                        "worker terminated during handshake".to_string(),
                    ))
                }
            }
        }
    }

    /// Spawn the worker and complete the handshake, restarting once on
    /// failure. A second failure is terminal for the request.
    pub fn ensure_started(&self) -> Result<(), BridgeError> {
        if self.alive() {
            return Ok(());
        }
        self.spawn()?;
        if let Err(e) = self.handshake() {
            warn!("handshake failed ({e}); restarting worker once");
            self.kill();
            self.spawn()?;
            self.handshake()?;
        }
        Ok(())
    }

    /// Readiness probe with one automatic restart on timeout.
    pub fn ready(&self) -> Result<bool, BridgeError> {
        self.ensure_started()?;
        self.send_line("isready")?;
        for attempt in 0..2 {
            let deadline = Instant::now() + READY_TIMEOUT;
            while Instant::now() < deadline {
                match self.read_line(READY_SLICE) {
                    ReadOutcome::Line(l) if l == "readyok" => return Ok(true),
                    ReadOutcome::Line(_) => {}
                    ReadOutcome::TimedOut => {}
                    ReadOutcome::Closed => return Ok(false),
                }
            }
            if attempt == 0 {
                warn!("readiness probe timed out; restarting worker");
                self.kill();
                self.spawn()?;
                self.handshake()?;
                self.send_line("isready")?;
            }
        }
        Ok(false)
    }

    /// Best-effort cancellation: send one `stop`, throttling repeats, and
    /// drain to the terminal `bestmove` only when no reader is active.
    pub fn abort_current_search(&self) {
        if !self.alive() {
            return;
        }
        {
            let mut last = self.last_stop.lock().unwrap();
            if let Some(t) = *last {
                if t.elapsed() < STOP_THROTTLE {
                    debug!("stop throttled");
                    return;
                }
            }
            *last = Some(Instant::now());
        }
        if self.send_line("stop").is_err() {
            return;
        }
        if self.search_active.load(Ordering::SeqCst) {
            debug!("reader active; leaving the drain to it");
            return;
        }
        let Ok(mut feed) = self.feed.try_lock() else {
            debug!("read guard held; leaving the drain to its holder");
            return;
        };
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while Instant::now() < deadline {
            match Self::read_locked(&mut feed, DRAIN_SLICE) {
                ReadOutcome::Line(l) if l.starts_with("bestmove") => break,
                ReadOutcome::Line(_) => {}
                ReadOutcome::TimedOut => {}
                ReadOutcome::Closed => break,
            }
        }
    }

    /// Reset the worker's session state.
    pub fn new_game(&self) -> Result<bool, BridgeError> {
        self.ensure_started()?;
        self.send_line("ucinewgame")?;
        self.ready()
    }

    /// Run one search: position, readiness probe, `go`, then translate
    /// worker output into events until the terminal `bestmove`.
    pub fn search(
        &self,
        req: &SearchRequest,
        on_event: &mut dyn FnMut(EngineEvent),
    ) -> Result<String, BridgeError> {
        self.ensure_started()?;
        self.abort_current_search();

        let mut position = match &req.fen {
            Some(fen) => format!("position fen {fen}"),
            None => "position startpos".to_string(),
        };
        if !req.moves.is_empty() {
            position.push_str(" moves ");
            position.push_str(&req.moves.join(" "));
        }
        self.send_line(&position)?;

        if !self.ready()? {
            on_event(EngineEvent::Error {
                message: "engine not ready".to_string(),
            });
            return Err(BridgeError::NotReady);
        }

        let go = if let Some(d) = req.depth {
            match req.rollouts {
                Some(r) => format!("go depth {d} rollouts {r}"),
                None => format!("go depth {d}"),
            }
        } else if let Some(ms) = req.movetime_ms {
            format!("go movetime {ms}")
        } else {
            on_event(EngineEvent::Error {
                message: "missing depth or movetime".to_string(),
            });
            return Err(BridgeError::MissingLimits);
        };
        self.send_line(&go)?;

        self.search_active.store(true, Ordering::SeqCst);
        let result = self.read_until_bestmove(on_event);
        self.search_active.store(false, Ordering::SeqCst);
        result
    }

    fn read_until_bestmove(
        &self,
        on_event: &mut dyn FnMut(EngineEvent),
    ) -> Result<String, BridgeError> {
        loop {
            match self.read_line(READ_SLICE) {
                ReadOutcome::Line(l) => {
                    if let Some(rest) = l.strip_prefix("bestmove") {
                        let mv = rest
                            .split_whitespace()
                            .next()
                            .unwrap_or("0000")
                            .to_string();
                        on_event(EngineEvent::Bestmove { mv: mv.clone() });
                        on_event(EngineEvent::Done);
                        return Ok(mv);
                    }
                    if l.starts_with("info") {
                        if let Some(payload) = parse_info_line(&l) {
                            on_event(EngineEvent::Info(payload));
                        }
                    }
                }
                ReadOutcome::TimedOut => {
                    if !self.alive() {
                        return self.worker_exit(on_event);
                    }
                }
                ReadOutcome::Closed => return self.worker_exit(on_event),
            }
        }
    }

    fn worker_exit(
        &self,
        on_event: &mut dyn FnMut(EngineEvent),
    ) -> Result<String, BridgeError> {
        let message = format!(
            "worker exited unexpectedly; last output: {}",
            self.tail()
        );
        on_event(EngineEvent::Error {
            message: message.clone(),
        });
        Err(BridgeError::WorkerExited(message))
    }

    /// Ask the worker to quit, then make sure it is gone.
    pub fn shutdown(&self) {
        if self.alive() {
            let _ = self.send_line("quit");
            thread::sleep(QUIT_GRACE);
        }
        self.kill();
    }
}

impl Drop for UciBridge {
    fn drop(&mut self) {
        self.kill();
    }
}
