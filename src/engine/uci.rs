use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::engine::Engine;
use crate::search::scheduler::GoParams;

/// Worker protocol loop: a reader thread feeds stdin lines through a
/// channel so `stop` can reach a running search.
pub fn run_loop(engine: &mut dyn Engine) {
    print_identity(engine);

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(s) => {
                    if tx.send(s).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    while let Ok(line) = rx.recv() {
        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }
        log::debug!("recv '{cmd}'");

        if cmd == "uci" {
            print_identity(engine);
        } else if cmd == "isready" {
            println!("readyok");
            io::stdout().flush().ok();
        } else if cmd.starts_with("ucinewgame") {
            engine.on_new_game();
        } else if let Some(rest) = cmd.strip_prefix("position ") {
            if let Err(e) = engine.handle_position(rest) {
                println!("info string position rejected: {e}");
                io::stdout().flush().ok();
            }
        } else if cmd == "go" || cmd.starts_with("go ") {
            let params = parse_go(cmd.strip_prefix("go").unwrap_or(""));
            engine.go(&params);
        } else if cmd == "stop" {
            engine.stop();
        } else if cmd == "quit" {
            engine.on_quit();
            break;
        }
        // Unknown commands are ignored.
    }
}

fn print_identity(engine: &dyn Engine) {
    println!("id name {}", engine.name());
    println!("id author {}", engine.author());
    println!("uciok");
    io::stdout().flush().ok();
}

/// Parse `depth N [rollouts N]` / `movetime MS`; unknown tokens skip.
pub fn parse_go(args: &str) -> GoParams {
    let mut params = GoParams::default();
    let mut tokens = args.split_whitespace();
    while let Some(tok) = tokens.next() {
        match tok {
            "depth" => {
                if let Some(d) = tokens.next().and_then(|s| s.parse::<u32>().ok()) {
                    params.depth = Some(d);
                }
            }
            "rollouts" => {
                if let Some(r) = tokens.next().and_then(|s| s.parse::<u32>().ok()) {
                    params.rollouts = Some(r);
                }
            }
            "movetime" => {
                if let Some(ms) = tokens.next().and_then(|s| s.parse::<u64>().ok()) {
                    params.movetime = Some(Duration::from_millis(ms));
                }
            }
            _ => {}
        }
    }
    params
}
