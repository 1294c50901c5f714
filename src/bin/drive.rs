use anyhow::Result;
use clap::Parser;

use castellan::bridge::{EngineEvent, SearchRequest, UciBridge};

/// Spawn the worker through the supervision bridge, run one search, and
/// print each bridge event as a JSON line.
#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a castellan worker through the bridge", long_about = None)]
struct Args {
    /// Worker executable (argv[0]); defaults to `castellan` on PATH
    #[arg(long, default_value = "castellan")]
    worker: String,

    /// Extra arguments passed to the worker
    #[arg(long)]
    worker_arg: Vec<String>,

    /// Six-field FEN of the position to search (start position if omitted)
    #[arg(long)]
    fen: Option<String>,

    /// Moves to apply after the position, in wire encoding
    #[arg(long)]
    moves: Vec<String>,

    /// Search depth
    #[arg(long)]
    depth: Option<u32>,

    /// Refiner rollouts (with --depth)
    #[arg(long)]
    rollouts: Option<u32>,

    /// Time budget in milliseconds (alternative to --depth)
    #[arg(long)]
    movetime_ms: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut command = vec![args.worker.clone()];
    command.extend(args.worker_arg.iter().cloned());
    let bridge = UciBridge::new(command);

    let req = SearchRequest {
        fen: args.fen.clone(),
        moves: args.moves.clone(),
        depth: args.depth.or(if args.movetime_ms.is_none() {
            Some(6)
        } else {
            None
        }),
        rollouts: args.rollouts,
        movetime_ms: args.movetime_ms,
    };

    let mut on_event = |event: EngineEvent| {
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{line}");
        }
    };
    let result = bridge.search(&req, &mut on_event);
    bridge.shutdown();

    match result {
        Ok(_) => Ok(()),
        // The failure was already surfaced as an error event.
        Err(_) => std::process::exit(1),
    }
}
