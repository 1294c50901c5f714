use anyhow::Result;
use clap::Parser;

use castellan::engine::{self, EngineConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Castellan chess engine worker", long_about = None)]
struct Args {
    /// Engine to run (statically registered; unknown names fall back)
    #[arg(long, default_value = "ab")]
    engine: String,

    /// Transposition table size in megabytes
    #[arg(long, default_value_t = 64)]
    tt_mb: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = EngineConfig { tt_mb: args.tt_mb };
    let mut engine = engine::create(&args.engine, &config);
    engine::uci::run_loop(engine.as_mut());
    Ok(())
}
