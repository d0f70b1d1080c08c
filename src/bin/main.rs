extern crate tankbot;

use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use tankbot::{comms::Comms, config::BotConfig, error::BotError, strategy::Strategy};

#[derive(Parser, Debug)]
#[command(about = "Tank arena bot speaking line-delimited JSON over stdin/stdout")]
struct Args {
    /// Seed for movement jitter; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with tuning overrides
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), BotError> {
    let config = match &args.config {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::default(),
    };

    let mut strategy = match args.seed {
        Some(seed) => Strategy::seeded(config, seed),
        None => Strategy::from_entropy(config),
    };

    let stdin = io::stdin();
    let mut comms = Comms::new(stdin.lock(), BufWriter::new(io::stdout()));

    let mut world = comms.handshake()?;
    info!("map center at {:?}", world.center());

    let turns = comms.play_game(&mut world, &mut strategy)?;
    info!("game over after {turns} turns");
    Ok(())
}
