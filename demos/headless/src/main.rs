//! Headless vidlink client.
//!
//! Plays a server script through the bus and logs the world once a second.
//! Set `RUST_LOG=debug` to watch individual messages move.

use std::path::PathBuf;

use clap::Parser;
use vidlink::prelude::*;

#[derive(Parser)]
#[command(name = "vidlink-headless")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON client config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON server script (overrides the config's)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Ticks per second (overrides the config's)
    #[arg(short, long)]
    rate: Option<u32>,

    /// Stop after this many ticks
    #[arg(short = 'n', long)]
    max_ticks: Option<u64>,

    /// Print the built-in demo script as JSON and exit
    #[arg(long)]
    dump_demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    if cli.dump_demo {
        println!("{}", String::from_utf8(Script::demo().to_json()?)?);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_json_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(rate) = cli.rate {
        config.tick_rate_hz = rate;
    }
    if cli.max_ticks.is_some() {
        config.max_ticks = cli.max_ticks;
    }
    if cli.script.is_some() {
        config.script_path = cli.script;
    }

    let rate = u64::from(config.tick_rate_hz);
    let mut client = GameClient::builder().config(config).build()?;

    let run = client.run_with(|report, engine| {
        if report.tick % rate == 0 {
            log_world(report, engine);
        }
    });

    tokio::select! {
        result = run => {
            let ticks = result?;
            tracing::info!(ticks, "done");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
        }
    }

    Ok(())
}

fn log_world(report: &TickReport, engine: &GameEngine) {
    tracing::info!(
        tick = report.tick,
        now_ms = report.now,
        entities = engine.entity_count(),
        actions = engine.action_count(),
        map = engine.current_map().unwrap_or("-"),
        "world"
    );
    for character in engine.entities() {
        tracing::info!(
            entity = %character.id(),
            name = character.name(),
            loc = %character.loc(),
            hp = character.hp(),
            moving = character.is_moving(),
            "entity"
        );
    }
}
