//! Headless mday client.
//!
//! Loads an optional engine config, seeds a demo fleet, and runs the
//! scheduler with a logging display and a scripted input thread.
//!
//! ```text
//! mday-client [CONFIG.json] [SCRIPT.json]
//! ```
//!
//! `RUST_LOG` controls verbosity (default `info`).

mod display;
mod fleet;
mod script;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use mday_core::{EngineConfig, Runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::display::LogRenderer;

const OWNER: &str = "player-1";
const INPUT_INTERVAL: Duration = Duration::from_millis(1_500);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let config = match args.next() {
        Some(path) => EngineConfig::from_path(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let commands = match args.next() {
        Some(path) => script::load(&path)?,
        None => script::default_script(),
    };

    let renderer = LogRenderer::new(u64::from(config.target_tps));
    let runner = Runner::new(&config, renderer);
    let queue = runner.queue();
    for command in fleet::demo_fleet(fleet::DEMO_SEED, OWNER) {
        queue.push(command);
    }

    let handle = runner.start()?;
    let input = script::spawn(handle.queue().clone(), commands, INPUT_INTERVAL)?;

    let runner = handle.join()?;
    if input.join().is_err() {
        anyhow::bail!("input thread panicked");
    }

    let world = runner.world();
    info!(
        ticks = runner.ticks(),
        frames = runner.renderer().frames(),
        units = world.units().len(),
        "session finished"
    );
    for unit in world.units().all() {
        info!(%unit, "final");
    }
    Ok(())
}
