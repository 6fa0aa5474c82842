//! Scripted input producer.
//!
//! Stands in for raw input capture: a thread that pushes a fixed sequence of
//! commands onto the queue at a steady pace, ending with `Quit`.

use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use mday_core::{Command, CommandQueue, ScreenPoint};
use tracing::{debug, info};

/// Name of the producer thread.
pub const INPUT_THREAD_NAME: &str = "mday-input";

/// Reads a JSON array of commands.
pub fn load(path: &Path) -> Result<Vec<Command>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing script {}", path.display()))
}

/// Built-in session on a 1280x720 viewport: pick part of the fleet, send it
/// across the map, play with the camera, then regroup everything.
pub fn default_script() -> Vec<Command> {
    let p = ScreenPoint::new;
    vec![
        Command::SelectRect {
            top_left: p(420.0, 210.0),
            bottom_right: p(640.0, 400.0),
        },
        Command::MoveSelected(p(1100.0, 150.0)),
        Command::ZoomOut(Some(p(640.0, 360.0))),
        Command::PanRight,
        Command::PanDown,
        Command::SelectRect {
            top_left: p(1280.0, 720.0),
            bottom_right: p(0.0, 0.0),
        },
        Command::MoveSelected(p(300.0, 560.0)),
        Command::ZoomIn(None),
        Command::PanBy { dx: -40.0, dy: 25.0 },
        Command::Deselect,
    ]
}

/// Pushes `commands` one per `interval`, then `Quit` unless the script already
/// ended with one.
pub fn spawn(
    queue: CommandQueue,
    commands: Vec<Command>,
    interval: Duration,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(INPUT_THREAD_NAME.into())
        .spawn(move || {
            let ends_with_quit = commands.last().is_some_and(Command::is_quit);
            info!(commands = commands.len(), "input script started");
            for command in commands {
                thread::sleep(interval);
                debug!(%command, "input");
                queue.push(command);
            }
            if !ends_with_quit {
                thread::sleep(interval);
                queue.push(Command::Quit);
            }
        })
        .context("spawning input thread")
}
