//! # MDay Core
//!
//! Simulation and view-transform engine for the MDay space-strategy client.
//!
//! Players select units on a 2D viewport and order them around; units turn,
//! accelerate and keep formation while the camera pans and zooms smoothly.
//!
//! ## Architecture
//!
//! - **Scheduler**: [`runner::Runner`] ticks observers, dispatches queued
//!   commands and renders, at a fixed rate
//! - **View**: [`view::CoordinateSystem`] maps world locations to pixels and
//!   animates pan and zoom
//! - **Movement**: [`movement::UnitMover`] turns, accelerates and decelerates
//!   units, holding formations behind a completion barrier
//! - **Registry**: [`units::Units`] owns every unit and applies unit commands
//!
//! Everything except the [`command::CommandQueue`] lives on the scheduler
//! thread. Input and network collaborators only push [`command::Command`]s.
//!
//! ## Usage
//!
//! ```
//! use mday_core::command::Command;
//! use mday_core::config::EngineConfig;
//! use mday_core::location::{Location, ScreenPoint};
//! use mday_core::observer::NullRenderer;
//! use mday_core::runner::Runner;
//! use mday_core::unit::{ShipClass, Unit};
//!
//! let config = EngineConfig::default();
//! let mut runner = Runner::new(&config, NullRenderer);
//! let queue = runner.queue();
//!
//! queue.push(Command::AddUnit(Unit::ship("f-1", Location::ORIGIN, ShipClass::Fighter, "me")));
//! queue.push(Command::SelectRect {
//!     top_left: ScreenPoint::new(600.0, 320.0),
//!     bottom_right: ScreenPoint::new(680.0, 400.0),
//! });
//! queue.push(Command::MoveSelected(ScreenPoint::new(640.0, 100.0)));
//! runner.step().unwrap();
//!
//! for _ in 0..2_000 {
//!     runner.step().unwrap();
//! }
//! let ship = runner.world().units().get("f-1").unwrap();
//! assert_eq!(ship.location(), Location::new(0.0, -260.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod config;
pub mod error;
pub mod location;
pub mod movement;
pub mod observer;
pub mod runner;
pub mod unit;
pub mod units;
pub mod view;
pub mod world;

#[cfg(test)]
mod tests;

pub use command::{Command, CommandQueue};
pub use config::EngineConfig;
pub use error::{ConfigError, EngineError};
pub use location::{Location, ScreenPoint};
pub use movement::UnitMover;
pub use observer::{CommandConsumer, Frame, Renderer, TickObserver};
pub use runner::{Runner, RunnerHandle, StepOutcome};
pub use unit::{ShipClass, Unit, UnitHandle, UnitId, UnitType};
pub use units::Units;
pub use view::CoordinateSystem;
pub use world::World;
