//! Collaborator seams: per-tick observers, command consumers and the renderer.
//!
//! The [`Runner`](crate::runner::Runner) knows its collaborators only through
//! these traits. Registration happens once, when the runner is built.
//!
//! - [`TickObserver`]: advanced once per activation, before commands
//! - [`CommandConsumer`]: receives every drained command, in registration order
//! - [`Renderer`]: receives one read-only [`Frame`] per activation
//!
//! # Example
//!
//! ```
//! use mday_core::command::Command;
//! use mday_core::error::EngineError;
//! use mday_core::observer::CommandConsumer;
//!
//! #[derive(Default)]
//! struct QuitWatcher {
//!     saw_quit: bool,
//! }
//!
//! impl CommandConsumer for QuitWatcher {
//!     fn accept(&mut self, command: &Command) -> Result<(), EngineError> {
//!         self.saw_quit |= command.is_quit();
//!         Ok(())
//!     }
//! }
//!
//! let mut watcher = QuitWatcher::default();
//! watcher.accept(&Command::Quit).unwrap();
//! assert!(watcher.saw_quit);
//! ```

use crate::command::Command;
use crate::error::EngineError;
use crate::location::ScreenPoint;
use crate::unit::Unit;
use crate::units::Units;
use crate::view::CoordinateSystem;

// =============================================================================
// Traits
// =============================================================================

/// Something advanced once per scheduler activation.
///
/// Observers must not push to the command queue from `tick`.
pub trait TickObserver {
    /// Advances continuous state (animations, physics) by one tick.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the tick leaves state unusable. The
    /// runner treats any error as fatal.
    fn tick(&mut self) -> Result<(), EngineError>;
}

/// Something that reacts to commands.
pub trait CommandConsumer {
    /// Name used in log lines and consumer errors.
    fn name(&self) -> &str {
        "consumer"
    }

    /// Applies a command. Commands a consumer does not care about are ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the command could not be applied. The
    /// runner treats any error as fatal.
    fn accept(&mut self, command: &Command) -> Result<(), EngineError>;
}

/// The render collaborator.
pub trait Renderer {
    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Render`] (or any other variant) if drawing failed.
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), EngineError>;

    /// Releases display resources. Called once when the runner quits, on the
    /// normal path and after a fatal error alike.
    ///
    /// # Errors
    ///
    /// Failures are logged by the runner and otherwise ignored.
    fn shutdown(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

// =============================================================================
// Frame
// =============================================================================

/// Read-only view of the world handed to the renderer after each activation.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    tick: u64,
    units: &'a Units,
    view: &'a CoordinateSystem,
}

impl<'a> Frame<'a> {
    /// Creates a frame for the given activation.
    #[must_use]
    pub const fn new(tick: u64, units: &'a Units, view: &'a CoordinateSystem) -> Self {
        Self { tick, units, view }
    }

    /// Number of activations completed before this frame.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The unit registry.
    #[must_use]
    pub const fn units(&self) -> &'a Units {
        self.units
    }

    /// The coordinate system.
    #[must_use]
    pub const fn view(&self) -> &'a CoordinateSystem {
        self.view
    }

    /// Current scale in pixels per world unit.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.view.scale()
    }

    /// Units inside the viewport (grown by each unit's radius), paired with
    /// their screen position.
    pub fn visible(&self) -> impl Iterator<Item = (&'a Unit, ScreenPoint)> + 'a {
        let view = self.view;
        self.units
            .visible(view)
            .map(move |unit| (unit, view.to_viewport_point(unit.location())))
    }
}

/// A renderer that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame<'_>) -> Result<(), EngineError> {
        Ok(())
    }
}
