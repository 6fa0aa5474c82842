//! Commands and the command queue.
//!
//! Commands are plain data pushed by input and network collaborators and
//! dispatched by the [`Runner`](crate::runner::Runner) once per tick to every
//! registered consumer.
//!
//! The [`CommandQueue`] is the only structure shared between threads. Producers
//! `push` from any thread; the scheduler `drain`s everything pending in one
//! short critical section.
//!
//! # Example
//!
//! ```
//! use mday_core::command::{Command, CommandQueue};
//! use mday_core::location::ScreenPoint;
//!
//! let queue = CommandQueue::new();
//! let producer = queue.clone();
//!
//! producer.push(Command::PanUp);
//! producer.push(Command::ZoomIn(Some(ScreenPoint::new(10.0, 10.0))));
//!
//! let drained = queue.drain();
//! assert_eq!(drained.len(), 2);
//! assert!(queue.is_empty());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::location::ScreenPoint;
use crate::unit::{Unit, UnitId};

// =============================================================================
// Command
// =============================================================================

/// A request to change world or view state.
///
/// # Variants
///
/// - Lifecycle: `Start`, `Quit`
/// - Units: `AddUnit`, `RemoveUnit`, `SelectRect`, `Deselect`, `MoveSelected`
/// - View: `ZoomIn`, `ZoomOut`, `PanBy`, `PanUp`/`PanDown`/`PanLeft`/`PanRight`, `Resize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// The game has started. Seeded into every new queue.
    Start,
    /// Register a unit.
    AddUnit(Unit),
    /// Unregister a unit by id.
    RemoveUnit(UnitId),
    /// Select every unit inside the screen rectangle, deselecting the rest.
    SelectRect {
        /// Top-left corner of the rectangle, in pixels.
        top_left: ScreenPoint,
        /// Bottom-right corner of the rectangle, in pixels.
        bottom_right: ScreenPoint,
    },
    /// Clear the selection.
    Deselect,
    /// Order every selected, movable unit to the screen point.
    MoveSelected(ScreenPoint),
    /// Zoom in, optionally keeping the given screen point fixed.
    ZoomIn(Option<ScreenPoint>),
    /// Zoom out, optionally keeping the given screen point fixed.
    ZoomOut(Option<ScreenPoint>),
    /// Drag-pan by a screen-space delta.
    PanBy {
        /// Horizontal delta in pixels.
        dx: f64,
        /// Vertical delta in pixels.
        dy: f64,
    },
    /// Glide the view up.
    PanUp,
    /// Glide the view down.
    PanDown,
    /// Glide the view left.
    PanLeft,
    /// Glide the view right.
    PanRight,
    /// The viewport changed size.
    Resize {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// Shut everything down.
    Quit,
}

impl Command {
    /// Short name for log lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::AddUnit(_) => "add_unit",
            Self::RemoveUnit(_) => "remove_unit",
            Self::SelectRect { .. } => "select_rect",
            Self::Deselect => "deselect",
            Self::MoveSelected(_) => "move_selected",
            Self::ZoomIn(_) => "zoom_in",
            Self::ZoomOut(_) => "zoom_out",
            Self::PanBy { .. } => "pan_by",
            Self::PanUp => "pan_up",
            Self::PanDown => "pan_down",
            Self::PanLeft => "pan_left",
            Self::PanRight => "pan_right",
            Self::Resize { .. } => "resize",
            Self::Quit => "quit",
        }
    }

    /// Whether this is the shutdown command.
    #[must_use]
    pub const fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Command Queue
// =============================================================================

/// Multi-producer command queue drained by the scheduler.
///
/// Cloning yields another handle to the same queue. Producers hold the lock
/// only for a single push; the scheduler swaps the whole buffer out, so a
/// drain never blocks producers for longer than a pointer swap.
#[derive(Clone, Default)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<Command>>>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue holding a single [`Command::Start`].
    #[must_use]
    pub fn seeded() -> Self {
        let queue = Self::new();
        queue.push(Command::Start);
        queue
    }

    /// A panicking producer cannot leave the deque half-written, so a
    /// poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Command>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a command.
    pub fn push(&self, command: Command) {
        self.lock().push_back(command);
    }

    /// Removes and returns every pending command in FIFO order.
    #[must_use]
    pub fn drain(&self) -> VecDeque<Command> {
        std::mem::take(&mut *self.lock())
    }

    /// Discards every pending command.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of pending commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no commands are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
