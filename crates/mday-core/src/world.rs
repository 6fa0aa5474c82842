//! The simulation state owned by the scheduler thread.
//!
//! [`World`] bundles the [`CoordinateSystem`], the [`Units`] registry and the
//! [`UnitMover`]. It is the first observer and first consumer the
//! [`Runner`](crate::runner::Runner) drives:
//!
//! - tick: the view animates, then the mover advances every movement
//! - commands: the view sees each command first, then the registry

use crate::command::Command;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::location::Location;
use crate::movement::UnitMover;
use crate::observer::{CommandConsumer, Frame, TickObserver};
use crate::unit::{Unit, UnitHandle};
use crate::units::Units;
use crate::view::CoordinateSystem;

/// View, units and movements, mutated only by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct World {
    view: CoordinateSystem,
    units: Units,
    mover: UnitMover,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            view: CoordinateSystem::with_config(config),
            units: Units::new(),
            mover: UnitMover::with_config(config),
        }
    }

    /// The coordinate system.
    #[must_use]
    pub const fn view(&self) -> &CoordinateSystem {
        &self.view
    }

    /// Mutable access to the coordinate system.
    pub fn view_mut(&mut self) -> &mut CoordinateSystem {
        &mut self.view
    }

    /// The unit registry.
    #[must_use]
    pub const fn units(&self) -> &Units {
        &self.units
    }

    /// The mover.
    #[must_use]
    pub const fn mover(&self) -> &UnitMover {
        &self.mover
    }

    /// Registers a unit.
    pub fn add_unit(&mut self, unit: Unit) -> Option<UnitHandle> {
        self.units.add(unit)
    }

    /// Unregisters a unit, cancelling its movement.
    pub fn remove_unit(&mut self, id: &str) -> Option<Unit> {
        self.units.remove(id, &mut self.mover)
    }

    /// Tasks units toward a world destination.
    pub fn move_units(&mut self, handles: &[UnitHandle], destination: Location) {
        self.mover.add(handles, destination, &self.units);
    }

    /// Read-only snapshot for the renderer.
    #[must_use]
    pub const fn frame(&self, tick: u64) -> Frame<'_> {
        Frame::new(tick, &self.units, &self.view)
    }
}

impl TickObserver for World {
    fn tick(&mut self) -> Result<(), EngineError> {
        self.view.tick();
        self.mover.tick(&mut self.units)
    }
}

impl CommandConsumer for World {
    fn name(&self) -> &str {
        "world"
    }

    fn accept(&mut self, command: &Command) -> Result<(), EngineError> {
        self.view.accept(command)?;
        self.units.apply(command, &self.view, &mut self.mover);
        Ok(())
    }
}
