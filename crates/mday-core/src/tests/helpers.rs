//! Scenario builders shared by the cross-module tests.

use crate::config::EngineConfig;
use crate::location::Location;
use crate::movement::UnitMover;
use crate::unit::{Unit, UnitHandle, UnitType};
use crate::units::Units;
use crate::view::CoordinateSystem;

// =============================================================================
// Scenario Setup
// =============================================================================

/// A 100x100 viewport centred on the origin at scale 1, so screen point
/// `(x, y)` is world location `(x - 50, y - 50)`.
pub fn small_view() -> CoordinateSystem {
    CoordinateSystem::with_config(&EngineConfig {
        viewport_width: 100,
        viewport_height: 100,
        ..EngineConfig::default()
    })
}

/// Builds a movable ship with explicit kinematics.
pub fn test_ship(id: &str, location: Location, speed: f64, acceleration: f64, traverse: f64) -> Unit {
    Unit::new(id, UnitType::Ship, location).with_kinematics(speed, acceleration, traverse)
}

/// Registers three ships in a row at x = -100, 0, 100 on the X axis, all
/// facing up the screen.
pub fn setup_row(units: &mut Units) -> Vec<UnitHandle> {
    [-100.0, 0.0, 100.0]
        .iter()
        .enumerate()
        .filter_map(|(i, &x)| {
            units.add(test_ship(&format!("row-{i}"), Location::new(x, 0.0), 30.0, 0.1, 0.1))
        })
        .collect()
}

/// Ticks the mover until it is idle, returning the number of ticks taken.
///
/// # Panics
///
/// Panics if the mover is still busy after `limit` ticks.
pub fn run_mover(mover: &mut UnitMover, units: &mut Units, limit: usize) -> usize {
    for tick in 0..limit {
        if mover.is_empty() {
            return tick;
        }
        mover.tick(units).expect("tick failed");
    }
    assert!(mover.is_empty(), "mover still busy after {limit} ticks");
    limit
}

/// Location of a registered unit.
///
/// # Panics
///
/// Panics if the handle is not registered.
pub fn location_of(units: &Units, handle: UnitHandle) -> Location {
    units.unit(handle).expect("unit registered").location()
}
