//! Ship classes and their static configuration.
//!
//! Every ship belongs to a [`ShipClass`]. The class fixes the physical
//! characteristics the mover needs (radius, top speed, acceleration, turn rate)
//! plus the loadout counts used by the wider game.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Static characteristics shared by every ship of a class.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipConfiguration {
    /// Collision and selection radius in world units.
    pub radius: f64,
    /// Top speed in world units per second.
    pub movement_speed: f64,
    /// Fraction of top speed gained (or shed) per tick.
    pub acceleration: f64,
    /// Maximum heading change per tick, in radians.
    pub traverse_speed: f64,
    /// Structural hit points.
    pub hit_points: u32,
    /// Engine slots.
    pub engines: u8,
    /// Maneuvering thruster slots.
    pub thrusters: u8,
    /// Sensor slots.
    pub sensors: u8,
    /// Defense slots.
    pub defenses: u8,
    /// Weapon slots.
    pub weapons: u8,
    /// Energy capacity.
    pub energy: u8,
}

/// Turn rate expressed the way the balance table is authored: degrees per
/// ten ticks.
fn traverse(degrees_per_ten_ticks: f64) -> f64 {
    degrees_per_ten_ticks * PI / 180.0 / 10.0
}

#[allow(clippy::too_many_arguments)]
fn config(
    radius: f64,
    movement_speed: f64,
    acceleration: f64,
    traverse_speed: f64,
    hit_points: u32,
    engines: u8,
    thrusters: u8,
    sensors: u8,
    defenses: u8,
    weapons: u8,
    energy: u8,
) -> ShipConfiguration {
    ShipConfiguration {
        radius,
        movement_speed,
        acceleration,
        traverse_speed,
        hit_points,
        engines,
        thrusters,
        sensors,
        defenses,
        weapons,
        energy,
    }
}

/// The different classes of ships.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    /// Mobile construction yard.
    Shipyard,
    /// Scouting and reconnaissance.
    Recon,
    /// Fast and maneuverable for skirmishes.
    Fighter,
    /// Mixed-armament warship.
    Frigate,
    /// Heavy firepower warship.
    Destroyer,
    /// Heavily armored warship with heavy firepower.
    Dreadnought,
    /// Provides transportation.
    Transport,
    /// Researches technologies.
    Research,
    /// Performs repairs on ships.
    Repair,
    /// Collects energy from a star.
    Collector,
    /// Generates a local shield.
    ShieldGenerator,
}

impl ShipClass {
    /// Every ship class, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Shipyard,
        Self::Recon,
        Self::Fighter,
        Self::Frigate,
        Self::Destroyer,
        Self::Dreadnought,
        Self::Transport,
        Self::Research,
        Self::Repair,
        Self::Collector,
        Self::ShieldGenerator,
    ];

    /// Returns the static configuration for this class.
    #[must_use]
    pub fn configuration(self) -> ShipConfiguration {
        match self {
            Self::Shipyard => config(25.0, 4.0, 1.0 / 60.0, traverse(1.0), 1000, 2, 2, 0, 0, 0, 4),
            Self::Recon => config(6.0, 38.0, 1.0 / 100.0, traverse(18.0), 100, 1, 2, 3, 0, 0, 2),
            Self::Fighter => config(8.0, 32.0, 1.0 / 40.0, traverse(24.0), 400, 4, 4, 0, 1, 2, 1),
            Self::Frigate => config(11.0, 24.0, 1.0 / 100.0, traverse(14.0), 600, 2, 2, 1, 2, 1, 4),
            Self::Destroyer => config(15.0, 18.0, 1.0 / 60.0, traverse(10.0), 800, 4, 4, 2, 2, 2, 6),
            Self::Dreadnought => {
                config(20.0, 6.0, 1.0 / 160.0, traverse(3.0), 1500, 4, 4, 0, 4, 4, 4)
            }
            Self::Transport => config(15.0, 14.0, 1.0 / 60.0, traverse(9.0), 200, 4, 4, 0, 0, 0, 4),
            Self::Research => config(12.0, 9.0, 1.0 / 120.0, traverse(4.0), 100, 1, 2, 0, 0, 0, 4),
            Self::Repair => config(10.0, 12.0, 1.0 / 60.0, traverse(10.0), 100, 2, 2, 0, 0, 0, 2),
            Self::Collector => config(8.0, 4.0, 1.0 / 240.0, traverse(3.0), 50, 1, 1, 0, 0, 0, 0),
            Self::ShieldGenerator => {
                config(6.0, 4.0, 1.0 / 90.0, traverse(4.0), 50, 1, 1, 0, 0, 0, 1)
            }
        }
    }
}

impl fmt::Display for ShipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Shipyard => "Shipyard",
            Self::Recon => "Recon",
            Self::Fighter => "Fighter",
            Self::Frigate => "Frigate",
            Self::Destroyer => "Destroyer",
            Self::Dreadnought => "Dreadnought",
            Self::Transport => "Transport",
            Self::Research => "Research",
            Self::Repair => "Repair",
            Self::Collector => "Collector",
            Self::ShieldGenerator => "ShieldGenerator",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_class_has_positive_kinematics() {
        for class in ShipClass::ALL {
            let c = class.configuration();
            assert!(c.radius > 0.0, "{class} radius");
            assert!(c.movement_speed > 0.0, "{class} speed");
            assert!(c.acceleration > 0.0, "{class} acceleration");
            assert!(c.traverse_speed > 0.0, "{class} traverse");
        }
    }

    #[test]
    fn fighter_turns_faster_than_dreadnought() {
        let fighter = ShipClass::Fighter.configuration();
        let dread = ShipClass::Dreadnought.configuration();
        assert!(fighter.traverse_speed > dread.traverse_speed);
        assert!(fighter.movement_speed > dread.movement_speed);
    }

    #[test]
    fn traverse_table_is_degrees_per_ten_ticks() {
        let frigate = ShipClass::Frigate.configuration();
        let expected = 14.0_f64.to_radians() / 10.0;
        assert!((frigate.traverse_speed - expected).abs() < 1e-12);
    }
}
