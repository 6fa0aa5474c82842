//! Seeded demo scenario.

use glam::DVec2;
use mday_core::{Command, Location, ShipClass, Unit, UnitType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for the demo layout.
pub const DEMO_SEED: u64 = 0x6d64_6179;

const ROWS: usize = 5;
const COLUMNS: usize = 5;
const ORIGIN: DVec2 = DVec2::new(-210.0, -140.0);
const SPACING: DVec2 = DVec2::new(100.0, 90.0);
const JITTER: f64 = 8.0;

/// A 5x5 grid of ships cycling through every class, nudged by seeded jitter,
/// plus a star and a planet off to the side.
pub fn demo_fleet(seed: u64, owner: &str) -> Vec<Command> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut commands = Vec::with_capacity(ROWS * COLUMNS + 2);

    for row in 0..ROWS {
        for column in 0..COLUMNS {
            let index = row * COLUMNS + column;
            let class = ShipClass::ALL[index % ShipClass::ALL.len()];
            let cell = DVec2::new(column as f64, row as f64);
            let jitter = DVec2::new(
                rng.gen_range(-JITTER..=JITTER),
                rng.gen_range(-JITTER..=JITTER),
            );
            let location = Location::from_vec(ORIGIN + cell * SPACING + jitter);
            let heading = rng.gen_range(0.0..std::f64::consts::TAU);

            let ship = Unit::ship(format!("{owner}-{index:02}"), location, class, owner)
                .with_heading(heading);
            commands.push(Command::AddUnit(ship));
        }
    }

    commands.push(Command::AddUnit(
        Unit::new("sol", UnitType::Star, Location::new(520.0, -300.0)).with_radius(40.0),
    ));
    commands.push(Command::AddUnit(
        Unit::new("terra", UnitType::Planet, Location::new(380.0, -220.0)).with_radius(12.0),
    ));
    commands
}
