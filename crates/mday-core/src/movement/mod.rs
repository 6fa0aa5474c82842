//! Unit movement physics.
//!
//! [`UnitMover`] drives every in-flight [`Movement`] one tick at a time. Each
//! movement runs a small state machine:
//!
//! 1. **Turning**: the heading rotates toward the destination by at most the
//!    traverse speed per tick. Once the remaining error is within the heading
//!    lock and smaller than one traverse step, the heading snaps onto the
//!    target and the unit reports completion to its group barrier.
//! 2. **Accelerating**: once the whole group has turned, speed grows by
//!    `target_speed * acceleration` per tick. The distance covered while
//!    accelerating is remembered.
//! 3. **Cruising**: top speed until the remaining distance drops to the
//!    remembered acceleration distance.
//! 4. **Decelerating**: speed shrinks symmetrically, but never below one
//!    acceleration step.
//! 5. **Arrived**: a step that would reach or pass the destination lands the
//!    unit on it exactly and drops the movement.
//!
//! # Strategy Selection
//!
//! [`UnitMover::add`] tasks units in one of two ways:
//!
//! - **Individual** when the destination lies inside the bounding box of the
//!   units: each unit heads for the destination itself, in its own group.
//! - **Formation** otherwise: every unit keeps its offset from the group's
//!   centroid, and the group shares the slowest speed, acceleration and turn
//!   rate of its movable members.
//!
//! # Example
//!
//! ```
//! use mday_core::location::Location;
//! use mday_core::movement::UnitMover;
//! use mday_core::unit::{Unit, UnitType};
//! use mday_core::units::Units;
//!
//! let mut units = Units::new();
//! let handle = units
//!     .add(Unit::new("probe", UnitType::Ship, Location::ORIGIN).with_kinematics(30.0, 0.5, 0.2))
//!     .unwrap();
//!
//! let mut mover = UnitMover::default();
//! mover.add(&[handle], Location::new(0.0, -10.0), &units);
//!
//! let mut ticks = 0;
//! while mover.is_moving(handle) {
//!     mover.tick(&mut units).unwrap();
//!     ticks += 1;
//! }
//!
//! assert_eq!(units.unit(handle).unwrap().location(), Location::new(0.0, -10.0));
//! assert!(ticks > 1);
//! ```

pub mod group;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec2;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::location::Location;
use crate::unit::{normalize_heading, Unit, UnitHandle};
use crate::units::Units;

pub use group::{CompletionBarrier, GroupId};

// =============================================================================
// Movement
// =============================================================================

/// Speed phase of a movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Gaining speed.
    Accelerating,
    /// At top speed.
    Cruising,
    /// Shedding speed on the approach.
    Decelerating,
}

/// In-flight movement of a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    group: GroupId,
    start: Location,
    destination: Location,
    target_speed: f64,
    acceleration: f64,
    traverse_speed: f64,
    current_speed: f64,
    phase: Phase,
    /// Distance travelled from `start` while accelerating.
    acceleration_distance: f64,
    /// Whether this member has reported completion to its group.
    turned: bool,
}

impl Movement {
    fn new(
        group: GroupId,
        start: Location,
        destination: Location,
        target_speed: f64,
        acceleration: f64,
        traverse_speed: f64,
    ) -> Self {
        // No acceleration means full speed from the first step.
        let (current_speed, phase) = if acceleration > 0.0 {
            (0.0, Phase::Accelerating)
        } else {
            (target_speed, Phase::Cruising)
        };
        Self {
            group,
            start,
            destination,
            target_speed,
            acceleration,
            traverse_speed,
            current_speed,
            phase,
            acceleration_distance: 0.0,
            turned: false,
        }
    }

    /// Group this movement belongs to.
    #[must_use]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// Where the unit was when the movement was created.
    #[must_use]
    pub const fn start(&self) -> Location {
        self.start
    }

    /// Where the unit is heading.
    #[must_use]
    pub const fn destination(&self) -> Location {
        self.destination
    }

    /// Top speed in world units per second.
    #[must_use]
    pub const fn target_speed(&self) -> f64 {
        self.target_speed
    }

    /// Current speed in world units per second.
    #[must_use]
    pub const fn current_speed(&self) -> f64 {
        self.current_speed
    }

    /// Turn rate used for this movement, in radians per tick.
    #[must_use]
    pub const fn traverse_speed(&self) -> f64 {
        self.traverse_speed
    }

    /// Current speed phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the unit has finished its initial turn.
    #[must_use]
    pub const fn has_turned(&self) -> bool {
        self.turned
    }

    fn update_speed(&mut self, location: Location) {
        let step = (self.target_speed * self.acceleration).min(self.target_speed);
        let remaining = location.distance_to(self.destination);

        if self.phase != Phase::Decelerating
            && self.acceleration_distance > 0.0
            && remaining <= self.acceleration_distance
        {
            self.phase = Phase::Decelerating;
        }

        match self.phase {
            Phase::Accelerating => {
                self.current_speed = (self.current_speed + step).min(self.target_speed);
                self.acceleration_distance = self.start.distance_to(location);
                if self.current_speed >= self.target_speed {
                    self.phase = Phase::Cruising;
                }
            }
            Phase::Cruising => {}
            Phase::Decelerating => {
                self.current_speed = (self.current_speed - step).max(step);
            }
        }
    }
}

// =============================================================================
// Steering
// =============================================================================

enum Steer {
    Turning,
    Aligned,
    Arrived,
}

/// Heading that points along `direction`. Zero points up the screen.
fn required_heading(direction: Location) -> f64 {
    normalize_heading(FRAC_PI_2 + direction.y().atan2(direction.x()))
}

/// `heading - required`, wrapped into `(-π, π]`.
fn angle_delta(heading: f64, required: f64) -> f64 {
    let delta = (heading - required).rem_euclid(TAU);
    if delta > PI {
        delta - TAU
    } else {
        delta
    }
}

fn non_finite(unit: &Unit) -> EngineError {
    EngineError::NonFiniteState {
        unit: unit.id().to_string(),
    }
}

fn steer(unit: &mut Unit, movement: &Movement, heading_lock: f64) -> Result<Steer, EngineError> {
    let location = unit.location();
    if !location.is_finite() || !unit.heading().is_finite() {
        return Err(non_finite(unit));
    }
    if location == movement.destination {
        return Ok(Steer::Arrived);
    }
    let Some(direction) = (movement.destination - location).try_normalized() else {
        // Closer than any representable direction.
        unit.set_location(movement.destination);
        return Ok(Steer::Arrived);
    };

    let required = required_heading(direction);
    let delta = angle_delta(unit.heading(), required);
    let traverse = movement.traverse_speed;

    if traverse <= 0.0 || (delta.abs() <= heading_lock && delta.abs() < traverse) {
        unit.set_heading(required);
        return Ok(Steer::Aligned);
    }

    let step = traverse.min(delta.abs());
    if delta < 0.0 {
        unit.set_heading(unit.heading() + step);
    } else {
        unit.set_heading(unit.heading() - step);
    }
    Ok(Steer::Turning)
}

/// Moves the unit one step. Returns `true` once it sits on the destination.
fn advance(unit: &mut Unit, movement: &mut Movement, time_step: f64) -> Result<bool, EngineError> {
    let location = unit.location();
    movement.update_speed(location);

    let remaining = location.distance_to(movement.destination);
    let step = movement.current_speed * time_step;
    if step >= remaining {
        unit.set_location(movement.destination);
        return Ok(true);
    }

    let next = location + (movement.destination - location).normalized() * step;
    if !next.is_finite() {
        return Err(non_finite(unit));
    }
    unit.set_location(next);
    Ok(false)
}

// =============================================================================
// Geometry
// =============================================================================

fn inside_bounding_box(locations: impl Iterator<Item = Location>, point: Location) -> bool {
    let (min, max) = locations.fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(min, max), loc| (min.min(loc.as_vec()), max.max(loc.as_vec())),
    );
    point.is_inside(Location::from_vec(min), Location::from_vec(max), 0.0)
}

#[allow(clippy::cast_precision_loss)]
fn centroid(locations: &[Location]) -> Location {
    let sum: DVec2 = locations.iter().map(|loc| loc.as_vec()).sum();
    Location::from_vec(sum / locations.len() as f64)
}

/// Movable with a positive top speed.
fn can_move(unit: &Unit) -> bool {
    unit.is_movable() && unit.movement_speed() > 0.0
}

// =============================================================================
// Unit Mover
// =============================================================================

/// Registry of in-flight movements, advanced once per tick.
///
/// Movements are keyed by [`UnitHandle`] and iterated in handle order.
#[derive(Debug, Clone)]
pub struct UnitMover {
    moving: BTreeMap<UnitHandle, Movement>,
    /// Lookup only; never iterated.
    groups: HashMap<GroupId, CompletionBarrier>,
    next_group: u64,
    time_step: f64,
    heading_lock: f64,
}

impl Default for UnitMover {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

impl UnitMover {
    /// Creates an empty mover using the time step and heading lock from
    /// `config`.
    #[must_use]
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            moving: BTreeMap::new(),
            groups: HashMap::new(),
            next_group: 0,
            time_step: config.movement_time_step,
            heading_lock: config.heading_lock(),
        }
    }

    /// Number of units currently moving.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moving.len()
    }

    /// Whether no unit is moving.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moving.is_empty()
    }

    /// Whether the unit has a movement in flight.
    #[must_use]
    pub fn is_moving(&self, handle: UnitHandle) -> bool {
        self.moving.contains_key(&handle)
    }

    /// The unit's movement, if any.
    #[must_use]
    pub fn movement(&self, handle: UnitHandle) -> Option<&Movement> {
        self.moving.get(&handle)
    }

    /// Barrier state of a group, if it still has members.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&CompletionBarrier> {
        self.groups.get(&id)
    }

    /// Every movement in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitHandle, &Movement)> {
        self.moving.iter().map(|(handle, movement)| (*handle, movement))
    }

    /// Drops the unit's movement, releasing it from its group. Returns `true`
    /// if the unit was moving.
    pub fn cancel(&mut self, handle: UnitHandle) -> bool {
        self.release(handle).is_some()
    }

    fn release(&mut self, handle: UnitHandle) -> Option<Movement> {
        let movement = self.moving.remove(&handle)?;
        if let Some(barrier) = self.groups.get_mut(&movement.group) {
            if barrier.release(movement.turned) {
                self.groups.remove(&movement.group);
            }
        }
        Some(movement)
    }

    fn open_group(&mut self, members: usize) -> GroupId {
        let id = GroupId::new(self.next_group);
        self.next_group += 1;
        self.groups.insert(id, CompletionBarrier::new(members));
        id
    }

    /// Tasks `handles` toward `destination`, replacing any movement they
    /// already had. A non-finite destination is rejected and leaves every
    /// existing movement in place.
    ///
    /// Units that are immovable or have no top speed are skipped. Handles
    /// that do not resolve to a unit are ignored.
    pub fn add(&mut self, handles: &[UnitHandle], destination: Location, units: &Units) {
        if !destination.is_finite() {
            warn!(%destination, "ignoring move to non-finite destination");
            return;
        }

        let handles: BTreeSet<UnitHandle> = handles.iter().copied().collect();
        for &handle in &handles {
            self.cancel(handle);
        }

        let members: Vec<(UnitHandle, &Unit)> = handles
            .iter()
            .filter_map(|&handle| units.unit(handle).map(|unit| (handle, unit)))
            .collect();
        if members.is_empty() {
            return;
        }

        let locations: Vec<Location> = members.iter().map(|(_, unit)| unit.location()).collect();
        let movable: Vec<(UnitHandle, &Unit)> = members
            .iter()
            .copied()
            .filter(|(_, unit)| can_move(unit))
            .collect();

        if inside_bounding_box(locations.iter().copied(), destination) {
            debug!(units = movable.len(), %destination, "moving individually");
            for (handle, unit) in movable {
                let group = self.open_group(1);
                self.moving.insert(
                    handle,
                    Movement::new(
                        group,
                        unit.location(),
                        destination,
                        unit.movement_speed(),
                        unit.acceleration(),
                        unit.traverse_speed(),
                    ),
                );
            }
            return;
        }

        if movable.is_empty() {
            return;
        }

        let centre = centroid(&locations);
        let slowest = |f: fn(&Unit) -> f64| {
            movable
                .iter()
                .map(|(_, unit)| f(unit))
                .fold(f64::INFINITY, f64::min)
        };
        let speed = slowest(Unit::movement_speed);
        let acceleration = slowest(Unit::acceleration);
        let traverse = slowest(Unit::traverse_speed);

        debug!(
            units = movable.len(),
            %destination,
            speed,
            traverse,
            "moving in formation"
        );

        let group = self.open_group(movable.len());
        for (handle, unit) in movable {
            let offset = unit.location() - centre;
            self.moving.insert(
                handle,
                Movement::new(
                    group,
                    unit.location(),
                    destination + offset,
                    speed,
                    acceleration,
                    traverse,
                ),
            );
        }
    }

    /// Advances every movement by one tick.
    ///
    /// All headings are updated first; only then do the members of satisfied
    /// groups translate. Movements whose unit has gone missing are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NonFiniteState`] if a moving unit's location or
    /// heading is NaN or infinite.
    pub fn tick(&mut self, units: &mut Units) -> Result<(), EngineError> {
        if self.moving.is_empty() {
            return Ok(());
        }

        let mut finished = Vec::new();

        for (&handle, movement) in &mut self.moving {
            let Some(unit) = units.unit_mut(handle) else {
                finished.push(handle);
                continue;
            };
            match steer(unit, movement, self.heading_lock)? {
                Steer::Arrived => finished.push(handle),
                Steer::Aligned if !movement.turned => {
                    movement.turned = true;
                    if let Some(barrier) = self.groups.get_mut(&movement.group) {
                        barrier.complete_one();
                    }
                }
                Steer::Aligned | Steer::Turning => {}
            }
        }
        for handle in finished.drain(..) {
            self.release(handle);
        }

        for (&handle, movement) in &mut self.moving {
            let ready = self
                .groups
                .get(&movement.group)
                .map_or(true, CompletionBarrier::is_satisfied);
            if !ready {
                continue;
            }
            let Some(unit) = units.unit_mut(handle) else {
                continue;
            };
            if advance(unit, movement, self.time_step)? {
                debug!(unit = %unit.id(), location = %unit.location(), "arrived");
                finished.push(handle);
            }
        }
        for handle in finished {
            self.release(handle);
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
