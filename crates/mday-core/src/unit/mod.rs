//! Unit module: the mutable simulation entities.
//!
//! This module provides the unit types moved and selected by the engine:
//! - [`UnitId`]: Stable, externally assigned string identity
//! - [`UnitHandle`]: Dense arena slot used inside the engine
//! - [`UnitType`]: Type classification used by the registry's type index
//! - [`UnitFlags`]: Movable/selected state bits
//! - [`Unit`]: The complete unit
//!
//! # Identity
//!
//! Two units are equal iff their ids match. Location, heading and flags change
//! every tick and never take part in equality, ordering or hashing.
//!
//! # Example
//!
//! ```
//! use mday_core::location::Location;
//! use mday_core::unit::{ShipClass, Unit, UnitType};
//!
//! let ship = Unit::ship("frigate-1", Location::new(10.0, 20.0), ShipClass::Frigate, "player-1");
//!
//! assert_eq!(ship.unit_type(), UnitType::Ship);
//! assert!(ship.is_movable());
//! assert!(!ship.is_selected());
//! ```

pub mod ship_class;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::location::Location;

pub use ship_class::{ShipClass, ShipConfiguration};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique, immutable identifier for a unit.
///
/// Assigned by whoever creates the unit (the server, or a local scenario) and
/// carried by add/remove commands.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Creates a new `UnitId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for UnitId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UnitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Slot index of a unit inside the registry's arena.
///
/// Handles are stable for as long as the unit stays registered. A freed slot
/// may be handed to a later unit, so a handle must not outlive its unit: the
/// registry cancels the unit's movement before releasing the slot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitHandle(u32);

impl UnitHandle {
    /// Creates a handle from a raw slot index.
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitHandle({})", self.0)
    }
}

// =============================================================================
// Type & Flags
// =============================================================================

/// Unit type classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// A ship. Movable.
    Ship,
    /// A planet. Fixed in place.
    Planet,
    /// A star. Fixed in place.
    Star,
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ship => write!(f, "Ship"),
            Self::Planet => write!(f, "Planet"),
            Self::Star => write!(f, "Star"),
        }
    }
}

/// Wraps an angle into `[0, 2π)`.
///
/// `rem_euclid` can round a tiny negative angle up to exactly `2π`; that case
/// folds back to zero.
#[must_use]
pub fn normalize_heading(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(std::f64::consts::TAU);
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

bitflags! {
    /// State bits of a unit.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct UnitFlags: u8 {
        /// The unit accepts move orders.
        const MOVABLE = 1 << 0;
        /// The unit is part of the current selection.
        const SELECTED = 1 << 1;
    }
}

// =============================================================================
// Unit
// =============================================================================

/// A simulation entity: a ship, planet or star.
///
/// Units are owned by the [`Units`](crate::units::Units) registry. Only the
/// scheduler thread mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    unit_type: UnitType,
    location: Location,
    /// Collision and selection radius in world units.
    radius: f64,
    /// Facing in radians, kept in `[0, 2π)`. Zero points up the screen.
    heading: f64,
    flags: UnitFlags,
    /// Top speed in world units per second.
    movement_speed: f64,
    /// Fraction of top speed gained per tick while accelerating.
    acceleration: f64,
    /// Maximum heading change per tick, in radians.
    traverse_speed: f64,
    ship_class: Option<ShipClass>,
    owner: Option<String>,
}

impl Unit {
    /// Creates an immovable unit with zero radius and no kinematics.
    ///
    /// Use the builder-style setters to fill in the rest, or [`Unit::ship`]
    /// for ships.
    #[must_use]
    pub fn new(id: impl Into<UnitId>, unit_type: UnitType, location: Location) -> Self {
        Self {
            id: id.into(),
            unit_type,
            location,
            radius: 0.0,
            heading: 0.0,
            flags: UnitFlags::empty(),
            movement_speed: 0.0,
            acceleration: 0.0,
            traverse_speed: 0.0,
            ship_class: None,
            owner: None,
        }
    }

    /// Creates a movable ship whose kinematics come from its class.
    #[must_use]
    pub fn ship(
        id: impl Into<UnitId>,
        location: Location,
        ship_class: ShipClass,
        owner: impl Into<String>,
    ) -> Self {
        let config = ship_class.configuration();
        Self {
            radius: config.radius,
            flags: UnitFlags::MOVABLE,
            movement_speed: config.movement_speed,
            acceleration: config.acceleration,
            traverse_speed: config.traverse_speed,
            ship_class: Some(ship_class),
            owner: Some(owner.into()),
            ..Self::new(id, UnitType::Ship, location)
        }
    }

    /// Sets the radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the initial heading (normalised into `[0, 2π)`).
    #[must_use]
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.set_heading(heading);
        self
    }

    /// Sets top speed, acceleration fraction and turn rate, and marks the unit
    /// movable.
    #[must_use]
    pub fn with_kinematics(mut self, movement_speed: f64, acceleration: f64, traverse_speed: f64) -> Self {
        self.movement_speed = movement_speed;
        self.acceleration = acceleration;
        self.traverse_speed = traverse_speed;
        self.flags.insert(UnitFlags::MOVABLE);
        self
    }

    /// Sets whether the unit accepts move orders.
    #[must_use]
    pub fn with_movable(mut self, movable: bool) -> Self {
        self.flags.set(UnitFlags::MOVABLE, movable);
        self
    }

    /// Sets whether the unit starts selected.
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.flags.set(UnitFlags::SELECTED, selected);
        self
    }

    /// Returns the unit's id.
    #[must_use]
    pub fn id(&self) -> &UnitId {
        &self.id
    }

    /// Returns the unit's type.
    #[must_use]
    pub const fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    /// Returns the current location.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Moves the unit.
    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    /// Returns the radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the heading in radians, in `[0, 2π)`.
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Sets the heading, normalising it into `[0, 2π)`.
    pub fn set_heading(&mut self, heading: f64) {
        self.heading = normalize_heading(heading);
    }

    /// Returns the state bits.
    #[must_use]
    pub const fn flags(&self) -> UnitFlags {
        self.flags
    }

    /// Whether the unit accepts move orders.
    #[must_use]
    pub const fn is_movable(&self) -> bool {
        self.flags.contains(UnitFlags::MOVABLE)
    }

    /// Whether the unit is selected.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.flags.contains(UnitFlags::SELECTED)
    }

    /// Selects or deselects the unit.
    pub fn set_selected(&mut self, selected: bool) {
        self.flags.set(UnitFlags::SELECTED, selected);
    }

    /// Returns the top speed in world units per second.
    #[must_use]
    pub const fn movement_speed(&self) -> f64 {
        self.movement_speed
    }

    /// Returns the acceleration fraction per tick.
    #[must_use]
    pub const fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// Returns the turn rate in radians per tick.
    #[must_use]
    pub const fn traverse_speed(&self) -> f64 {
        self.traverse_speed
    }

    /// Returns the ship class, if this unit is a ship.
    #[must_use]
    pub const fn ship_class(&self) -> Option<ShipClass> {
        self.ship_class
    }

    /// Returns the owning player's id, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Unit {}

impl PartialOrd for Unit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Unit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ship_class {
            Some(class) => write!(f, "{} {} at {}", class, self.id, self.location),
            None => write!(f, "{} {} at {}", self.unit_type, self.id, self.location),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
