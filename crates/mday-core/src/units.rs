//! The unit registry.
//!
//! [`Units`] exclusively owns every live [`Unit`]. Units sit in a dense arena
//! addressed by [`UnitHandle`], with two secondary indices:
//!
//! - id → handle, for commands that name units
//! - type → handles, for type-filtered queries
//!
//! The registry applies unit commands. Movement is delegated to the
//! [`UnitMover`], selection geometry to the [`CoordinateSystem`].
//!
//! # Example
//!
//! ```
//! use mday_core::location::{Location, ScreenPoint};
//! use mday_core::movement::UnitMover;
//! use mday_core::unit::{ShipClass, Unit};
//! use mday_core::units::Units;
//! use mday_core::view::CoordinateSystem;
//!
//! let view = CoordinateSystem::default();
//! let mut mover = UnitMover::default();
//! let mut units = Units::new();
//! units.add(Unit::ship("scout", Location::new(10.0, 10.0), ShipClass::Recon, "me"));
//!
//! // The default 1280x720 viewport is centred on the origin at scale 1.
//! units.select_rect(ScreenPoint::new(640.0, 360.0), ScreenPoint::new(700.0, 400.0), &view);
//! assert!(units.any_selected());
//!
//! units.move_selected(ScreenPoint::new(1000.0, 360.0), &view, &mut mover);
//! assert_eq!(mover.len(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::command::Command;
use crate::location::{Location, ScreenPoint};
use crate::movement::UnitMover;
use crate::unit::{Unit, UnitHandle, UnitId, UnitType};
use crate::view::CoordinateSystem;

/// Registry of all live units.
#[derive(Debug, Clone, Default)]
pub struct Units {
    slots: Vec<Option<Unit>>,
    free: Vec<UnitHandle>,
    index: HashMap<UnitId, UnitHandle>,
    by_type: BTreeMap<UnitType, BTreeSet<UnitHandle>>,
    any_selected: bool,
}

impl Units {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no units are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether at least one unit is selected.
    #[must_use]
    pub const fn any_selected(&self) -> bool {
        self.any_selected
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Looks a unit up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Unit> {
        self.handle(id).and_then(|handle| self.unit(handle))
    }

    /// Handle of the unit with this id.
    #[must_use]
    pub fn handle(&self, id: &str) -> Option<UnitHandle> {
        self.index.get(id).copied()
    }

    /// Looks a unit up by handle.
    #[must_use]
    pub fn unit(&self, handle: UnitHandle) -> Option<&Unit> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    pub(crate) fn unit_mut(&mut self, handle: UnitHandle) -> Option<&mut Unit> {
        self.slots.get_mut(handle.index()).and_then(Option::as_mut)
    }

    /// Every unit with its handle, in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitHandle, &Unit)> {
        self.slots.iter().enumerate().filter_map(|(slot, unit)| {
            let slot = u32::try_from(slot).ok()?;
            unit.as_ref().map(|unit| (UnitHandle::new(slot), unit))
        })
    }

    /// Every unit, in handle order.
    pub fn all(&self) -> impl Iterator<Item = &Unit> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Selected units.
    pub fn selected(&self) -> impl Iterator<Item = &Unit> {
        self.all().filter(|unit| unit.is_selected())
    }

    /// Units of one type.
    pub fn by_type(&self, unit_type: UnitType) -> impl Iterator<Item = &Unit> + '_ {
        self.by_type
            .get(&unit_type)
            .into_iter()
            .flatten()
            .filter_map(|handle| self.unit(*handle))
    }

    /// Units overlapping the visible area of `view`.
    pub fn visible<'a>(&'a self, view: &'a CoordinateSystem) -> impl Iterator<Item = &'a Unit> + 'a {
        self.all()
            .filter(move |unit| view.contains(unit.location(), unit.radius()))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Registers a unit and returns its handle.
    ///
    /// A unit whose id is already registered, or whose location is not
    /// finite, is rejected.
    pub fn add(&mut self, unit: Unit) -> Option<UnitHandle> {
        if self.index.contains_key(unit.id()) {
            warn!(unit = %unit.id(), "ignoring duplicate unit");
            return None;
        }
        if !unit.location().is_finite() {
            warn!(unit = %unit.id(), "ignoring unit with non-finite location");
            return None;
        }

        let handle = match self.free.pop() {
            Some(handle) => handle,
            None => {
                let Ok(slot) = u32::try_from(self.slots.len()) else {
                    warn!(unit = %unit.id(), "unit arena is full");
                    return None;
                };
                self.slots.push(None);
                UnitHandle::new(slot)
            }
        };

        debug!(unit = %unit, ?handle, "unit added");
        self.any_selected |= unit.is_selected();
        self.index.insert(unit.id().clone(), handle);
        self.by_type.entry(unit.unit_type()).or_default().insert(handle);
        self.slots[handle.index()] = Some(unit);
        Some(handle)
    }

    /// Unregisters a unit, cancelling its movement first.
    pub fn remove(&mut self, id: &str, mover: &mut UnitMover) -> Option<Unit> {
        let handle = self.index.remove(id)?;
        mover.cancel(handle);

        let unit = self.slots.get_mut(handle.index()).and_then(Option::take)?;
        if let Some(handles) = self.by_type.get_mut(&unit.unit_type()) {
            handles.remove(&handle);
            if handles.is_empty() {
                self.by_type.remove(&unit.unit_type());
            }
        }
        self.free.push(handle);
        let any_selected = self.slots.iter().flatten().any(Unit::is_selected);
        self.any_selected = any_selected;

        debug!(unit = %unit.id(), "unit removed");
        Some(unit)
    }

    /// Selects exactly the units whose location, grown by their radius, lies
    /// inside the world rectangle under the two screen corners. Returns the
    /// number of selected units.
    pub fn select_rect(
        &mut self,
        top_left: ScreenPoint,
        bottom_right: ScreenPoint,
        view: &CoordinateSystem,
    ) -> usize {
        let a = view.to_world_location(top_left).as_vec();
        let b = view.to_world_location(bottom_right).as_vec();
        // Drags may run in any direction.
        let min = Location::from_vec(a.min(b));
        let max = Location::from_vec(a.max(b));

        let mut count = 0;
        for unit in self.slots.iter_mut().flatten() {
            let inside = unit.location().is_inside(min, max, unit.radius());
            unit.set_selected(inside);
            count += usize::from(inside);
        }
        self.any_selected = count > 0;
        debug!(count, %min, %max, "selection updated");
        count
    }

    /// Clears the selection.
    pub fn deselect_all(&mut self) {
        for unit in self.slots.iter_mut().flatten() {
            unit.set_selected(false);
        }
        self.any_selected = false;
    }

    /// Orders every selected, movable unit to the world location under
    /// `destination`. Does nothing when no such unit exists.
    pub fn move_selected(
        &self,
        destination: ScreenPoint,
        view: &CoordinateSystem,
        mover: &mut UnitMover,
    ) {
        let handles: Vec<UnitHandle> = self
            .iter()
            .filter(|(_, unit)| unit.is_selected() && unit.is_movable())
            .map(|(handle, _)| handle)
            .collect();
        if handles.is_empty() {
            debug!("move ignored: nothing selected can move");
            return;
        }
        mover.add(&handles, view.to_world_location(destination), self);
    }

    /// Applies the unit-related commands; everything else is ignored.
    pub fn apply(&mut self, command: &Command, view: &CoordinateSystem, mover: &mut UnitMover) {
        match command {
            Command::AddUnit(unit) => {
                self.add(unit.clone());
            }
            Command::RemoveUnit(id) => {
                if self.remove(id.as_str(), mover).is_none() {
                    debug!(unit = %id, "remove ignored: unknown unit");
                }
            }
            Command::SelectRect {
                top_left,
                bottom_right,
            } => {
                self.select_rect(*top_left, *bottom_right, view);
            }
            Command::Deselect => self.deselect_all(),
            Command::MoveSelected(destination) => self.move_selected(*destination, view, mover),
            _ => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::ShipClass;

    fn planet(id: &str, x: f64, y: f64) -> Unit {
        Unit::new(id, UnitType::Planet, Location::new(x, y)).with_radius(5.0)
    }

    fn fighter(id: &str, x: f64, y: f64) -> Unit {
        Unit::ship(id, Location::new(x, y), ShipClass::Fighter, "p1")
    }

    /// 100x100 viewport centred on the origin at scale 1.
    fn small_view() -> CoordinateSystem {
        let mut view = CoordinateSystem::default();
        view.set_viewport(100, 100);
        view
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn add_indexes_by_id_and_type() {
            let mut units = Units::new();
            let h = units.add(fighter("f1", 0.0, 0.0)).unwrap();
            units.add(planet("earth", 50.0, 0.0)).unwrap();

            assert_eq!(units.len(), 2);
            assert_eq!(units.handle("f1"), Some(h));
            assert_eq!(units.get("earth").unwrap().unit_type(), UnitType::Planet);
            assert_eq!(units.by_type(UnitType::Ship).count(), 1);
            assert_eq!(units.by_type(UnitType::Star).count(), 0);
        }

        #[test]
        fn duplicate_id_rejected() {
            let mut units = Units::new();
            units.add(fighter("f1", 0.0, 0.0)).unwrap();
            assert!(units.add(fighter("f1", 9.0, 9.0)).is_none());
            assert_eq!(units.get("f1").unwrap().location(), Location::ORIGIN);
        }

        #[test]
        fn non_finite_location_rejected() {
            let mut units = Units::new();
            assert!(units.add(fighter("f1", f64::INFINITY, 0.0)).is_none());
            assert!(units.is_empty());
        }

        #[test]
        fn remove_frees_slot_and_indices() {
            let mut units = Units::new();
            let mut mover = UnitMover::default();
            let h = units.add(fighter("f1", 0.0, 0.0)).unwrap();

            let removed = units.remove("f1", &mut mover).unwrap();
            assert_eq!(removed.id().as_str(), "f1");
            assert!(units.get("f1").is_none());
            assert_eq!(units.by_type(UnitType::Ship).count(), 0);

            let reused = units.add(fighter("f2", 0.0, 0.0)).unwrap();
            assert_eq!(reused, h);
            assert!(units.remove("missing", &mut mover).is_none());
        }

        #[test]
        fn remove_cancels_movement() {
            let mut units = Units::new();
            let mut mover = UnitMover::default();
            let h = units.add(fighter("f1", 0.0, 0.0)).unwrap();
            mover.add(&[h], Location::new(100.0, 100.0), &units);
            assert!(mover.is_moving(h));

            units.remove("f1", &mut mover);
            assert!(!mover.is_moving(h));
        }

        #[test]
        fn any_selected_recomputed_on_remove() {
            let mut units = Units::new();
            let mut mover = UnitMover::default();
            units.add(fighter("f1", 0.0, 0.0).with_selected(true));
            units.add(fighter("f2", 0.0, 0.0));
            assert!(units.any_selected());

            units.remove("f1", &mut mover);
            assert!(!units.any_selected());
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn select_rect_replaces_selection() {
            let view = small_view();
            let mut units = Units::new();
            units.add(fighter("in", 0.0, 0.0).with_selected(false));
            units.add(fighter("out", 40.0, 40.0).with_selected(true));

            // Screen (40,40)-(60,60) is world (-10,-10)-(10,10).
            let count = units.select_rect(ScreenPoint::new(40.0, 40.0), ScreenPoint::new(60.0, 60.0), &view);
            assert_eq!(count, 1);
            assert!(units.get("in").unwrap().is_selected());
            assert!(!units.get("out").unwrap().is_selected());
        }

        #[test]
        fn radius_extends_selection() {
            let view = small_view();
            let mut units = Units::new();
            units.add(planet("edge", 14.0, 0.0));

            units.select_rect(ScreenPoint::new(40.0, 40.0), ScreenPoint::new(60.0, 60.0), &view);
            assert!(units.get("edge").unwrap().is_selected());
        }

        #[test]
        fn inverted_drag_selects_same_area() {
            let view = small_view();
            let mut units = Units::new();
            units.add(fighter("in", 0.0, 0.0));
            units.select_rect(ScreenPoint::new(60.0, 60.0), ScreenPoint::new(40.0, 40.0), &view);
            assert!(units.any_selected());
        }

        #[test]
        fn deselect_clears_everything() {
            let mut units = Units::new();
            units.add(fighter("a", 0.0, 0.0).with_selected(true));
            units.deselect_all();
            assert!(!units.any_selected());
            assert_eq!(units.selected().count(), 0);
        }
    }

    mod command_tests {
        use super::*;

        #[test]
        fn move_selected_only_tasks_selected_movable() {
            let view = small_view();
            let mut mover = UnitMover::default();
            let mut units = Units::new();
            let picked = units.add(fighter("picked", 0.0, 0.0).with_selected(true)).unwrap();
            let idle = units.add(fighter("idle", 5.0, 0.0)).unwrap();
            let rock = units.add(planet("rock", 0.0, 5.0).with_selected(true)).unwrap();

            units.apply(&Command::MoveSelected(ScreenPoint::new(90.0, 90.0)), &view, &mut mover);

            assert!(mover.is_moving(picked));
            assert!(!mover.is_moving(idle));
            assert!(!mover.is_moving(rock));
            assert_eq!(
                mover.movement(picked).unwrap().destination(),
                Location::new(40.0, 40.0)
            );
        }

        #[test]
        fn move_with_empty_selection_is_noop() {
            let view = small_view();
            let mut mover = UnitMover::default();
            let mut units = Units::new();
            units.add(fighter("f", 0.0, 0.0));
            units.apply(&Command::MoveSelected(ScreenPoint::new(0.0, 0.0)), &view, &mut mover);
            assert!(mover.is_empty());
        }

        #[test]
        fn add_and_remove_commands() {
            let view = small_view();
            let mut mover = UnitMover::default();
            let mut units = Units::new();

            units.apply(&Command::AddUnit(planet("mars", 1.0, 1.0)), &view, &mut mover);
            assert_eq!(units.len(), 1);
            units.apply(&Command::RemoveUnit(UnitId::new("mars")), &view, &mut mover);
            assert!(units.is_empty());
            units.apply(&Command::RemoveUnit(UnitId::new("mars")), &view, &mut mover);
        }

        #[test]
        fn visible_filters_by_view() {
            let view = small_view();
            let mut units = Units::new();
            units.add(planet("near", 0.0, 0.0));
            units.add(planet("far", 500.0, 0.0));
            let visible: Vec<_> = units.visible(&view).map(|u| u.id().as_str()).collect();
            assert_eq!(visible, vec!["near"]);
        }
    }
}
