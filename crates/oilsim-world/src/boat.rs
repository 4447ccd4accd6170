//! Cleanup boats and their battery/cargo state machine.
//!
//! A boat moves at most one grid step per axis per tick toward a target,
//! spending one unit of battery per step, and collects one unit of cargo
//! per oil cell it reaches. When either resource cannot cover one more
//! unit the boat spends the tick recharging or unloading instead. Both
//! happen instantly: the usage counter resets to zero in the same tick
//! the shortfall is detected.
//!
//! # Invariants
//!
//! - `0 <= load_used <= load_capacity` and `0 <= battery_used <=
//!   battery_capacity` after every mutator.
//! - Position is always on the grid.
//! - Capacities never change after construction.

use std::collections::VecDeque;

use oilsim_types::{BoatEvent, BoatId, BoatStatus, GridPos, Heading, PORT};
use serde::{Deserialize, Serialize};

use crate::oil::OilCell;

/// Resources consumed by a single grid step.
const STEP_COST: u32 = 1;

/// Cargo taken on by collecting one oil cell.
const CELL_LOAD: u32 = 1;

/// Default cargo hold size.
pub const DEFAULT_LOAD_CAPACITY: u32 = 100;

/// Default battery size, in grid steps.
pub const DEFAULT_BATTERY_CAPACITY: u32 = 500;

/// Fixed resource capacities of a boat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoatCaps {
    /// Oil cells the hold can carry before unloading.
    pub load_capacity: u32,
    /// Grid steps the battery lasts before recharging.
    pub battery_capacity: u32,
}

impl Default for BoatCaps {
    fn default() -> Self {
        Self {
            load_capacity: DEFAULT_LOAD_CAPACITY,
            battery_capacity: DEFAULT_BATTERY_CAPACITY,
        }
    }
}

/// What a call to [`Boat::move_to`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Already at the target; the boat stopped.
    Arrived,
    /// Battery exhausted; the boat recharged in place.
    Charged,
    /// The boat advanced one step.
    Stepped,
}

/// What a call to [`Boat::clean`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOutcome {
    /// No oil left to clean.
    Idle,
    /// Hold full; the boat unloaded in place.
    Unloaded,
    /// Battery exhausted; the boat recharged in place.
    Charged,
    /// The boat is still on its way to the target cell.
    Travelling,
    /// The boat reached the target cell and removed it from the queue.
    Collected(OilCell),
}

/// An autonomous cleanup boat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boat {
    id: BoatId,
    name: String,
    status: BoatStatus,
    pos: GridPos,
    heading: Heading,
    caps: BoatCaps,
    load_used: u32,
    battery_used: u32,
}

impl Boat {
    /// Launch a new boat at `pos` with empty hold and full battery.
    pub fn new(id: BoatId, pos: GridPos, caps: BoatCaps) -> Self {
        Self {
            id,
            name: id.display_name(),
            status: BoatStatus::Stopped,
            pos: GridPos::clamped(pos.x, pos.y),
            heading: Heading::DEFAULT,
            caps,
            load_used: 0,
            battery_used: 0,
        }
    }

    /// Launch a new boat at the port.
    pub fn at_port(id: BoatId, caps: BoatCaps) -> Self {
        Self::new(id, PORT, caps)
    }

    /// Unique identifier.
    pub const fn id(&self) -> BoatId {
        self.id
    }

    /// Display name (`Boat_b<n>`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current operating mode.
    pub const fn status(&self) -> BoatStatus {
        self.status
    }

    /// Current position.
    pub const fn pos(&self) -> GridPos {
        self.pos
    }

    /// Heading from the most recent step.
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    /// Resource capacities.
    pub const fn caps(&self) -> BoatCaps {
        self.caps
    }

    /// Cargo currently carried.
    pub const fn load_used(&self) -> u32 {
        self.load_used
    }

    /// Battery spent since the last recharge.
    pub const fn battery_used(&self) -> u32 {
        self.battery_used
    }

    /// Set cargo usage, clamped into `[0, load_capacity]`.
    pub fn set_load_used(&mut self, load_used: u32) {
        self.load_used = load_used.min(self.caps.load_capacity);
    }

    /// Set battery usage, clamped into `[0, battery_capacity]`.
    pub fn set_battery_used(&mut self, battery_used: u32) {
        self.battery_used = battery_used.min(self.caps.battery_capacity);
    }

    const fn has_battery_for(&self, cost: u32) -> bool {
        self.caps.battery_capacity.saturating_sub(self.battery_used) >= cost
    }

    const fn has_room_for(&self, load: u32) -> bool {
        self.caps.load_capacity.saturating_sub(self.load_used) >= load
    }

    fn transition(&mut self, event: BoatEvent) {
        self.status = self.status.next(event);
    }

    /// Move one step toward `target`.
    ///
    /// Stops if already there; recharges instead of moving if the battery
    /// cannot cover one more step. Otherwise each axis advances by at most
    /// one unit, so differing axes produce a diagonal step.
    pub fn move_to(&mut self, target: GridPos) -> MoveOutcome {
        let target = GridPos::clamped(target.x, target.y);
        if self.pos == target {
            self.transition(BoatEvent::Arrived);
            return MoveOutcome::Arrived;
        }

        if !self.has_battery_for(STEP_COST) {
            self.transition(BoatEvent::BatteryDepleted);
            self.set_battery_used(0);
            return MoveOutcome::Charged;
        }

        self.transition(BoatEvent::Departed);

        let dx = target.x.saturating_sub(self.pos.x);
        let dy = target.y.saturating_sub(self.pos.y);
        if let Some(heading) = Heading::from_delta(dx, dy) {
            self.heading = heading;
        }
        self.pos = self.pos.offset(dx.signum(), dy.signum());
        self.set_battery_used(self.battery_used.saturating_add(STEP_COST));
        MoveOutcome::Stepped
    }

    /// Work on the oldest cell in `queue`.
    ///
    /// Unloads instead if the hold is full. Otherwise steps toward the
    /// front cell and, once on it, removes it from the queue and takes on
    /// one unit of cargo. Never adds to the queue.
    pub fn clean(&mut self, queue: &mut VecDeque<OilCell>) -> CleanOutcome {
        let Some(target) = queue.front().map(OilCell::pos) else {
            return CleanOutcome::Idle;
        };

        if !self.has_room_for(CELL_LOAD) {
            self.transition(BoatEvent::HoldFull);
            self.set_load_used(0);
            return CleanOutcome::Unloaded;
        }

        let moved = self.move_to(target);

        if self.pos == target {
            if let Some(cell) = queue.pop_front() {
                self.set_load_used(self.load_used.saturating_add(CELL_LOAD));
                return CleanOutcome::Collected(cell);
            }
        }

        match moved {
            MoveOutcome::Charged => CleanOutcome::Charged,
            MoveOutcome::Arrived | MoveOutcome::Stepped => CleanOutcome::Travelling,
        }
    }

    /// Halt the boat where it is.
    pub fn force_stop(&mut self) {
        self.transition(BoatEvent::Halted);
    }

    /// Relaunch from `pos` with fresh resources and the default heading.
    pub fn restart(&mut self, pos: GridPos) {
        self.pos = GridPos::clamped(pos.x, pos.y);
        self.heading = Heading::DEFAULT;
        self.set_battery_used(0);
        self.set_load_used(0);
        self.transition(BoatEvent::Departed);
    }
}

impl core::fmt::Display for Boat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{:>9}] {:>8}{}, heading={:>3}, load(usg/cap)={:>3}/{:>3}, battery(usg/cap)={:>3}/{:>3}",
            self.status,
            self.name,
            self.pos,
            self.heading.degrees(),
            self.load_used,
            self.caps.load_capacity,
            self.battery_used,
            self.caps.battery_capacity,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use oilsim_types::MAX_GRID;

    use super::*;

    fn boat_at(x: i32, y: i32) -> Boat {
        Boat::new(BoatId::FIRST, GridPos::new(x, y), BoatCaps::default())
    }

    fn queue_of(cells: &[(i32, i32)]) -> VecDeque<OilCell> {
        cells
            .iter()
            .map(|&(x, y)| OilCell::spill(GridPos::new(x, y)))
            .collect()
    }

    #[test]
    fn new_boat_is_stopped_at_port() {
        let boat = Boat::at_port(BoatId(3), BoatCaps::default());
        assert_eq!(boat.pos(), GridPos::new(MAX_GRID, MAX_GRID));
        assert_eq!(boat.status(), BoatStatus::Stopped);
        assert_eq!(boat.name(), "Boat_b3");
        assert_eq!(boat.load_used(), 0);
        assert_eq!(boat.battery_used(), 0);
    }

    #[test]
    fn diagonal_walk_to_target() {
        let mut boat = boat_at(0, 0);
        for step in 1..=3 {
            assert_eq!(boat.move_to(GridPos::new(3, 3)), MoveOutcome::Stepped);
            assert_eq!(boat.pos(), GridPos::new(step, step));
            assert_eq!(boat.heading(), Heading::SouthEast);
            assert_eq!(boat.status(), BoatStatus::Moving);
        }
        assert_eq!(boat.battery_used(), 3);
    }

    #[test]
    fn axes_advance_independently() {
        let mut boat = boat_at(10, 10);
        boat.move_to(GridPos::new(12, 10));
        assert_eq!(boat.pos(), GridPos::new(11, 10));
        assert_eq!(boat.heading(), Heading::East);

        boat.move_to(GridPos::new(11, 4));
        assert_eq!(boat.pos(), GridPos::new(11, 9));
        assert_eq!(boat.heading(), Heading::North);
    }

    #[test]
    fn move_to_is_idempotent_at_target() {
        let mut boat = boat_at(5, 5);
        boat.move_to(GridPos::new(6, 6));
        let heading = boat.heading();
        for _ in 0..5 {
            assert_eq!(boat.move_to(GridPos::new(6, 6)), MoveOutcome::Arrived);
            assert_eq!(boat.status(), BoatStatus::Stopped);
            assert_eq!(boat.pos(), GridPos::new(6, 6));
            assert_eq!(boat.heading(), heading);
        }
        assert_eq!(boat.battery_used(), 1);
    }

    #[test]
    fn exact_battery_then_charge() {
        let mut boat = boat_at(0, 0);
        boat.set_battery_used(499);

        assert_eq!(boat.move_to(GridPos::new(50, 50)), MoveOutcome::Stepped);
        assert_eq!(boat.battery_used(), 500);
        assert_eq!(boat.pos(), GridPos::new(1, 1));

        assert_eq!(boat.move_to(GridPos::new(50, 50)), MoveOutcome::Charged);
        assert_eq!(boat.status(), BoatStatus::Charging);
        assert_eq!(boat.battery_used(), 0);
        assert_eq!(boat.pos(), GridPos::new(1, 1));

        assert_eq!(boat.move_to(GridPos::new(50, 50)), MoveOutcome::Stepped);
        assert_eq!(boat.status(), BoatStatus::Moving);
    }

    #[test]
    fn usage_setters_clamp() {
        let mut boat = boat_at(0, 0);
        boat.set_battery_used(9_999);
        boat.set_load_used(9_999);
        assert_eq!(boat.battery_used(), DEFAULT_BATTERY_CAPACITY);
        assert_eq!(boat.load_used(), DEFAULT_LOAD_CAPACITY);
    }

    #[test]
    fn clean_on_empty_queue_is_noop() {
        let mut boat = boat_at(4, 4);
        let mut queue = VecDeque::new();
        assert_eq!(boat.clean(&mut queue), CleanOutcome::Idle);
        assert_eq!(boat.status(), BoatStatus::Stopped);
        assert_eq!(boat.battery_used(), 0);
    }

    #[test]
    fn clean_collects_exactly_one_cell() {
        let mut boat = boat_at(0, 0);
        let mut queue = queue_of(&[(1, 1), (1, 1), (9, 9)]);

        let outcome = boat.clean(&mut queue);
        assert!(matches!(outcome, CleanOutcome::Collected(cell) if cell.pos() == GridPos::new(1, 1)));
        assert_eq!(queue.len(), 2);
        assert_eq!(boat.load_used(), 1);

        // Standing on the next duplicate cell: stops and collects it too.
        let outcome = boat.clean(&mut queue);
        assert!(matches!(outcome, CleanOutcome::Collected(_)));
        assert_eq!(boat.status(), BoatStatus::Stopped);
        assert_eq!(queue.len(), 1);
        assert_eq!(boat.load_used(), 2);

        assert_eq!(boat.clean(&mut queue), CleanOutcome::Travelling);
        assert_eq!(queue.len(), 1);
        assert_eq!(boat.load_used(), 2);
    }

    #[test]
    fn full_hold_unloads_in_place() {
        let mut boat = boat_at(0, 0);
        boat.set_load_used(DEFAULT_LOAD_CAPACITY);
        let mut queue = queue_of(&[(0, 0)]);

        assert_eq!(boat.clean(&mut queue), CleanOutcome::Unloaded);
        assert_eq!(boat.status(), BoatStatus::Unloading);
        assert_eq!(boat.load_used(), 0);
        assert_eq!(queue.len(), 1);

        assert!(matches!(boat.clean(&mut queue), CleanOutcome::Collected(_)));
        assert!(queue.is_empty());
    }

    #[test]
    fn clean_reports_charging() {
        let mut boat = boat_at(0, 0);
        boat.set_battery_used(DEFAULT_BATTERY_CAPACITY);
        let mut queue = queue_of(&[(5, 5)]);
        assert_eq!(boat.clean(&mut queue), CleanOutcome::Charged);
        assert_eq!(boat.battery_used(), 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn force_stop_and_restart() {
        let mut boat = boat_at(20, 20);
        boat.move_to(GridPos::new(30, 10));
        boat.set_load_used(40);
        boat.force_stop();
        assert_eq!(boat.status(), BoatStatus::Stopped);
        assert_eq!(boat.pos(), GridPos::new(21, 19));

        boat.restart(GridPos::new(200, -5));
        assert_eq!(boat.pos(), GridPos::new(MAX_GRID, 0));
        assert_eq!(boat.heading(), Heading::West);
        assert_eq!(boat.status(), BoatStatus::Moving);
        assert_eq!(boat.load_used(), 0);
        assert_eq!(boat.battery_used(), 0);
    }

    #[test]
    fn display_line() {
        let boat = Boat::at_port(BoatId(1), BoatCaps::default());
        let line = boat.to_string();
        assert!(line.contains("Boat_b1"));
        assert!(line.contains("STOP"));
        assert!(line.contains("battery(usg/cap)=  0/500"));
    }
}
