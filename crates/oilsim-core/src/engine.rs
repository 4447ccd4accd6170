//! The tick orchestrator.
//!
//! [`SimulationEngine`] owns every boat and the oil queue and advances them
//! one tick at a time. Each tick runs these steps in a fixed order:
//!
//! 1. **Exhaustion check** -- an empty oil queue ends the scenario; nothing
//!    else runs.
//! 2. **Auto-spawn gate** -- launch one boat from the port.
//! 3. **Darken gate** -- darken every surviving cell.
//! 4. **Diffusion gate** -- extend the slick one step downwind.
//! 5. **Rotation gate** -- draw a new wind uniformly from all five values.
//! 6. **Cleaning pass** -- every boat, in launch order, works on the
//!    shared queue.
//!
//! The cleaning pass is strictly sequential: boats contend for the same
//! front cell, and each removal is visible to the next boat.
//!
//! Administrative commands bypass the gates and take effect immediately.
//! The engine itself is single-threaded; the lifecycle controller
//! serialises access from other threads.

use oilsim_types::{BoatId, Wind};
use oilsim_world::diffusion::{self, OilQueue};
use oilsim_world::{Boat, BoatCaps, CleanOutcome, OilCell};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::controller::{Simulation, TickOutcome};
use crate::gate::RateGate;
use crate::profile::{InitialPopulation, RateThresholds, ScenarioProfile};

/// Engine construction parameters that are not part of a scenario profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// Capacities given to every boat.
    pub caps: BoatCaps,
    /// Wind when the engine is created.
    pub initial_wind: Wind,
    /// Seed for reproducible runs (`None` = seeded from the OS).
    pub seed: Option<u64>,
}

/// Administrative command applied outside the rate gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminCommand {
    /// Launch one boat from the port.
    AddBoat,
    /// Remove every boat.
    ClearBoats,
    /// Spill one oil cell (random if none exist, else next to the newest).
    AddOilCell,
    /// Remove every oil cell.
    ClearOilCells,
    /// Set the wind directly.
    SetWind(Wind),
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed (1-based within the run).
    pub tick: u64,
    /// Boats launched by the auto-spawn gate.
    pub boats_spawned: u32,
    /// Cells darkened by the darken gate.
    pub cells_darkened: usize,
    /// Cells added by wind diffusion.
    pub cells_diffused: usize,
    /// New wind drawn by the rotation gate, if it fired.
    pub wind_rotated: Option<Wind>,
    /// Cells removed by boats during the cleaning pass.
    pub cells_cleaned: usize,
    /// Cells left in the queue at the end of the tick.
    pub oil_remaining: usize,
}

/// The four rate gates, one per periodic effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Gates {
    spawn: RateGate,
    darken: RateGate,
    diffuse: RateGate,
    rotate: RateGate,
}

impl Gates {
    const fn from_rates(rates: RateThresholds) -> Self {
        Self {
            spawn: RateGate::every(rates.spawn_every),
            darken: RateGate::every(rates.darken_every),
            diffuse: RateGate::every(rates.diffuse_every),
            rotate: RateGate::every(rates.rotate_every),
        }
    }

    const fn thresholds(&self) -> RateThresholds {
        RateThresholds {
            spawn_every: self.spawn.threshold(),
            darken_every: self.darken.threshold(),
            diffuse_every: self.diffuse.threshold(),
            rotate_every: self.rotate.threshold(),
        }
    }

    const fn reset(&mut self) {
        self.spawn.reset();
        self.darken.reset();
        self.diffuse.reset();
        self.rotate.reset();
    }
}

/// Boats, oil, and wind, advanced one tick at a time.
#[derive(Debug)]
pub struct SimulationEngine {
    profile: ScenarioProfile,
    caps: BoatCaps,
    boats: Vec<Boat>,
    oil: OilQueue,
    wind: Wind,
    gates: Gates,
    next_boat_id: BoatId,
    tick: u64,
    rng: SmallRng,
}

impl SimulationEngine {
    /// Create an engine for `profile`. The grid starts empty; call
    /// [`Simulation::begin_run`] to place the profile's population.
    pub fn new(profile: ScenarioProfile, settings: EngineSettings) -> Self {
        let rng = settings
            .seed
            .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        Self {
            profile,
            caps: settings.caps,
            boats: Vec::new(),
            oil: OilQueue::new(),
            wind: settings.initial_wind,
            gates: Gates::from_rates(profile.rates),
            next_boat_id: BoatId::FIRST,
            tick: 0,
            rng,
        }
    }

    /// Create an engine from a loaded configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.profile(), config.engine_settings())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Boats in launch order.
    pub fn boats(&self) -> &[Boat] {
        &self.boats
    }

    /// Oil cells, oldest first.
    pub const fn oil_cells(&self) -> &OilQueue {
        &self.oil
    }

    /// Current wind.
    pub const fn wind(&self) -> Wind {
        self.wind
    }

    /// The scenario profile in use.
    pub const fn profile(&self) -> &ScenarioProfile {
        &self.profile
    }

    /// Current gate thresholds.
    pub const fn rates(&self) -> RateThresholds {
        self.gates.thresholds()
    }

    /// Ticks executed in the current run.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Whether any oil is left.
    pub fn has_oil(&self) -> bool {
        !self.oil.is_empty()
    }

    // -----------------------------------------------------------------------
    // Administrative operations
    // -----------------------------------------------------------------------

    /// Launch one boat from the port. Returns its identifier.
    pub fn add_boat(&mut self) -> BoatId {
        let id = self.next_boat_id;
        self.next_boat_id = id.next();
        self.boats.push(Boat::at_port(id, self.caps));
        id
    }

    /// Remove every boat. Returns how many were removed.
    pub fn clear_boats(&mut self) -> usize {
        let removed = self.boats.len();
        self.boats.clear();
        removed
    }

    /// Spill one oil cell. Returns the new cell.
    pub fn add_oil_cell(&mut self) -> OilCell {
        diffusion::add_cell(&mut self.oil, &mut self.rng)
    }

    /// Remove every oil cell. Returns how many were removed.
    pub fn clear_oil(&mut self) -> usize {
        let removed = self.oil.len();
        self.oil.clear();
        removed
    }

    /// Set the wind directly.
    pub const fn set_wind(&mut self, wind: Wind) {
        self.wind = wind;
    }

    /// Halt every boat in place.
    pub fn force_stop_boats(&mut self) {
        self.boats.iter_mut().for_each(Boat::force_stop);
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Execute one tick. Returns [`TickOutcome::Complete`] without touching
    /// anything when no oil is left.
    pub fn step(&mut self) -> TickOutcome<TickSummary> {
        if self.oil.is_empty() {
            debug!(tick = self.tick, "No oil left, scenario complete");
            return TickOutcome::Complete;
        }

        self.tick = self.tick.saturating_add(1);
        let mut summary = TickSummary {
            tick: self.tick,
            ..TickSummary::default()
        };

        if self.gates.spawn.advance() {
            let id = self.add_boat();
            summary.boats_spawned = 1;
            debug!(tick = self.tick, boat = %id, "Boat launched from port");
        }

        if self.gates.darken.advance() {
            summary.cells_darkened = diffusion::darken_all(&mut self.oil);
        }

        if self.gates.diffuse.advance() {
            let front = diffusion::wind_front(&self.oil, self.wind);
            summary.cells_diffused = front.len();
            self.oil.extend(front);
        }

        if self.gates.rotate.advance() {
            let pick = self.rng.random_range(0..Wind::ALL.len());
            self.wind = Wind::ALL.get(pick).copied().unwrap_or(self.wind);
            summary.wind_rotated = Some(self.wind);
            debug!(tick = self.tick, wind = %self.wind, "Wind rotated");
        }

        for boat in &mut self.boats {
            if let CleanOutcome::Collected(cell) = boat.clean(&mut self.oil) {
                summary.cells_cleaned = summary.cells_cleaned.saturating_add(1);
                debug!(tick = self.tick, boat = %boat.id(), x = cell.x(), y = cell.y(), "Oil cell cleaned");
            }
        }

        summary.oil_remaining = self.oil.len();
        TickOutcome::Advanced(summary)
    }

    fn seed_population(&mut self) {
        let InitialPopulation::Fresh { boats, oil_cells } = self.profile.population else {
            return;
        };
        self.clear_boats();
        for _ in 0..boats {
            self.add_boat();
        }
        self.clear_oil();
        for _ in 0..oil_cells {
            self.add_oil_cell();
        }
    }
}

impl Simulation for SimulationEngine {
    type Summary = TickSummary;
    type Command = AdminCommand;

    fn begin_run(&mut self) {
        self.gates.reset();
        self.tick = 0;
        self.seed_population();
        info!(
            profile = %self.profile.kind,
            boats = self.boats.len(),
            oil_cells = self.oil.len(),
            wind = %self.wind,
            "Run initialised"
        );
    }

    fn tick(&mut self) -> TickOutcome<TickSummary> {
        self.step()
    }

    fn halt(&mut self) {
        self.force_stop_boats();
    }

    fn apply(&mut self, command: &AdminCommand) {
        match *command {
            AdminCommand::AddBoat => {
                let id = self.add_boat();
                debug!(boat = %id, "Boat added");
            }
            AdminCommand::ClearBoats => {
                let removed = self.clear_boats();
                debug!(removed, "Boats cleared");
            }
            AdminCommand::AddOilCell => {
                let cell = self.add_oil_cell();
                debug!(x = cell.x(), y = cell.y(), "Oil cell added");
            }
            AdminCommand::ClearOilCells => {
                let removed = self.clear_oil();
                debug!(removed, "Oil cleared");
            }
            AdminCommand::SetWind(wind) => {
                self.set_wind(wind);
                debug!(%wind, "Wind set");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use oilsim_types::{BoatStatus, PORT};

    use super::*;
    use crate::profile::ScenarioKind;

    fn seeded(kind: ScenarioKind) -> SimulationEngine {
        SimulationEngine::new(
            kind.profile(),
            EngineSettings {
                seed: Some(7),
                ..EngineSettings::default()
            },
        )
    }

    fn with_rates(rates: RateThresholds) -> SimulationEngine {
        let profile = ScenarioProfile {
            kind: ScenarioKind::Manual,
            rates,
            population: InitialPopulation::Retained,
        };
        SimulationEngine::new(
            profile,
            EngineSettings {
                seed: Some(1),
                ..EngineSettings::default()
            },
        )
    }

    const QUIET: RateThresholds = RateThresholds {
        spawn_every: 0,
        darken_every: 0,
        diffuse_every: 0,
        rotate_every: 0,
    };

    #[test]
    fn fresh_profile_seeds_one_boat_and_thirty_cells() {
        let mut engine = seeded(ScenarioKind::SingleBoat);
        engine.begin_run();

        assert_eq!(engine.boats().len(), 1);
        assert_eq!(engine.oil_cells().len(), 30);
        let boat = engine.boats().first().unwrap();
        assert_eq!(boat.pos(), PORT);
        assert_eq!(boat.id(), BoatId::FIRST);
    }

    #[test]
    fn fresh_profile_replaces_existing_population() {
        let mut engine = seeded(ScenarioKind::AutoSpawn);
        engine.add_boat();
        engine.add_boat();
        engine.begin_run();

        assert_eq!(engine.boats().len(), 1);
        assert_eq!(engine.oil_cells().len(), 30);
    }

    #[test]
    fn manual_profile_keeps_existing_population() {
        let mut engine = seeded(ScenarioKind::Manual);
        engine.add_boat();
        engine.add_oil_cell();
        engine.add_oil_cell();
        engine.begin_run();

        assert_eq!(engine.boats().len(), 1);
        assert_eq!(engine.oil_cells().len(), 2);
    }

    #[test]
    fn empty_queue_completes_without_side_effects() {
        let mut engine = with_rates(RateThresholds {
            spawn_every: 1,
            ..QUIET
        });
        engine.add_boat();

        assert_eq!(engine.step(), TickOutcome::Complete);
        assert_eq!(engine.boats().len(), 1);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn spawn_gate_at_one_launches_every_tick() {
        let mut engine = with_rates(RateThresholds {
            spawn_every: 1,
            ..QUIET
        });
        engine.add_oil_cell();

        for _ in 0..3 {
            let TickOutcome::Advanced(summary) = engine.step() else {
                panic!("oil should remain");
            };
            assert_eq!(summary.boats_spawned, 1);
        }
        assert_eq!(engine.boats().len(), 3);
    }

    #[test]
    fn disabled_gates_never_fire() {
        let mut engine = with_rates(QUIET);
        engine.add_oil_cell();
        let before = *engine.oil_cells().front().unwrap();

        for _ in 0..100 {
            assert!(matches!(engine.step(), TickOutcome::Advanced(_)));
        }
        assert!(engine.boats().is_empty());
        assert_eq!(engine.oil_cells().len(), 1);
        assert_eq!(*engine.oil_cells().front().unwrap(), before);
        assert_eq!(engine.wind(), Wind::West);
    }

    #[test]
    fn darken_gate_darkens_on_threshold() {
        let mut engine = with_rates(RateThresholds {
            darken_every: 2,
            ..QUIET
        });
        engine.add_oil_cell();
        let original = engine.oil_cells().front().unwrap().color();

        let _ = engine.step();
        assert_eq!(engine.oil_cells().front().unwrap().color(), original);
        let _ = engine.step();
        assert_eq!(
            engine.oil_cells().front().unwrap().color(),
            original.darker()
        );
    }

    #[test]
    fn diffusion_only_adds_cells() {
        let mut engine = with_rates(RateThresholds {
            diffuse_every: 1,
            ..QUIET
        });
        for _ in 0..5 {
            engine.add_oil_cell();
        }
        let before: Vec<OilCell> = engine.oil_cells().iter().copied().collect();

        let TickOutcome::Advanced(summary) = engine.step() else {
            panic!("oil should remain");
        };
        assert!(summary.cells_diffused > 0);
        assert_eq!(
            engine.oil_cells().len(),
            before.len().saturating_add(summary.cells_diffused)
        );
        assert!(engine.oil_cells().iter().zip(&before).all(|(a, b)| a == b));
    }

    #[test]
    fn rotation_picks_from_all_winds() {
        let mut engine = with_rates(RateThresholds {
            rotate_every: 1,
            ..QUIET
        });
        engine.add_oil_cell();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            if let TickOutcome::Advanced(summary) = engine.step() {
                seen.extend(summary.wind_rotated);
            }
        }
        assert_eq!(seen.len(), Wind::ALL.len());
    }

    #[test]
    fn boat_cleans_single_cell_until_complete() {
        let mut engine = with_rates(QUIET);
        engine.add_boat();
        engine.add_oil_cell();

        let mut ticks = 0_u32;
        while let TickOutcome::Advanced(_) = engine.step() {
            ticks = ticks.saturating_add(1);
            assert!(ticks <= 200, "boat never reached the cell");
        }
        assert!(!engine.has_oil());
        assert_eq!(engine.boats().first().unwrap().load_used(), 1);
    }

    #[test]
    fn boats_share_the_front_cell() {
        let mut engine = with_rates(QUIET);
        engine.add_boat();
        engine.add_boat();
        engine.add_oil_cell();

        while engine.step() != TickOutcome::Complete {}

        let loads: u32 = engine.boats().iter().map(Boat::load_used).sum();
        assert_eq!(loads, 1);
    }

    #[test]
    fn same_seed_gives_same_run() {
        let run = || {
            let mut engine = seeded(ScenarioKind::SingleBoat);
            engine.begin_run();
            let mut summaries = Vec::new();
            for _ in 0..120 {
                match engine.step() {
                    TickOutcome::Advanced(summary) => summaries.push(summary),
                    TickOutcome::Complete => break,
                }
            }
            (summaries, engine.oil_cells().clone())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn begin_run_resets_gates_and_tick() {
        let mut engine = with_rates(RateThresholds {
            spawn_every: 3,
            ..QUIET
        });
        engine.add_oil_cell();
        let _ = engine.step();
        let _ = engine.step();
        engine.begin_run();
        assert_eq!(engine.tick_count(), 0);

        let _ = engine.step();
        let _ = engine.step();
        assert!(engine.boats().is_empty());
    }

    #[test]
    fn admin_commands_apply_immediately() {
        let mut engine = with_rates(QUIET);
        engine.apply(&AdminCommand::AddBoat);
        engine.apply(&AdminCommand::AddOilCell);
        engine.apply(&AdminCommand::SetWind(Wind::North));
        assert_eq!(engine.boats().len(), 1);
        assert_eq!(engine.oil_cells().len(), 1);
        assert_eq!(engine.wind(), Wind::North);

        engine.apply(&AdminCommand::ClearBoats);
        engine.apply(&AdminCommand::ClearOilCells);
        assert!(engine.boats().is_empty());
        assert!(!engine.has_oil());
    }

    #[test]
    fn boat_ids_keep_increasing_after_clear() {
        let mut engine = with_rates(QUIET);
        engine.add_boat();
        engine.clear_boats();
        let id = engine.add_boat();
        assert_eq!(id, BoatId(2));
    }

    #[test]
    fn halt_stops_every_boat() {
        let mut engine = with_rates(QUIET);
        engine.add_boat();
        engine.add_oil_cell();
        let _ = engine.step();
        engine.halt();
        assert!(
            engine
                .boats()
                .iter()
                .all(|boat| boat.status() == BoatStatus::Stopped)
        );
    }
}
