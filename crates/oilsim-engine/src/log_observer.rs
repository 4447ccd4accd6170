//! Observer that turns simulation updates into log lines.
//!
//! Every tick is logged at `debug`; a progress line is logged at `info`
//! every `progress_every` ticks, and the final board is
//! printed boat by boat when the run ends.

use oilsim_core::controller::StopReason;
use oilsim_core::engine::SimulationEngine;
use oilsim_core::observer::{ControlEvent, SimulationObserver, Update};
use tracing::{debug, info};

/// Observer that logs the run's progress.
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    progress_every: u64,
}

impl LogObserver {
    /// Log a progress line every `progress_every` ticks (0 = never).
    pub const fn new(progress_every: u64) -> Self {
        Self { progress_every }
    }

    const fn is_progress_tick(&self, tick: u64) -> bool {
        matches!(tick.checked_rem(self.progress_every), Some(0))
    }

    fn log_board(engine: &SimulationEngine, reason: StopReason) {
        info!(
            ?reason,
            ticks = engine.tick_count(),
            boats = engine.boats().len(),
            oil_remaining = engine.oil_cells().len(),
            "Run ended"
        );
        for boat in engine.boats() {
            info!("{boat}");
        }
    }
}

impl SimulationObserver<SimulationEngine> for LogObserver {
    fn on_update(&mut self, update: &Update<'_, SimulationEngine>) {
        let engine = update.state;
        match update.event {
            ControlEvent::Started => {
                let rates = engine.rates();
                info!(
                    profile = %engine.profile().kind,
                    boats = engine.boats().len(),
                    oil_cells = engine.oil_cells().len(),
                    wind = %engine.wind(),
                    darken_every = rates.darken_every,
                    diffuse_every = rates.diffuse_every,
                    rotate_every = rates.rotate_every,
                    "Run started"
                );
            }
            ControlEvent::Ticked { tick, summary } => {
                debug!(
                    tick,
                    spawned = summary.boats_spawned,
                    darkened = summary.cells_darkened,
                    diffused = summary.cells_diffused,
                    cleaned = summary.cells_cleaned,
                    oil_remaining = summary.oil_remaining,
                    "Tick"
                );
                if self.is_progress_tick(tick) {
                    info!(
                        tick,
                        boats = engine.boats().len(),
                        oil_remaining = summary.oil_remaining,
                        wind = %engine.wind(),
                        "Progress"
                    );
                }
            }
            ControlEvent::PauseToggled { paused } => {
                info!(paused, tick = engine.tick_count(), "Pause toggled");
            }
            ControlEvent::Stopped { reason } => Self::log_board(engine, reason),
            ControlEvent::Applied(command) => {
                info!(
                    ?command,
                    boats = engine.boats().len(),
                    oil_cells = engine.oil_cells().len(),
                    wind = %engine.wind(),
                    "Command applied"
                );
            }
        }
    }
}
