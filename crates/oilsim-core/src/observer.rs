//! Observer contract for the lifecycle controller.
//!
//! After every tick, lifecycle transition, and administrative command the
//! controller calls each registered [`SimulationObserver`] synchronously,
//! on the calling thread, while it still holds the simulation lock. The
//! [`Update`] it receives borrows the live simulation state, so observers
//! that need data beyond the call must copy it out. [`SnapshotBroadcaster`]
//! does exactly that and publishes owned [`SimulationSnapshot`]s on a
//! `tokio::sync::broadcast` channel for consumers on other threads.
//!
//! Observers must not block and must not call back into the controller.

use oilsim_types::Wind;
use oilsim_world::{Boat, OilCell};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::controller::{RunStatus, Simulation, StopReason};
use crate::engine::{AdminCommand, SimulationEngine};
use crate::profile::{RateThresholds, ScenarioKind};

/// Capacity of the snapshot broadcast channel.
///
/// A subscriber that falls behind by more than this many snapshots
/// receives [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const BROADCAST_CAPACITY: usize = 256;

/// What happened to trigger an observer notification.
#[derive(Debug)]
pub enum ControlEvent<'a, S: Simulation> {
    /// A run began.
    Started,
    /// The background loop or a manual step executed one tick.
    Ticked {
        /// Ticks executed in the current run, including this one.
        tick: u64,
        /// What the tick did.
        summary: &'a S::Summary,
    },
    /// The paused flag changed.
    PauseToggled {
        /// The new value of the flag.
        paused: bool,
    },
    /// The run ended.
    Stopped {
        /// Why it ended.
        reason: StopReason,
    },
    /// An administrative command was applied.
    Applied(&'a S::Command),
}

/// A notification delivered to observers.
#[derive(Debug)]
pub struct Update<'a, S: Simulation> {
    /// The triggering event.
    pub event: ControlEvent<'a, S>,
    /// The full simulation state after the event.
    pub state: &'a S,
    /// Controller flags after the event.
    pub status: RunStatus,
}

/// Receives a push notification after every state change.
pub trait SimulationObserver<S: Simulation>: Send {
    /// Called synchronously with the simulation lock held.
    fn on_update(&mut self, update: &Update<'_, S>);
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Owned form of [`ControlEvent`] for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotEvent {
    /// A run began.
    Started,
    /// One tick executed.
    Ticked {
        /// Ticks executed in the current run.
        tick: u64,
    },
    /// The paused flag changed.
    PauseToggled {
        /// The new value of the flag.
        paused: bool,
    },
    /// The run ended.
    Stopped {
        /// Why it ended.
        reason: StopReason,
    },
    /// An administrative command was applied.
    Applied {
        /// The command.
        command: AdminCommand,
    },
}

impl From<&ControlEvent<'_, SimulationEngine>> for SnapshotEvent {
    fn from(event: &ControlEvent<'_, SimulationEngine>) -> Self {
        match *event {
            ControlEvent::Started => Self::Started,
            ControlEvent::Ticked { tick, .. } => Self::Ticked { tick },
            ControlEvent::PauseToggled { paused } => Self::PauseToggled { paused },
            ControlEvent::Stopped { reason } => Self::Stopped { reason },
            ControlEvent::Applied(command) => Self::Applied { command: *command },
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSnapshot {
    /// What triggered this snapshot.
    pub event: SnapshotEvent,
    /// Controller flags.
    pub status: RunStatus,
    /// Active scenario.
    pub profile: ScenarioKind,
    /// Gate thresholds in use.
    pub rates: RateThresholds,
    /// Current wind.
    pub wind: Wind,
    /// Boats in launch order.
    pub boats: Vec<Boat>,
    /// Oil cells, oldest first.
    pub oil: Vec<OilCell>,
}

impl SimulationSnapshot {
    /// Copy the state referenced by `update`.
    pub fn capture(update: &Update<'_, SimulationEngine>) -> Self {
        let engine = update.state;
        Self {
            event: SnapshotEvent::from(&update.event),
            status: update.status,
            profile: engine.profile().kind,
            rates: engine.rates(),
            wind: engine.wind(),
            boats: engine.boats().to_vec(),
            oil: engine.oil_cells().iter().copied().collect(),
        }
    }
}

/// Observer that publishes a [`SimulationSnapshot`] for every update.
#[derive(Debug, Clone)]
pub struct SnapshotBroadcaster {
    tx: broadcast::Sender<SimulationSnapshot>,
}

impl SnapshotBroadcaster {
    /// Create a broadcaster with [`BROADCAST_CAPACITY`] slots.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<SimulationSnapshot> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SnapshotBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationObserver<SimulationEngine> for SnapshotBroadcaster {
    fn on_update(&mut self, update: &Update<'_, SimulationEngine>) {
        if self.tx.receiver_count() == 0 {
            return;
        }
        let snapshot = SimulationSnapshot::capture(update);
        // send only fails when every receiver has been dropped since the check.
        let receivers = self.tx.send(snapshot).unwrap_or(0);
        trace!(receivers, event = ?SnapshotEvent::from(&update.event), "Snapshot broadcast");
    }
}
