//! Run/pause/stop lifecycle around any tickable simulation.
//!
//! [`LifecycleController`] owns a [`Simulation`] behind a mutex and drives
//! it from a background tokio task: tick unless paused, then wait the
//! configured delay. The wait is cancellable, so stop and pause take effect
//! without sitting out the rest of the interval.
//!
//! # Concurrency
//!
//! - The simulation and its observers share one [`std::sync::Mutex`]. It is
//!   held for exactly one tick or one command plus the observer
//!   notifications that follow, and never across an `.await`.
//! - Phase and paused flags are atomics written only while that lock is
//!   held, so queries never block.
//! - Every start bumps a run generation. A loop whose generation is no
//!   longer current exits without ticking, which keeps a restart from
//!   racing the previous run's loop.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use oilsim_types::Wind;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::sync::futures::Notified;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{AdminCommand, SimulationEngine};
use crate::observer::{ControlEvent, SimulationObserver, Update};

/// Default delay between ticks, in milliseconds.
pub const DEFAULT_TICK_DELAY_MS: u64 = 100;

/// Errors raised while constructing a controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// No tokio runtime to spawn the background loop on.
    #[error("no tokio runtime available: {source}")]
    NoRuntime {
        /// The underlying runtime lookup error.
        #[from]
        source: tokio::runtime::TryCurrentError,
    },
}

/// Result of advancing a simulation by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome<T> {
    /// The tick ran; here is what it did.
    Advanced(T),
    /// Nothing is left to do. The controller ends the run.
    Complete,
}

/// A simulation the controller can drive.
pub trait Simulation: Send + 'static {
    /// Per-tick report passed to observers.
    type Summary: core::fmt::Debug + Send;
    /// Administrative command accepted by [`Simulation::apply`].
    type Command: core::fmt::Debug + Send;

    /// Prepare a new run (called on every start).
    fn begin_run(&mut self);

    /// Advance one tick.
    fn tick(&mut self) -> TickOutcome<Self::Summary>;

    /// Bring every moving part to rest (called when a run ends).
    fn halt(&mut self);

    /// Apply an administrative command immediately.
    fn apply(&mut self, command: &Self::Command);
}

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RunPhase {
    /// No run has been started yet.
    NotStarted = 0,
    /// A run is in progress (possibly paused).
    Running = 1,
    /// The last run ended.
    Stopped = 2,
}

impl RunPhase {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopped,
            _ => Self::NotStarted,
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A caller asked for it.
    Requested,
    /// The simulation reported nothing left to do.
    ScenarioComplete,
}

/// Controller flags at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    /// Lifecycle phase.
    pub phase: RunPhase,
    /// Whether ticking is suspended.
    pub paused: bool,
    /// Ticks executed in the current run.
    pub ticks: u64,
    /// Delay between ticks, in milliseconds.
    pub tick_delay_ms: u64,
}

impl RunStatus {
    /// A run is in progress, paused or not.
    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Ticking is suspended.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// The last run ended.
    pub fn is_done(&self) -> bool {
        self.phase == RunPhase::Stopped
    }

    /// No run has been started yet.
    pub fn is_before_starting(&self) -> bool {
        self.phase == RunPhase::NotStarted
    }

    /// Pausing is meaningful: a run is active and not finished.
    pub fn is_pausable(&self) -> bool {
        self.is_running()
    }
}

struct Guarded<S: Simulation> {
    simulation: S,
    observers: Vec<Box<dyn SimulationObserver<S>>>,
}

impl<S: Simulation> Guarded<S> {
    fn notify(&mut self, event: ControlEvent<'_, S>, status: RunStatus) {
        let update = Update {
            event,
            state: &self.simulation,
            status,
        };
        for observer in &mut self.observers {
            observer.on_update(&update);
        }
    }
}

struct Shared<S: Simulation> {
    state: Mutex<Guarded<S>>,
    phase: AtomicU8,
    paused: AtomicBool,
    ticks: AtomicU64,
    tick_delay_ms: AtomicU64,
    generation: AtomicU64,
    wake: Notify,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Simulation> Shared<S> {
    fn lock_state(&self) -> MutexGuard<'_, Guarded<S>> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Simulation lock poisoned by a panicking observer, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn phase(&self) -> RunPhase {
        RunPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: RunPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn status(&self) -> RunStatus {
        RunStatus {
            phase: self.phase(),
            paused: self.paused.load(Ordering::Acquire),
            ticks: self.ticks.load(Ordering::Acquire),
            tick_delay_ms: self.tick_delay_ms.load(Ordering::Acquire),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation && self.phase() == RunPhase::Running
    }

    /// End the run: halt the simulation, mark stopped, wake the loop.
    fn finish(&self, guard: &mut Guarded<S>, reason: StopReason) {
        guard.simulation.halt();
        self.set_phase(RunPhase::Stopped);
        self.wake.notify_waiters();
        info!(?reason, ticks = self.ticks.load(Ordering::Acquire), "Simulation stopped");
        guard.notify(ControlEvent::Stopped { reason }, self.status());
    }

    /// Run one tick under the lock. Returns `false` once nothing is left.
    fn tick_once(&self, guard: &mut Guarded<S>) -> bool {
        match guard.simulation.tick() {
            TickOutcome::Advanced(summary) => {
                let tick = self.ticks.fetch_add(1, Ordering::AcqRel).saturating_add(1);
                debug!(tick, ?summary, "Tick complete");
                let status = self.status();
                guard.notify(ControlEvent::Ticked { tick, summary: &summary }, status);
                true
            }
            TickOutcome::Complete => {
                if self.phase() == RunPhase::Running {
                    self.finish(guard, StopReason::ScenarioComplete);
                }
                false
            }
        }
    }

    /// Sleep for the tick delay, returning early once `woken` fires.
    async fn wait_between_ticks(&self, woken: Pin<&mut Notified<'_>>) {
        let delay = Duration::from_millis(self.tick_delay_ms.load(Ordering::Acquire));
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = woken => {}
        }
    }
}

async fn run_loop<S: Simulation>(shared: Arc<Shared<S>>, generation: u64) {
    let started_at = Utc::now();
    debug!(generation, "Simulation loop started");

    loop {
        // Registered before the flags are read, so a stop or pause toggle
        // from here on cuts the wait short. Wake-ups are never stored.
        let woken = shared.wake.notified();
        tokio::pin!(woken);
        woken.as_mut().enable();

        if !shared.paused.load(Ordering::Acquire) {
            let mut guard = shared.lock_state();
            if !shared.is_current(generation) || !shared.tick_once(&mut guard) {
                break;
            }
        } else if !shared.is_current(generation) {
            break;
        }
        shared.wait_between_ticks(woken).await;
    }

    let duration_ms = Utc::now()
        .signed_duration_since(started_at)
        .num_milliseconds();
    info!(
        generation,
        duration_ms,
        ticks = shared.ticks.load(Ordering::Acquire),
        "Simulation loop finished"
    );
}

/// Drives a [`Simulation`] on a background task.
///
/// Cloning yields another handle to the same controller.
pub struct LifecycleController<S: Simulation> {
    shared: Arc<Shared<S>>,
    runtime: Handle,
}

impl<S: Simulation> Clone for LifecycleController<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S: Simulation> core::fmt::Debug for LifecycleController<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl<S: Simulation> LifecycleController<S> {
    /// Create a controller that spawns its loop on the current tokio runtime.
    pub fn new(simulation: S, tick_delay_ms: u64) -> Result<Self, ControllerError> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(simulation, tick_delay_ms, runtime))
    }

    /// Create a controller that spawns its loop on `runtime`.
    pub fn with_runtime(simulation: S, tick_delay_ms: u64, runtime: Handle) -> Self {
        let shared = Shared {
            state: Mutex::new(Guarded {
                simulation,
                observers: Vec::new(),
            }),
            phase: AtomicU8::new(RunPhase::NotStarted as u8),
            paused: AtomicBool::new(false),
            ticks: AtomicU64::new(0),
            tick_delay_ms: AtomicU64::new(tick_delay_ms),
            generation: AtomicU64::new(0),
            wake: Notify::new(),
            task: Mutex::new(None),
        };
        Self {
            shared: Arc::new(shared),
            runtime,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Begin a run. No-op while one is already running.
    pub fn start(&self) {
        let mut guard = self.shared.lock_state();
        if self.shared.phase() == RunPhase::Running {
            debug!("Start ignored, simulation already running");
            return;
        }

        self.shared.paused.store(false, Ordering::Release);
        self.shared.ticks.store(0, Ordering::Release);
        let generation = self
            .shared
            .generation
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1);

        guard.simulation.begin_run();
        self.shared.set_phase(RunPhase::Running);

        let task = self
            .runtime
            .spawn(run_loop(Arc::clone(&self.shared), generation));
        *self.shared.lock_task() = Some(task);

        info!(
            generation,
            tick_delay_ms = self.tick_delay_ms(),
            "Simulation started"
        );
        guard.notify(ControlEvent::Started, self.shared.status());
    }

    /// Toggle the paused flag.
    pub fn pause(&self) {
        let mut guard = self.shared.lock_state();
        let paused = !self.shared.paused.fetch_xor(true, Ordering::AcqRel);
        self.shared.wake.notify_waiters();
        info!(paused, "Pause toggled");
        guard.notify(ControlEvent::PauseToggled { paused }, self.shared.status());
    }

    /// End the current run and halt the simulation. No-op once stopped.
    pub fn stop(&self) {
        let mut guard = self.shared.lock_state();
        if self.shared.phase() == RunPhase::Stopped {
            debug!("Stop ignored, simulation already stopped");
            return;
        }
        self.shared.finish(&mut guard, StopReason::Requested);
    }

    /// Run exactly one tick on the calling thread.
    ///
    /// Returns `false` if the simulation had nothing left to do. A running
    /// run ends in that case, as it would from the background loop.
    pub fn step(&self) -> bool {
        let mut guard = self.shared.lock_state();
        self.shared.tick_once(&mut guard)
    }

    /// Apply an administrative command immediately.
    pub fn submit(&self, command: &S::Command) {
        let mut guard = self.shared.lock_state();
        guard.simulation.apply(command);
        debug!(?command, "Command applied");
        guard.notify(ControlEvent::Applied(command), self.shared.status());
    }

    /// Change the delay between ticks. Affects subsequent waits only.
    pub fn set_sim_delay(&self, tick_delay_ms: u64) {
        self.shared
            .tick_delay_ms
            .store(tick_delay_ms, Ordering::Release);
    }

    /// Wait for the background loop of the latest run to exit.
    ///
    /// Returns immediately if no run was ever started.
    pub async fn wait_until_stopped(&self) {
        let Some(task) = self.shared.lock_task().take() else {
            return;
        };
        if let Err(e) = task.await {
            warn!(error = %e, "Simulation loop task failed");
        }
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Register an observer for every subsequent update.
    pub fn add_observer<O>(&self, observer: O)
    where
        O: SimulationObserver<S> + 'static,
    {
        self.shared.lock_state().observers.push(Box::new(observer));
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current controller flags.
    pub fn status(&self) -> RunStatus {
        self.shared.status()
    }

    /// Ticking is suspended.
    pub fn is_paused(&self) -> bool {
        self.status().is_paused()
    }

    /// A run is in progress, paused or not.
    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// The last run ended.
    pub fn is_done(&self) -> bool {
        self.status().is_done()
    }

    /// No run has been started yet.
    pub fn is_before_starting(&self) -> bool {
        self.status().is_before_starting()
    }

    /// Pausing is meaningful.
    pub fn is_pausable(&self) -> bool {
        self.status().is_pausable()
    }

    /// Delay between ticks, in milliseconds.
    pub fn tick_delay_ms(&self) -> u64 {
        self.shared.tick_delay_ms.load(Ordering::Acquire)
    }

    /// Read the simulation state under the lock.
    pub fn with_state<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        read(&self.shared.lock_state().simulation)
    }
}

// ---------------------------------------------------------------------------
// Oil-spill administrative surface
// ---------------------------------------------------------------------------

impl LifecycleController<SimulationEngine> {
    /// Begin a run.
    pub fn start_sim(&self) {
        self.start();
    }

    /// End the current run.
    pub fn stop_sim(&self) {
        self.stop();
    }

    /// Toggle pause.
    pub fn pause_sim(&self) {
        self.pause();
    }

    /// Launch one boat from the port.
    pub fn new_boat_sim(&self) {
        self.submit(&AdminCommand::AddBoat);
    }

    /// Remove every boat.
    pub fn clear_boat_sim(&self) {
        self.submit(&AdminCommand::ClearBoats);
    }

    /// Spill one oil cell.
    pub fn new_oil_grid_sim(&self) {
        self.submit(&AdminCommand::AddOilCell);
    }

    /// Remove every oil cell.
    pub fn clear_oil_grid_sim(&self) {
        self.submit(&AdminCommand::ClearOilCells);
    }

    /// Set the wind.
    pub fn change_direction_sim(&self, wind: Wind) {
        self.submit(&AdminCommand::SetWind(wind));
    }
}
