//! Headless runner for the oil-spill cleanup simulation.
//!
//! Loads configuration, builds the engine for the configured scenario,
//! and runs it under the lifecycle controller until the oil is gone or
//! the process receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `oilsim-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the engine and the lifecycle controller
//! 4. Attach the logging observer
//! 5. Start the run and wait for it to stop
//! 6. Log the result

mod error;
mod log_observer;

use std::path::Path;

use oilsim_core::config::{LogFormat, LoggingConfig, SimulationConfig};
use oilsim_core::controller::LifecycleController;
use oilsim_core::engine::SimulationEngine;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_observer::LogObserver;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "oilsim-config.yaml";

/// Ticks between progress lines at `info`.
const PROGRESS_EVERY: u64 = 100;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or no runtime is
/// available for the tick loop.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging needs its level, so a failure is
    //    reported after the subscriber is up.
    let loaded = load_config();
    let logging = loaded
        .as_ref()
        .map_or_else(|_| LoggingConfig::default(), |config| config.logging.clone());

    // 2. Initialize structured logging.
    init_logging(&logging);
    info!("oilsim-engine starting");

    let config = loaded?;
    info!(
        profile = %config.simulation.profile,
        tick_delay_ms = config.simulation.tick_delay_ms,
        seed = ?config.simulation.seed,
        initial_wind = %config.simulation.initial_wind,
        "Configuration loaded"
    );

    // 3. Build the engine and controller.
    let engine = SimulationEngine::from_config(&config);
    let controller = LifecycleController::new(engine, config.simulation.tick_delay_ms)?;

    // 4. Attach observers.
    controller.add_observer(LogObserver::new(PROGRESS_EVERY));

    // 5. Run until the scenario completes or we are interrupted.
    let interrupt = tokio::spawn(stop_on_interrupt(controller.clone()));
    controller.start_sim();
    controller.wait_until_stopped().await;
    interrupt.abort();

    // 6. Log results.
    let status = controller.status();
    info!(
        ticks = status.ticks,
        oil_remaining = controller.with_state(|engine| engine.oil_cells().len()),
        "oilsim-engine shutdown complete"
    );

    Ok(())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the simulation configuration from [`CONFIG_FILE`].
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok(config)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}

/// Stop the run on Ctrl-C.
async fn stop_on_interrupt(controller: LifecycleController<SimulationEngine>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Interrupt received, stopping simulation");
            controller.stop_sim();
        }
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl-C, interrupt handling disabled");
        }
    }
}
