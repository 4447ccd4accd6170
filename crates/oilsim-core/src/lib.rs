//! Tick orchestration and run lifecycle for the oil-spill simulation.
//!
//! This crate turns the grid contents from `oilsim-world` into a running
//! simulation: it decides when each periodic effect fires, seeds each
//! scenario, and runs the tick loop on a background tokio task with
//! start, pause, and stop controls.
//!
//! # Modules
//!
//! - [`gate`] -- [`RateGate`] counter/threshold pairs.
//! - [`profile`] -- The three scenario presets as [`ScenarioProfile`] data.
//! - [`config`] -- Configuration loading from `oilsim-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- [`SimulationEngine`], the per-tick orchestrator.
//! - [`controller`] -- [`LifecycleController`], generic over any
//!   [`Simulation`].
//! - [`observer`] -- Observer contract and the [`SnapshotBroadcaster`].
//!
//! [`RateGate`]: gate::RateGate
//! [`ScenarioProfile`]: profile::ScenarioProfile
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`LifecycleController`]: controller::LifecycleController
//! [`Simulation`]: controller::Simulation
//! [`SnapshotBroadcaster`]: observer::SnapshotBroadcaster

pub mod config;
pub mod controller;
pub mod engine;
pub mod gate;
pub mod observer;
pub mod profile;
