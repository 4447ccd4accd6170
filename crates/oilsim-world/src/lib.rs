//! Ocean grid contents for the oil-spill cleanup simulation.
//!
//! This crate models the things that live on the grid: polluted cells and
//! the boats that clean them, plus the spatial rules by which oil spreads.
//! It holds no scheduling logic; the tick orchestrator in `oilsim-core`
//! decides when each rule runs.
//!
//! # Modules
//!
//! - [`oil`] -- [`OilCell`] and its [`OilColor`] intensity model.
//! - [`boat`] -- [`Boat`] agent with its battery/cargo state machine.
//! - [`diffusion`] -- Random placement, adjacency spread, and wind-driven
//!   boundary extension of the oil queue.

pub mod boat;
pub mod diffusion;
pub mod oil;

pub use boat::{Boat, BoatCaps, CleanOutcome, MoveOutcome};
pub use diffusion::OilQueue;
pub use oil::{OilCell, OilColor};
