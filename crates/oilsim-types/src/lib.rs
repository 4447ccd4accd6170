//! Shared type definitions for the oil-spill cleanup simulation.
//!
//! This crate is the single source of truth for the small vocabulary used
//! across the workspace: identifiers, boat and wind enumerations, and grid
//! coordinates with their clamping rules.
//!
//! # Modules
//!
//! - [`ids`] -- Sequential boat identifiers.
//! - [`enums`] -- Boat status, compass heading, and wind direction.
//! - [`grid`] -- Grid bounds, the port coordinate, and [`GridPos`].

pub mod enums;
pub mod grid;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{Axis, BoatEvent, BoatStatus, Heading, Wind};
pub use grid::{GridPos, MAX_GRID, PORT, clamp_to_grid};
pub use ids::BoatId;
