//! Boat identifiers.
//!
//! Boats are numbered sequentially by the engine that creates them, so a
//! run started from the same configuration always yields the same ids.
//! The textual form is `b<n>` (e.g. `b1`), and the display name derived
//! from it is `Boat_b<n>`.

use serde::{Deserialize, Serialize};

/// Unique identifier for a boat within one simulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoatId(pub u32);

impl BoatId {
    /// Identifier of the first boat an engine allocates.
    pub const FIRST: Self = Self(1);

    /// Return the raw sequence number.
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    /// Return the identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Derive the human-readable display name (`Boat_b<n>`).
    pub fn display_name(self) -> String {
        format!("Boat_{self}")
    }
}

impl core::fmt::Display for BoatId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl From<u32> for BoatId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
