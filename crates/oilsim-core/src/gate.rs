//! Modular rate gates.
//!
//! A [`RateGate`] counts ticks and fires once every `threshold` of them.
//! The engine owns four: boat auto-spawn, oil darkening, wind diffusion,
//! and wind rotation. A threshold of zero disables the gate permanently;
//! its counter still advances but it never fires.

use serde::{Deserialize, Serialize};

/// A tick counter that fires every `threshold` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateGate {
    counter: u32,
    threshold: u32,
}

impl RateGate {
    /// Create a gate firing every `threshold` ticks (0 = never).
    pub const fn every(threshold: u32) -> Self {
        Self {
            counter: 0,
            threshold,
        }
    }

    /// A gate that never fires.
    pub const fn disabled() -> Self {
        Self::every(0)
    }

    /// Advance one tick. Returns `true` when the gate fires, in which case
    /// the counter has been reset to zero.
    pub const fn advance(&mut self) -> bool {
        self.counter = self.counter.saturating_add(1);
        if self.threshold != 0 && self.counter >= self.threshold {
            self.counter = 0;
            return true;
        }
        false
    }

    /// Restart the count from zero.
    pub const fn reset(&mut self) {
        self.counter = 0;
    }

    /// Ticks between firings (0 = disabled).
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Ticks counted since the last firing.
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Whether the gate can ever fire.
    pub const fn is_enabled(&self) -> bool {
        self.threshold != 0
    }
}
