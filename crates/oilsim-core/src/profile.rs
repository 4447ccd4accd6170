//! Scenario profiles.
//!
//! The three scenarios differ only in their gate thresholds and starting
//! population; every profile runs through the same engine code.
//!
//! | Profile        | spawn | darken | diffuse | rotate | boats | oil      |
//! |----------------|-------|--------|---------|--------|-------|----------|
//! | `single_boat`  | off   | 20     | 50      | 15     | 1     | 30       |
//! | `auto_spawn`   | 50    | 20     | 50      | off    | 1     | 30       |
//! | `manual`       | off   | 20     | 50      | off    | kept  | kept     |
//!
//! "Kept" means the manual profile starts with whatever boats and oil an
//! operator placed before pressing start.

use serde::{Deserialize, Serialize};

/// Default ticks between oil darkening.
pub const DEFAULT_DARKEN_EVERY: u32 = 20;

/// Default ticks between wind diffusion.
pub const DEFAULT_DIFFUSE_EVERY: u32 = 50;

/// Default number of oil cells placed at the start of a run.
pub const DEFAULT_INITIAL_OIL: u32 = 30;

/// Named scenario presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// One boat, wind changes at random.
    #[default]
    SingleBoat,
    /// Boats launch periodically, wind changes only by command.
    AutoSpawn,
    /// Everything by command: boats, oil, and wind.
    Manual,
}

impl ScenarioKind {
    /// All presets in menu order.
    pub const ALL: [Self; 3] = [Self::SingleBoat, Self::AutoSpawn, Self::Manual];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleBoat => "Simple - one boat, random wind",
            Self::AutoSpawn => "Auto-generating boats, wind by hand",
            Self::Manual => "Manual",
        }
    }

    /// The preset configuration for this scenario.
    pub const fn profile(self) -> ScenarioProfile {
        match self {
            Self::SingleBoat => ScenarioProfile {
                kind: self,
                rates: RateThresholds {
                    spawn_every: 0,
                    darken_every: DEFAULT_DARKEN_EVERY,
                    diffuse_every: DEFAULT_DIFFUSE_EVERY,
                    rotate_every: 15,
                },
                population: InitialPopulation::Fresh {
                    boats: 1,
                    oil_cells: DEFAULT_INITIAL_OIL,
                },
            },
            Self::AutoSpawn => ScenarioProfile {
                kind: self,
                rates: RateThresholds {
                    spawn_every: 50,
                    darken_every: DEFAULT_DARKEN_EVERY,
                    diffuse_every: DEFAULT_DIFFUSE_EVERY,
                    rotate_every: 0,
                },
                population: InitialPopulation::Fresh {
                    boats: 1,
                    oil_cells: DEFAULT_INITIAL_OIL,
                },
            },
            Self::Manual => ScenarioProfile {
                kind: self,
                rates: RateThresholds {
                    spawn_every: 0,
                    darken_every: DEFAULT_DARKEN_EVERY,
                    diffuse_every: DEFAULT_DIFFUSE_EVERY,
                    rotate_every: 0,
                },
                population: InitialPopulation::Retained,
            },
        }
    }
}

impl core::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::SingleBoat => "single_boat",
            Self::AutoSpawn => "auto_spawn",
            Self::Manual => "manual",
        };
        f.write_str(name)
    }
}

impl core::str::FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single_boat" | "a" | "0" => Ok(Self::SingleBoat),
            "auto_spawn" | "b" | "1" => Ok(Self::AutoSpawn),
            "manual" | "c" | "2" => Ok(Self::Manual),
            other => Err(format!("unknown scenario profile: {other}")),
        }
    }
}

/// Thresholds for the four rate gates, in ticks (0 = disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateThresholds {
    /// Ticks between automatic boat launches.
    pub spawn_every: u32,
    /// Ticks between darkening every oil cell.
    pub darken_every: u32,
    /// Ticks between wind-driven diffusion.
    pub diffuse_every: u32,
    /// Ticks between random wind changes.
    pub rotate_every: u32,
}

/// What the engine places on the grid when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialPopulation {
    /// Replace everything with this many boats at port and oil cells.
    Fresh {
        /// Boats launched from the port.
        boats: u32,
        /// Oil cells spilled (first at random, the rest spreading from it).
        oil_cells: u32,
    },
    /// Keep whatever is already on the grid.
    Retained,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioProfile {
    /// Which preset this profile was derived from.
    pub kind: ScenarioKind,
    /// Gate thresholds.
    pub rates: RateThresholds,
    /// Starting population.
    pub population: InitialPopulation,
}

impl ScenarioProfile {
    /// Override the initial oil count of a fresh-population profile.
    #[must_use]
    pub const fn with_initial_oil(mut self, oil_cells: u32) -> Self {
        if let InitialPopulation::Fresh { boats, .. } = self.population {
            self.population = InitialPopulation::Fresh { boats, oil_cells };
        }
        self
    }
}

impl Default for ScenarioProfile {
    fn default() -> Self {
        ScenarioKind::default().profile()
    }
}

impl From<ScenarioKind> for ScenarioProfile {
    fn from(kind: ScenarioKind) -> Self {
        kind.profile()
    }
}
