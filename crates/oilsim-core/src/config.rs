//! Configuration loading and typed config structures for the simulation.
//!
//! The configuration lives in `oilsim-config.yaml`. Every section and field
//! is optional; anything missing falls back to the built-in defaults, so an
//! empty file (or no file at all) yields the stock single-boat scenario.
//!
//! ```yaml
//! simulation:
//!   profile: auto_spawn      # single_boat | auto_spawn | manual
//!   tick_delay_ms: 100
//!   seed: 42                 # omit for a fresh random run
//!   initial_wind: west
//! rates:                     # per-gate overrides, 0 disables a gate
//!   rotate_every: 30
//! boats:
//!   load_capacity: 100
//!   battery_capacity: 500
//! oil:
//!   initial_cells: 30
//! logging:
//!   level: info
//!   format: text             # text | json
//! ```

use std::path::Path;

use oilsim_types::Wind;
use oilsim_world::BoatCaps;
use serde::Deserialize;

use crate::controller::DEFAULT_TICK_DELAY_MS;
use crate::engine::EngineSettings;
use crate::profile::{DEFAULT_INITIAL_OIL, ScenarioKind, ScenarioProfile};

/// Environment variable overriding `simulation.profile`.
pub const PROFILE_ENV: &str = "OILSIM_PROFILE";

/// Environment variable overriding `simulation.tick_delay_ms`.
pub const TICK_DELAY_ENV: &str = "OILSIM_TICK_DELAY_MS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A configured value is outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending key.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {variable}: {reason}")]
    InvalidOverride {
        /// The environment variable name.
        variable: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Scenario selection, pacing, and randomness.
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Per-gate threshold overrides.
    #[serde(default)]
    pub rates: RateOverrides,

    /// Boat capacities.
    #[serde(default)]
    pub boats: BoatConfig,

    /// Initial oil placement.
    #[serde(default)]
    pub oil: OilConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `OILSIM_PROFILE` overrides `simulation.profile`
    /// - `OILSIM_TICK_DELAY_MS` overrides `simulation.tick_delay_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] for a malformed override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidValue`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// A boat needs at least one unit of battery to move and one unit of
    /// hold to collect oil; with either at zero it never leaves port.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boats.load_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "boats.load_capacity",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.boats.battery_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "boats.battery_capacity",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Apply `OILSIM_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if a variable is set to a
    /// value that cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let profile = std::env::var(PROFILE_ENV).ok();
        let delay = std::env::var(TICK_DELAY_ENV).ok();
        self.apply_overrides(profile.as_deref(), delay.as_deref())
    }

    /// Apply override values as if read from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if a value cannot be parsed.
    pub fn apply_overrides(
        &mut self,
        profile: Option<&str>,
        tick_delay_ms: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = profile {
            self.simulation.profile = raw
                .parse()
                .map_err(|reason| ConfigError::InvalidOverride {
                    variable: PROFILE_ENV,
                    reason,
                })?;
        }
        if let Some(raw) = tick_delay_ms {
            self.simulation.tick_delay_ms =
                raw.trim()
                    .parse()
                    .map_err(|err: std::num::ParseIntError| ConfigError::InvalidOverride {
                        variable: TICK_DELAY_ENV,
                        reason: err.to_string(),
                    })?;
        }
        Ok(())
    }

    /// The scenario profile after applying rate and oil overrides.
    pub fn profile(&self) -> ScenarioProfile {
        let mut profile = self
            .simulation
            .profile
            .profile()
            .with_initial_oil(self.oil.initial_cells);
        let rates = &mut profile.rates;
        if let Some(every) = self.rates.spawn_every {
            rates.spawn_every = every;
        }
        if let Some(every) = self.rates.darken_every {
            rates.darken_every = every;
        }
        if let Some(every) = self.rates.diffuse_every {
            rates.diffuse_every = every;
        }
        if let Some(every) = self.rates.rotate_every {
            rates.rotate_every = every;
        }
        profile
    }

    /// Engine construction settings derived from this configuration.
    pub const fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            caps: self.boats.caps(),
            initial_wind: self.simulation.initial_wind,
            seed: self.simulation.seed,
        }
    }
}

/// Scenario selection, pacing, and randomness.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSection {
    /// Which scenario preset to run.
    #[serde(default)]
    pub profile: ScenarioKind,

    /// Real-time milliseconds to wait between ticks.
    #[serde(default = "default_tick_delay_ms")]
    pub tick_delay_ms: u64,

    /// Random seed for reproducible runs (`None` = seeded from the OS).
    #[serde(default)]
    pub seed: Option<u64>,

    /// Wind at engine construction.
    #[serde(default)]
    pub initial_wind: Wind,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            profile: ScenarioKind::default(),
            tick_delay_ms: default_tick_delay_ms(),
            seed: None,
            initial_wind: Wind::default(),
        }
    }
}

/// Optional per-gate threshold overrides (0 disables a gate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RateOverrides {
    /// Ticks between automatic boat launches.
    #[serde(default)]
    pub spawn_every: Option<u32>,
    /// Ticks between darkening every oil cell.
    #[serde(default)]
    pub darken_every: Option<u32>,
    /// Ticks between wind-driven diffusion.
    #[serde(default)]
    pub diffuse_every: Option<u32>,
    /// Ticks between random wind changes.
    #[serde(default)]
    pub rotate_every: Option<u32>,
}

/// Boat capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BoatConfig {
    /// Oil cells a boat carries before unloading.
    #[serde(default = "default_load_capacity")]
    pub load_capacity: u32,

    /// Grid steps a boat travels before recharging.
    #[serde(default = "default_battery_capacity")]
    pub battery_capacity: u32,
}

impl BoatConfig {
    /// Capacities in the form boats are built with.
    pub const fn caps(&self) -> BoatCaps {
        BoatCaps {
            load_capacity: self.load_capacity,
            battery_capacity: self.battery_capacity,
        }
    }
}

impl Default for BoatConfig {
    fn default() -> Self {
        Self {
            load_capacity: default_load_capacity(),
            battery_capacity: default_battery_capacity(),
        }
    }
}

/// Initial oil placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OilConfig {
    /// Oil cells spilled when a fresh-population scenario starts.
    #[serde(default = "default_initial_cells")]
    pub initial_cells: u32,
}

impl Default for OilConfig {
    fn default() -> Self {
        Self {
            initial_cells: default_initial_cells(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_tick_delay_ms() -> u64 {
    DEFAULT_TICK_DELAY_MS
}

const fn default_load_capacity() -> u32 {
    oilsim_world::boat::DEFAULT_LOAD_CAPACITY
}

const fn default_battery_capacity() -> u32 {
    oilsim_world::boat::DEFAULT_BATTERY_CAPACITY
}

const fn default_initial_cells() -> u32 {
    DEFAULT_INITIAL_OIL
}

fn default_log_level() -> String {
    "info".to_owned()
}
