//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: oilsim_core::config::ConfigError,
    },

    /// The lifecycle controller could not be built.
    #[error("controller error: {source}")]
    Controller {
        /// The underlying controller error.
        #[from]
        source: oilsim_core::controller::ControllerError,
    },
}
