//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the scheduler run.

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
        source: crate::config::ConfigError,
    },

    /// Time module construction failed.
    #[error("time module error: {source}")]
    Time {
        /// The underlying time module error.
        #[from]
        source: vivarium_modules::TimeError,
    },

    /// Module installation failed.
    #[error("install error: {source}")]
    Install {
        /// The underlying install error.
        #[from]
        source: vivarium_core::InstallError,
    },

    /// The scheduler run failed.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: vivarium_core::SchedulerError,
    },
}
