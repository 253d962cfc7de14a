//! Error types for the ensemble binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the ensemble itself, and report export.

/// Top-level error for the ensemble binary.
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
        source: lotka_core::config::ConfigError,
    },

    /// The ensemble failed.
    #[error("ensemble error: {source}")]
    Ensemble {
        /// The underlying ensemble error.
        #[from]
        source: lotka_core::ensemble::EnsembleError,
    },

    /// The report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying report error.
        #[from]
        source: lotka_core::report::ReportError,
    },

    /// The report could not be written.
    #[error("failed to write report to {path}: {source}")]
    Export {
        /// Destination path.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
