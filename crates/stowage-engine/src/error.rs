//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of a scenario run so `main`
//! can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: stowage_core::ConfigError,
    },

    /// A weight operation named something the catalog does not know.
    #[error("weight error: {source}")]
    Weight {
        /// The underlying weight error.
        #[from]
        source: stowage_weights::WeightError,
    },

    /// Reading or writing a file failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The game snapshot could not be encoded or decoded.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The scenario file is malformed or inconsistent.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the problem.
        message: String,
    },
}
