//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `stowage-config.yaml`. Every field
//! has a default, so an empty or missing file yields a working setup that
//! behaves exactly like the unconfigured engine.

use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding `persistence.snapshot_path`.
pub const SNAPSHOT_PATH_ENV: &str = "STOWAGE_SNAPSHOT_PATH";

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StowageConfig {
    /// Session toggle defaults.
    #[serde(default)]
    pub session: SessionConfig,

    /// Destination resolver behaviour.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Snapshot persistence.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl StowageConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `STOWAGE_SNAPSHOT_PATH` overrides `persistence.snapshot_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document parses as YAML null, which is not a mapping.
        if yaml.trim().is_empty() {
            let mut config = Self::default();
            config.persistence.apply_env_overrides();
            return Ok(config);
        }
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.persistence.apply_env_overrides();
        Ok(config)
    }
}

/// Session toggle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Whether extended weighting starts enabled in a new game.
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled_by_default: true,
        }
    }
}

/// When the resolver performs a full candidate rescan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescanTrigger {
    /// Only when the host's proposed destination carries overrides.
    #[default]
    DefaultDestination,
    /// When any candidate in the listing carries overrides.
    AnyCandidate,
}

/// Destination resolver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResolverConfig {
    /// Rescan trigger condition.
    #[serde(default)]
    pub rescan_trigger: RescanTrigger,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit per-weight and per-candidate detail at debug level.
    #[serde(default)]
    pub debug_weights: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug_weights: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directives for a `tracing-subscriber` `EnvFilter`.
    pub fn filter_directives(&self) -> String {
        if self.debug_weights {
            format!("{},stowage_weights=debug,stowage_core=debug", self.level)
        } else {
            self.level.clone()
        }
    }
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Where the engine writes the registry snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl PersistenceConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(SNAPSHOT_PATH_ENV) {
            self.snapshot_path = path;
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_snapshot_path() -> String {
    "stowage-snapshot.json".to_owned()
}
