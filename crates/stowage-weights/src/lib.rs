//! Weight overrides, definition catalog, and the per-location registry.
//!
//! This crate holds everything the storage priority engine knows about
//! operator customisation: the clamped per-item and per-category weight
//! deltas of a single location, the registry tying those models to
//! location ids, and the save/load path that keeps them valid across
//! sessions.
//!
//! # Modules
//!
//! - [`weight`] -- [`WeightModel`]: sparse clamped overrides and scoring.
//! - [`catalog`] -- [`DefinitionCatalog`]: live item type and category
//!   definitions used for lookups and stale-key pruning.
//! - [`registry`] -- [`WeightRegistry`]: location id to model store with
//!   lazy creation and explicit removal.
//! - [`persist`] -- Snapshot save/load with per-key pruning.
//! - [`error`] -- [`WeightError`].

pub mod catalog;
pub mod error;
pub mod persist;
pub mod registry;
pub mod weight;

// Re-export primary types at crate root.
pub use catalog::DefinitionCatalog;
pub use error::WeightError;
pub use persist::{LoadReport, decode_snapshot, encode_snapshot, to_record};
pub use registry::{RegistryStatistics, WeightHandle, WeightRegistry};
pub use weight::{
    DEFAULT_WEIGHT, MAX_WEIGHT, MIN_WEIGHT, ScoreBreakdown, WeightModel, clamp_weight,
    format_weight,
};
