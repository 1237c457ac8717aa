//! Error types for the `stowage-weights` crate.
//!
//! Most weight operations never fail: bad references are no-ops that
//! return the default weight. [`WeightError`] covers the few places where
//! a caller asked for something specific and deserves to know why it did
//! not happen.

use stowage_types::{CategoryId, ItemTypeId, LocationId};

/// Errors that can occur during weight and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum WeightError {
    /// A nil or otherwise unusable location identity was supplied.
    #[error("invalid storage location id: {0}")]
    InvalidLocation(LocationId),

    /// The item type is not in the definition catalog.
    #[error("unknown item type: {0}")]
    UnknownItemType(ItemTypeId),

    /// The category is not in the definition catalog.
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot serialization failed: {source}")]
    Snapshot {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
