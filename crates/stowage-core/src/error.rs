//! Error types for destination resolution.
//!
//! A [`ResolveError`] never reaches the host: [`DestinationResolver::resolve`]
//! logs it and falls back to the host's own choice. It is exposed through
//! [`DestinationResolver::try_resolve`] for callers that want to see why.
//!
//! [`DestinationResolver::resolve`]: crate::resolver::DestinationResolver::resolve
//! [`DestinationResolver::try_resolve`]: crate::resolver::DestinationResolver::try_resolve

use stowage_types::{ItemTypeId, LocationId};

/// Faults raised while scanning candidates.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A candidate could not be evaluated.
    #[error("scan fault at candidate {location}: {reason}")]
    ScanFault {
        /// The offending candidate.
        location: LocationId,
        /// What was wrong with it.
        reason: String,
    },

    /// The job has neither a carrier position nor an item position.
    #[error("job for {item} has no position to measure distance from")]
    MissingJobPosition {
        /// The job's item type.
        item: ItemTypeId,
    },
}
