//! Capabilities the engine consumes from the host.
//!
//! The host owns storage locations, their filters, and the cell checks. The
//! resolver sees them only through these traits and never keeps a reference
//! past a single call.

use stowage_types::{Cell, ItemType, Job, LocationId, StoragePriority};

/// One storage location as the host presents it to the resolver.
pub trait StorageCandidate {
    /// Stable identity of the location.
    fn location_id(&self) -> LocationId;

    /// The host-assigned rank before any weighting.
    fn base_priority(&self) -> StoragePriority;

    /// Whether the location's filter admits this item type.
    fn accepts(&self, item: &ItemType) -> bool;

    /// Reference point used when comparing candidates by distance.
    ///
    /// `None` is a malformed candidate and aborts the resolution.
    fn position(&self) -> Option<Cell>;

    /// Every cell belonging to the location, in the host's order.
    fn cells(&self) -> &[Cell];
}

impl<T: StorageCandidate + ?Sized> StorageCandidate for &T {
    fn location_id(&self) -> LocationId {
        (**self).location_id()
    }

    fn base_priority(&self) -> StoragePriority {
        (**self).base_priority()
    }

    fn accepts(&self, item: &ItemType) -> bool {
        (**self).accepts(item)
    }

    fn position(&self) -> Option<Cell> {
        (**self).position()
    }

    fn cells(&self) -> &[Cell] {
        (**self).cells()
    }
}

/// Host-side placement checks.
pub trait PlacementHost {
    /// Whether the host's own candidate listing would offer `location` for
    /// this job (reachability, forbidden zones and the like).
    fn is_exposed(&self, location: LocationId, job: &Job) -> bool {
        let _ = (location, job);
        true
    }

    /// Whether `cell` inside `location` can take the job's item right now.
    fn is_valid_cell(&self, location: LocationId, cell: Cell, job: &Job) -> bool;
}
