//! Enumeration types shared across the Stowage workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Storage priority scale
// ---------------------------------------------------------------------------

/// The host's six-step storage priority scale.
///
/// Every storage location carries one of these as its base rank. The
/// numeric rank is what weight overrides are added to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum StoragePriority {
    /// Not in storage at all.
    #[default]
    Unstored,
    /// Low priority storage.
    Low,
    /// Normal priority storage.
    Normal,
    /// Preferred storage.
    Preferred,
    /// Important storage.
    Important,
    /// Critical storage.
    Critical,
}

impl StoragePriority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 6] = [
        Self::Unstored,
        Self::Low,
        Self::Normal,
        Self::Preferred,
        Self::Important,
        Self::Critical,
    ];

    /// Numeric rank on the 0..=5 scale.
    pub const fn rank(self) -> i32 {
        match self {
            Self::Unstored => 0,
            Self::Low => 1,
            Self::Normal => 2,
            Self::Preferred => 3,
            Self::Important => 4,
            Self::Critical => 5,
        }
    }

    /// Inverse of [`rank`](Self::rank). Returns `None` outside 0..=5.
    pub const fn from_rank(rank: i32) -> Option<Self> {
        match rank {
            0 => Some(Self::Unstored),
            1 => Some(Self::Low),
            2 => Some(Self::Normal),
            3 => Some(Self::Preferred),
            4 => Some(Self::Important),
            5 => Some(Self::Critical),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Operator gestures
// ---------------------------------------------------------------------------

/// One discrete operator input on a weight box.
///
/// The UI maps primary click to `Raise`, secondary click to `Lower`, and
/// middle click to `Reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WeightGesture {
    /// Step the weight up by one.
    Raise,
    /// Step the weight down by one.
    Lower,
    /// Remove the override.
    Reset,
}

// ---------------------------------------------------------------------------
// Weight provenance
// ---------------------------------------------------------------------------

/// Where an effective weight came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WeightSource {
    /// The item type has its own non-zero override.
    ItemOverride,
    /// No item override; the clamped sum of the item's category weights.
    CategoryFallback,
    /// Neither the item nor any of its categories is weighted.
    Unweighted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_cover_zero_to_five() {
        let ranks: Vec<i32> = StoragePriority::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn from_rank_inverts_rank() {
        for priority in StoragePriority::ALL {
            assert_eq!(StoragePriority::from_rank(priority.rank()), Some(priority));
        }
        assert_eq!(StoragePriority::from_rank(6), None);
        assert_eq!(StoragePriority::from_rank(-1), None);
    }

    #[test]
    fn priority_ordering_follows_rank() {
        assert!(StoragePriority::Critical > StoragePriority::Important);
        assert!(StoragePriority::Low > StoragePriority::Unstored);
    }
}
