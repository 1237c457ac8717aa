//! Persisted snapshot layout.
//!
//! A snapshot is an explicit list of tagged records rather than a map keyed
//! by location, so that every record can be validated and dropped on its
//! own when the content it references has gone away between sessions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{CategoryId, ItemTypeId, LocationId};

/// Current snapshot layout version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Weight overrides of one storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationWeightsRecord {
    /// The location these weights belong to.
    pub location: LocationId,
    /// Per item type overrides.
    #[serde(default)]
    pub item_weights: BTreeMap<ItemTypeId, i32>,
    /// Per category overrides.
    #[serde(default)]
    pub category_weights: BTreeMap<CategoryId, i32>,
}

/// Every customised location at the moment of saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegistrySnapshot {
    /// Layout version, see [`SNAPSHOT_FORMAT_VERSION`].
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// One record per location with at least one override.
    #[serde(default)]
    pub records: Vec<LocationWeightsRecord>,
}

impl RegistrySnapshot {
    /// A snapshot with no records, stamped now.
    pub fn empty() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at: Utc::now(),
            records: Vec::new(),
        }
    }

    /// Total number of overrides across all records.
    pub fn override_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.item_weights.len().saturating_add(r.category_weights.len()))
            .fold(0_usize, usize::saturating_add)
    }
}

/// Session-scoped settings saved with each game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionState {
    /// Whether extended weighting is active for this game.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Everything the engine writes at a host save boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameSnapshot {
    /// Session toggle state.
    #[serde(default)]
    pub session: SessionState,
    /// Registry contents.
    pub registry: RegistrySnapshot,
}

const fn default_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_overrides() {
        let snapshot = RegistrySnapshot::empty();
        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.override_count(), 0);
    }

    #[test]
    fn override_count_sums_both_maps() {
        let mut snapshot = RegistrySnapshot::empty();
        snapshot.records.push(LocationWeightsRecord {
            location: LocationId::new(),
            item_weights: BTreeMap::from([(ItemTypeId::new("Steel"), 3)]),
            category_weights: BTreeMap::from([
                (CategoryId::new("Foods"), -1),
                (CategoryId::new("Manufactured"), 2),
            ]),
        });
        assert_eq!(snapshot.override_count(), 3);
    }

    #[test]
    fn session_state_defaults_to_enabled_when_missing() {
        let parsed: Result<SessionState, _> = serde_json::from_str("{}");
        assert_eq!(parsed.ok(), Some(SessionState { enabled: true }));
    }

    #[test]
    fn record_json_uses_definition_names_as_keys() {
        let record = LocationWeightsRecord {
            location: LocationId::nil(),
            item_weights: BTreeMap::from([(ItemTypeId::new("Steel"), 3)]),
            category_weights: BTreeMap::new(),
        };
        let json = serde_json::to_string(&record).unwrap_or_default();
        assert!(json.contains("\"Steel\":3"));
    }
}
