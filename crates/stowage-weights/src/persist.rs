//! Saving and restoring the weight registry.
//!
//! [`WeightRegistry::save`] writes one record per location that has at
//! least one override. [`WeightRegistry::load`] rebuilds the registry from
//! scratch: nothing from the previous session survives a load.
//!
//! Loading validates each record on its own. A record whose location the
//! host no longer knows is dropped. A location listed twice takes the
//! later record. Within a record, an override whose item
//! type or category has disappeared from the [`DefinitionCatalog`] is
//! dropped with a warning while the rest of the record is kept.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use stowage_types::{LocationId, LocationWeightsRecord, RegistrySnapshot, SNAPSHOT_FORMAT_VERSION};

use crate::catalog::DefinitionCatalog;
use crate::error::WeightError;
use crate::registry::{WeightRegistry, restored_handle};
use crate::weight::{WeightModel, clamp_weight};

/// What happened during [`WeightRegistry::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Locations restored with at least one override.
    pub restored: usize,
    /// Records dropped because their location is nil or not live, or
    /// because a later record for the same location replaced them.
    pub dropped_locations: usize,
    /// Records whose every override was stale or zero.
    pub emptied_locations: usize,
    /// Item type overrides dropped because the definition is gone.
    pub stale_item_keys: usize,
    /// Category overrides dropped because the definition is gone.
    pub stale_category_keys: usize,
    /// Persisted values that were outside `[-3, 3]` and got clamped.
    pub clamped_values: usize,
}

impl WeightRegistry {
    /// Capture every customised location.
    ///
    /// Works from a copy of the handle set, so a concurrent `remove` cannot
    /// disturb the iteration.
    pub fn save(&self) -> RegistrySnapshot {
        let records: Vec<LocationWeightsRecord> = self
            .handles()
            .iter()
            .filter_map(|handle| {
                handle.read(|model| {
                    model.has_any_override().then(|| to_record(handle.location(), model))
                })
            })
            .collect();

        info!(
            saved = records.len(),
            overrides = records
                .iter()
                .map(|r| r.item_weights.len().saturating_add(r.category_weights.len()))
                .fold(0_usize, usize::saturating_add),
            "weight registry saved"
        );

        RegistrySnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at: Utc::now(),
            records,
        }
    }

    /// Replace the registry with the contents of `snapshot`.
    ///
    /// `is_live` answers whether the host still has a storage location
    /// with the given id. When a location appears in several records, the
    /// last one wins.
    pub fn load(
        &self,
        snapshot: &RegistrySnapshot,
        catalog: &DefinitionCatalog,
        is_live: impl Fn(LocationId) -> bool,
    ) -> LoadReport {
        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            warn!(
                found = snapshot.format_version,
                supported = SNAPSHOT_FORMAT_VERSION,
                "snapshot written by a newer format, loading what is understood"
            );
        }

        let mut report = LoadReport::default();
        let mut rebuilt = BTreeMap::new();

        for record in &snapshot.records {
            let location = record.location;
            if location.is_nil() || !is_live(location) {
                warn!(location = %location, "dropping weights of a location that no longer exists");
                report.dropped_locations = report.dropped_locations.saturating_add(1);
                continue;
            }

            let model = restore_model(record, catalog, &mut report);
            let superseded = if model.has_any_override() {
                rebuilt
                    .insert(location, restored_handle(location, model))
                    .is_some()
            } else {
                report.emptied_locations = report.emptied_locations.saturating_add(1);
                rebuilt.remove(&location).is_some()
            };
            if superseded {
                warn!(location = %location, "earlier weights record replaced by a later one");
                report.dropped_locations = report.dropped_locations.saturating_add(1);
            }
        }
        report.restored = rebuilt.len();

        let total = self.replace_all(rebuilt);
        info!(
            restored = report.restored,
            dropped_locations = report.dropped_locations,
            emptied_locations = report.emptied_locations,
            stale_item_keys = report.stale_item_keys,
            stale_category_keys = report.stale_category_keys,
            clamped_values = report.clamped_values,
            total,
            "weight registry loaded"
        );
        report
    }
}

/// Flatten a model into its persisted record.
pub fn to_record(location: LocationId, model: &WeightModel) -> LocationWeightsRecord {
    LocationWeightsRecord {
        location,
        item_weights: model
            .item_overrides()
            .map(|(id, weight)| (id.clone(), weight))
            .collect(),
        category_weights: model
            .category_overrides()
            .map(|(id, weight)| (id.clone(), weight))
            .collect(),
    }
}

/// Rebuild one model, pruning stale keys and going through the clamping
/// setters so persisted garbage cannot break the model invariants.
fn restore_model(
    record: &LocationWeightsRecord,
    catalog: &DefinitionCatalog,
    report: &mut LoadReport,
) -> WeightModel {
    let mut model = WeightModel::new();

    for (item, &weight) in &record.item_weights {
        if !catalog.contains_item(item) {
            warn!(location = %record.location, item = %item, "removing stale item weight");
            report.stale_item_keys = report.stale_item_keys.saturating_add(1);
            continue;
        }
        if clamp_weight(weight) != weight {
            report.clamped_values = report.clamped_values.saturating_add(1);
        }
        model.set_item_weight(item, weight);
    }

    for (category, &weight) in &record.category_weights {
        if !catalog.contains_category(category) {
            warn!(
                location = %record.location,
                category = %category,
                "removing stale category weight"
            );
            report.stale_category_keys = report.stale_category_keys.saturating_add(1);
            continue;
        }
        if clamp_weight(weight) != weight {
            report.clamped_values = report.clamped_values.saturating_add(1);
        }
        model.set_category_weight(category, weight);
    }

    model
}

/// Serialize a snapshot as pretty JSON.
///
/// # Errors
///
/// Returns [`WeightError::Snapshot`] if serialization fails.
pub fn encode_snapshot(snapshot: &RegistrySnapshot) -> Result<String, WeightError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse a snapshot from JSON.
///
/// # Errors
///
/// Returns [`WeightError::Snapshot`] if the text is not a valid snapshot.
pub fn decode_snapshot(json: &str) -> Result<RegistrySnapshot, WeightError> {
    Ok(serde_json::from_str(json)?)
}
