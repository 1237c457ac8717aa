//! Registry mapping storage locations to their weight models.
//!
//! The host owns storage locations and their lifetimes. The registry only
//! holds location ids, creates a [`WeightModel`] the first time a location
//! is touched, and forgets it when the host reports the location destroyed.
//!
//! # Locking
//!
//! One mutex guards the id map (`get_or_create`, `remove`, `clear`,
//! `load`). Every model sits behind its own mutex inside a
//! [`WeightHandle`], so reading or adjusting one location's weights never
//! holds the registry-wide lock. A poisoned lock is recovered rather than
//! propagated: weights are plain data and stay consistent after any panic
//! in a caller's closure.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use stowage_types::LocationId;

use crate::error::WeightError;
use crate::weight::WeightModel;

// ---------------------------------------------------------------------------
// WeightHandle
// ---------------------------------------------------------------------------

/// Shared access to one location's [`WeightModel`].
///
/// Cloning a handle is cheap and every clone refers to the same model.
/// A handle obtained before [`WeightRegistry::remove`] keeps working but
/// is detached: the registry will hand out a fresh model for that id.
#[derive(Debug, Clone)]
pub struct WeightHandle {
    location: LocationId,
    model: Arc<Mutex<WeightModel>>,
}

impl WeightHandle {
    fn new(location: LocationId, model: WeightModel) -> Self {
        Self {
            location,
            model: Arc::new(Mutex::new(model)),
        }
    }

    /// The location this model belongs to.
    pub const fn location(&self) -> LocationId {
        self.location
    }

    /// Run `f` with shared access to the model.
    pub fn read<R>(&self, f: impl FnOnce(&WeightModel) -> R) -> R {
        f(&self.lock())
    }

    /// Run `f` with exclusive access to the model.
    pub fn update<R>(&self, f: impl FnOnce(&mut WeightModel) -> R) -> R {
        f(&mut self.lock())
    }

    /// A copy of the model as it is now.
    pub fn snapshot(&self) -> WeightModel {
        self.read(WeightModel::clone)
    }

    /// Shorthand for [`WeightModel::has_any_override`].
    pub fn has_any_override(&self) -> bool {
        self.read(WeightModel::has_any_override)
    }

    /// Whether both handles refer to the same model instance.
    pub fn same_model(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
    }

    fn lock(&self) -> MutexGuard<'_, WeightModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// RegistryStatistics
// ---------------------------------------------------------------------------

/// Aggregate counts over the registry, for the operator log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStatistics {
    /// Models held, customised or not.
    pub total_models: usize,
    /// Models with at least one override.
    pub customized_models: usize,
    /// Overrides across all models.
    pub total_overrides: usize,
}

impl core::fmt::Display for RegistryStatistics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "weight models: {}, customised locations: {}, overrides: {}",
            self.total_models, self.customized_models, self.total_overrides
        )
    }
}

// ---------------------------------------------------------------------------
// WeightRegistry
// ---------------------------------------------------------------------------

/// Location id to weight model store.
///
/// One instance per game session, owned by the caller and passed by
/// reference. At most one model exists per location.
#[derive(Debug, Default)]
pub struct WeightRegistry {
    models: Mutex<BTreeMap<LocationId, WeightHandle>>,
}

impl WeightRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            models: Mutex::new(BTreeMap::new()),
        }
    }

    /// The model for `location`, created empty on first access.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::InvalidLocation`] for the nil id.
    pub fn try_get_or_create(&self, location: LocationId) -> Result<WeightHandle, WeightError> {
        if location.is_nil() {
            return Err(WeightError::InvalidLocation(location));
        }
        let mut models = self.lock_models();
        let handle = models
            .entry(location)
            .or_insert_with(|| WeightHandle::new(location, WeightModel::new()))
            .clone();
        debug!(location = %location, total = models.len(), "weight model resolved");
        Ok(handle)
    }

    /// Like [`try_get_or_create`](Self::try_get_or_create), but logs and
    /// returns `None` instead of an error. Suitable for UI and save passes
    /// that must never abort.
    pub fn get_or_create(&self, location: LocationId) -> Option<WeightHandle> {
        match self.try_get_or_create(location) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "weight model lookup refused");
                None
            }
        }
    }

    /// The model for `location` if one exists. Never creates.
    pub fn get(&self, location: LocationId) -> Option<WeightHandle> {
        self.lock_models().get(&location).cloned()
    }

    /// Forget the model for a destroyed location. Idempotent.
    ///
    /// Returns whether a model was removed.
    pub fn remove(&self, location: LocationId) -> bool {
        let mut models = self.lock_models();
        let removed = models.remove(&location).is_some();
        if removed {
            debug!(location = %location, remaining = models.len(), "weight model removed");
        }
        removed
    }

    /// Drop every model.
    pub fn clear(&self) {
        let mut models = self.lock_models();
        let dropped = models.len();
        models.clear();
        info!(dropped, "weight registry cleared");
    }

    /// Replace `target`'s overrides with a copy of `source`'s.
    ///
    /// A source without a model copies as "no overrides".
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::InvalidLocation`] if either id is nil.
    pub fn copy_settings(&self, source: LocationId, target: LocationId) -> Result<(), WeightError> {
        if source.is_nil() {
            return Err(WeightError::InvalidLocation(source));
        }
        // Snapshot first so source == target cannot self-deadlock.
        let copied = self
            .get(source)
            .map(|handle| handle.snapshot())
            .unwrap_or_default();
        let target_handle = self.try_get_or_create(target)?;
        target_handle.update(|model| copied.copy_into(model));
        debug!(
            source = %source,
            target = %target,
            overrides = copied.override_count(),
            "weights copied"
        );
        Ok(())
    }

    /// Number of models held.
    pub fn len(&self) -> usize {
        self.lock_models().len()
    }

    /// Whether the registry holds no models.
    pub fn is_empty(&self) -> bool {
        self.lock_models().is_empty()
    }

    /// Whether any of `locations` has a model with an override.
    pub fn any_override_among(&self, locations: impl IntoIterator<Item = LocationId>) -> bool {
        locations
            .into_iter()
            .filter_map(|location| self.get(location))
            .any(|handle| handle.has_any_override())
    }

    /// Aggregate counts over every model.
    pub fn statistics(&self) -> RegistryStatistics {
        self.handles()
            .iter()
            .fold(RegistryStatistics::default(), |mut stats, handle| {
                let overrides = handle.read(WeightModel::override_count);
                stats.total_models = stats.total_models.saturating_add(1);
                if overrides > 0 {
                    stats.customized_models = stats.customized_models.saturating_add(1);
                    stats.total_overrides = stats.total_overrides.saturating_add(overrides);
                }
                stats
            })
    }

    /// Copy of the handle set in location order.
    ///
    /// Iterating the copy is safe against concurrent `remove` or `load`.
    pub fn handles(&self) -> Vec<WeightHandle> {
        self.lock_models().values().cloned().collect()
    }

    /// Swap in a freshly built map. Used by snapshot loading.
    pub(crate) fn replace_all(&self, replacement: BTreeMap<LocationId, WeightHandle>) -> usize {
        let mut models = self.lock_models();
        *models = replacement;
        models.len()
    }

    fn lock_models(&self) -> MutexGuard<'_, BTreeMap<LocationId, WeightHandle>> {
        self.models.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build a handle around an already populated model.
pub(crate) fn restored_handle(location: LocationId, model: WeightModel) -> WeightHandle {
    WeightHandle::new(location, model)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
