//! The engine's single owned entry point.
//!
//! [`PriorityService`] owns the weight registry, the definition catalog,
//! the session toggle, and the configuration. The host creates one per
//! process, calls [`PriorityService::reset`] when a new game starts, and
//! forwards its lifecycle events to the `on_*` hooks.

use tracing::{debug, info, warn};

use stowage_types::{
    CategoryId, GameSnapshot, ItemTypeId, Job, LocationId, StoragePriority, WeightGesture,
};
use stowage_weights::{
    DEFAULT_WEIGHT, DefinitionCatalog, LoadReport, RegistryStatistics, WeightError, WeightModel,
    WeightRegistry,
};

use crate::config::StowageConfig;
use crate::host::{PlacementHost, StorageCandidate};
use crate::resolver::{DestinationResolver, Resolution};
use crate::session::SessionSettings;

/// Owned engine state and host hooks.
#[derive(Debug)]
pub struct PriorityService {
    config: StowageConfig,
    catalog: DefinitionCatalog,
    registry: WeightRegistry,
    session: SessionSettings,
}

impl PriorityService {
    /// Create a service with an empty registry.
    pub fn new(config: StowageConfig, catalog: DefinitionCatalog) -> Self {
        let session = SessionSettings::new(config.session.enabled_by_default);
        Self {
            config,
            catalog,
            registry: WeightRegistry::new(),
            session,
        }
    }

    /// Drop every weight and restore the session default.
    pub fn reset(&self) {
        self.registry.clear();
        self.session.reset();
    }

    /// Active configuration.
    pub const fn config(&self) -> &StowageConfig {
        &self.config
    }

    /// Live definitions.
    pub const fn catalog(&self) -> &DefinitionCatalog {
        &self.catalog
    }

    /// Mutable access for hosts that load definitions after start-up.
    pub const fn catalog_mut(&mut self) -> &mut DefinitionCatalog {
        &mut self.catalog
    }

    /// The weight registry.
    pub const fn registry(&self) -> &WeightRegistry {
        &self.registry
    }

    /// The session toggle.
    pub const fn session(&self) -> &SessionSettings {
        &self.session
    }

    /// A resolver bound to this service's state.
    pub const fn resolver(&self) -> DestinationResolver<'_> {
        DestinationResolver::new(
            &self.registry,
            &self.catalog,
            &self.session,
            self.config.resolver.rescan_trigger,
        )
    }

    /// Shorthand for [`DestinationResolver::resolve`].
    pub fn resolve<C: StorageCandidate>(
        &self,
        host: &impl PlacementHost,
        job: &Job,
        default_destination: Option<LocationId>,
        candidates: &[C],
        min_priority: StoragePriority,
    ) -> Resolution {
        self.resolver()
            .resolve(host, job, default_destination, candidates, min_priority)
    }

    // -------------------------------------------------------------------
    // Host lifecycle hooks
    // -------------------------------------------------------------------

    /// A storage location was built or zoned.
    pub fn on_location_created(&self, location: LocationId) {
        if self.registry.get_or_create(location).is_none() {
            debug!(location = %location, "created location has no identity, no weights attached");
        }
    }

    /// A storage location was permanently destroyed.
    pub fn on_location_destroyed(&self, location: LocationId) {
        self.registry.remove(location);
    }

    /// The host copied storage settings from one location to another.
    ///
    /// Weights follow only while weighting is enabled for the session.
    pub fn on_settings_copied(&self, source: LocationId, target: LocationId) {
        if !self.session.is_enabled() {
            debug!(source = %source, target = %target, "weighting disabled, settings copy ignores weights");
            return;
        }
        if let Err(e) = self.registry.copy_settings(source, target) {
            warn!(error = %e, "failed to copy weights");
        }
    }

    /// The host's "clear all" filter action also clears the weights.
    pub fn on_filter_cleared(&self, location: LocationId) {
        if let Some(handle) = self.registry.get(location) {
            handle.update(WeightModel::reset_all);
        }
    }

    /// A new game starts.
    pub fn on_new_game(&self) {
        self.reset();
        info!(enabled = self.session.is_enabled(), "new game, weight registry reset");
    }

    // -------------------------------------------------------------------
    // Operator gestures
    // -------------------------------------------------------------------

    /// Apply a gesture to one item type's weight at a location.
    ///
    /// Returns the new stored weight.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::InvalidLocation`] for a nil location and
    /// [`WeightError::UnknownItemType`] when the item is not in the catalog.
    pub fn try_apply_item_gesture(
        &self,
        location: LocationId,
        item: &ItemTypeId,
        gesture: WeightGesture,
    ) -> Result<i32, WeightError> {
        let item = &self.catalog.require_item(item)?.id;
        let handle = self.registry.try_get_or_create(location)?;
        Ok(handle.update(|model| model.apply_item_gesture(item, gesture)))
    }

    /// Like [`Self::try_apply_item_gesture`], returning the default weight
    /// on bad input.
    pub fn apply_item_gesture(&self, location: LocationId, item: &ItemTypeId, gesture: WeightGesture) -> i32 {
        self.try_apply_item_gesture(location, item, gesture)
            .unwrap_or_else(|e| {
                debug!(error = %e, "item gesture ignored");
                DEFAULT_WEIGHT
            })
    }

    /// Apply a gesture to one category's weight at a location.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::InvalidLocation`] for a nil location and
    /// [`WeightError::UnknownCategory`] when the category is not in the
    /// catalog.
    pub fn try_apply_category_gesture(
        &self,
        location: LocationId,
        category: &CategoryId,
        gesture: WeightGesture,
    ) -> Result<i32, WeightError> {
        let category = &self.catalog.require_category(category)?.id;
        let handle = self.registry.try_get_or_create(location)?;
        Ok(handle.update(|model| model.apply_category_gesture(category, gesture)))
    }

    /// Like [`Self::try_apply_category_gesture`], returning the default
    /// weight on bad input.
    pub fn apply_category_gesture(
        &self,
        location: LocationId,
        category: &CategoryId,
        gesture: WeightGesture,
    ) -> i32 {
        self.try_apply_category_gesture(location, category, gesture)
            .unwrap_or_else(|e| {
                debug!(error = %e, "category gesture ignored");
                DEFAULT_WEIGHT
            })
    }

    /// Flip the session toggle and return the new state.
    pub fn toggle_session(&self) -> bool {
        self.session.toggle()
    }

    /// Registry-wide counts.
    pub fn statistics(&self) -> RegistryStatistics {
        self.registry.statistics()
    }

    // -------------------------------------------------------------------
    // Save boundaries
    // -------------------------------------------------------------------

    /// Everything to write into the host's save.
    pub fn save_game(&self) -> GameSnapshot {
        GameSnapshot {
            session: self.session.state(),
            registry: self.registry.save(),
        }
    }

    /// Restore from the host's save. `is_live` answers whether a location
    /// id still exists in the loaded game.
    pub fn load_game(&self, snapshot: &GameSnapshot, is_live: impl Fn(LocationId) -> bool) -> LoadReport {
        self.session.restore(snapshot.session);
        self.registry.load(&snapshot.registry, &self.catalog, is_live)
    }
}
