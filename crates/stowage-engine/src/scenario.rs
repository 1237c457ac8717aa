//! Scenario files and the in-memory host they describe.
//!
//! A scenario lists item and category definitions, a yard of storage
//! locations with their filters, cells and operator weights, and a queue
//! of storage jobs. [`Yard`] plays the host: it owns the locations, makes
//! the native destination choice, and answers the resolver's placement
//! checks.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use stowage_core::{PlacementHost, PriorityService, StorageCandidate};
use stowage_types::{
    Category, CategoryId, Cell, ItemType, ItemTypeId, Job, LocationId, StoragePriority,
};
use stowage_weights::{DefinitionCatalog, format_weight};

use crate::error::EngineError;

// -----------------------------------------------------------------------
// File format
// -----------------------------------------------------------------------

/// Top-level scenario document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// Category definitions.
    #[serde(default)]
    pub categories: Vec<Category>,

    /// Item type definitions.
    #[serde(default)]
    pub items: Vec<ItemType>,

    /// Storage locations in the host's listing order.
    #[serde(default)]
    pub locations: Vec<LocationDef>,

    /// Jobs to place, in order.
    #[serde(default)]
    pub jobs: Vec<JobDef>,
}

/// One storage location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocationDef {
    /// Unique name within the scenario.
    pub name: String,

    /// Base priority.
    pub priority: StoragePriority,

    /// Item types the filter admits. Absent admits everything.
    #[serde(default)]
    pub accepts: Option<Vec<ItemTypeId>>,

    /// Reference point for distance comparisons.
    pub position: Cell,

    /// Cells of the location. Defaults to just `position`.
    #[serde(default)]
    pub cells: Vec<Cell>,

    /// Cells that cannot take anything right now.
    #[serde(default)]
    pub full_cells: Vec<Cell>,

    /// Excluded from the host's candidate listing.
    #[serde(default)]
    pub hidden: bool,

    /// Operator item type weights.
    #[serde(default)]
    pub item_weights: BTreeMap<ItemTypeId, i32>,

    /// Operator category weights.
    #[serde(default)]
    pub category_weights: BTreeMap<CategoryId, i32>,

    /// Copy another location's storage settings onto this one.
    #[serde(default)]
    pub copy_settings_from: Option<String>,
}

/// One storage job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobDef {
    /// Item type to store.
    pub item: ItemTypeId,

    /// Where the item lies.
    pub at: Cell,

    /// Where the carrier stands, if the item is carried.
    #[serde(default)]
    pub carried_from: Option<Cell>,

    /// Priority of the item's current storage.
    #[serde(default)]
    pub current: StoragePriority,
}

impl JobDef {
    /// The placement request this job describes.
    pub fn to_job(&self) -> Job {
        let job = Job::at(self.item.clone(), self.at);
        match self.carried_from {
            Some(carrier) => job.carried_from(carrier),
            None => job,
        }
    }
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from YAML.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        serde_yml::from_str(yaml).map_err(|e| EngineError::Scenario {
            message: format!("failed to parse scenario YAML: {e}"),
        })
    }

    /// Build the definition catalog, rejecting items that reference
    /// undefined categories.
    pub fn catalog(&self) -> Result<DefinitionCatalog, EngineError> {
        let catalog =
            DefinitionCatalog::from_definitions(self.items.iter().cloned(), self.categories.iter().cloned());
        for item in &self.items {
            if let Some(missing) = item
                .categories
                .iter()
                .find(|category| !catalog.contains_category(category))
            {
                return Err(EngineError::Scenario {
                    message: format!("item {} references unknown category {missing}", item.id),
                });
            }
        }
        Ok(catalog)
    }
}

// -----------------------------------------------------------------------
// Host
// -----------------------------------------------------------------------

/// A storage location owned by the yard.
#[derive(Debug, Clone)]
pub struct StorageSite {
    id: LocationId,
    name: String,
    priority: StoragePriority,
    accepts: Option<BTreeSet<ItemTypeId>>,
    position: Cell,
    cells: Vec<Cell>,
    full_cells: BTreeSet<Cell>,
    hidden: bool,
}

impl StorageSite {
    fn from_def(def: &LocationDef) -> Self {
        let cells = if def.cells.is_empty() {
            vec![def.position]
        } else {
            def.cells.clone()
        };
        Self {
            id: LocationId::new(),
            name: def.name.clone(),
            priority: def.priority,
            accepts: def.accepts.as_ref().map(|items| items.iter().cloned().collect()),
            position: def.position,
            cells,
            full_cells: def.full_cells.iter().copied().collect(),
            hidden: def.hidden,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn has_room(&self) -> bool {
        self.cells.iter().any(|cell| !self.full_cells.contains(cell))
    }
}

impl StorageCandidate for StorageSite {
    fn location_id(&self) -> LocationId {
        self.id
    }

    fn base_priority(&self) -> StoragePriority {
        self.priority
    }

    fn accepts(&self, item: &ItemType) -> bool {
        self.accepts
            .as_ref()
            .is_none_or(|accepted| accepted.contains(&item.id))
    }

    fn position(&self) -> Option<Cell> {
        Some(self.position)
    }

    fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// The in-memory host: every storage location of a scenario.
#[derive(Debug, Clone, Default)]
pub struct Yard {
    sites: Vec<StorageSite>,
}

impl Yard {
    /// Build the yard. Location names must be unique.
    pub fn from_definitions(defs: &[LocationDef]) -> Result<Self, EngineError> {
        let mut seen = BTreeSet::new();
        let mut sites = Vec::with_capacity(defs.len());
        for def in defs {
            if !seen.insert(def.name.as_str()) {
                return Err(EngineError::Scenario {
                    message: format!("duplicate location name {}", def.name),
                });
            }
            sites.push(StorageSite::from_def(def));
        }
        Ok(Self { sites })
    }

    /// Look up a site by id.
    pub fn site(&self, id: LocationId) -> Option<&StorageSite> {
        self.sites.iter().find(|site| site.id == id)
    }

    /// Look up a site by name.
    pub fn site_named(&self, name: &str) -> Option<&StorageSite> {
        self.sites.iter().find(|site| site.name == name)
    }

    /// Name of a location, for logs.
    pub fn name_of(&self, id: Option<LocationId>) -> &str {
        id.and_then(|id| self.site(id)).map_or("-", StorageSite::name)
    }

    /// Whether the location still exists.
    pub fn contains(&self, id: LocationId) -> bool {
        self.site(id).is_some()
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the yard has no sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Candidate listing in the host's native order: highest priority
    /// first, file order within a priority.
    pub fn listing(&self) -> Vec<&StorageSite> {
        let mut listing: Vec<&StorageSite> = self.sites.iter().collect();
        listing.sort_by(|a, b| b.priority.cmp(&a.priority));
        listing
    }

    /// The host's own choice: the best strictly better storage with room,
    /// nearest first within a priority.
    pub fn native_destination(&self, item: &ItemType, job: &Job, current: StoragePriority) -> Option<LocationId> {
        let origin = job.effective_position()?;
        self.listing()
            .into_iter()
            .filter(|site| site.priority > current)
            .filter(|site| !site.hidden && site.accepts(item) && site.has_room())
            .fold(None::<&StorageSite>, |best, site| match best {
                Some(leader)
                    if leader.priority > site.priority
                        || (leader.priority == site.priority
                            && origin.distance_squared(leader.position)
                                <= origin.distance_squared(site.position)) =>
                {
                    Some(leader)
                }
                _ => Some(site),
            })
            .map(|site| site.id)
    }

    /// Register every site with the service and apply the scenario's
    /// weights and settings copies. Returns the number of weights set.
    pub fn install(&self, defs: &[LocationDef], service: &PriorityService) -> Result<usize, EngineError> {
        let mut applied = 0_usize;
        for (site, def) in self.sites.iter().zip(defs) {
            service.on_location_created(site.id);
            if def.item_weights.is_empty() && def.category_weights.is_empty() {
                continue;
            }
            let handle = service.registry().try_get_or_create(site.id)?;
            for (item, &weight) in &def.item_weights {
                let item = &service.catalog().require_item(item)?.id;
                let stored = handle.update(|model| model.set_item_weight(item, weight));
                debug!(location = %site.name, item = %item, weight = %format_weight(stored), "item weight set");
                applied = applied.saturating_add(1);
            }
            for (category, &weight) in &def.category_weights {
                let category = &service.catalog().require_category(category)?.id;
                let stored = handle.update(|model| model.set_category_weight(category, weight));
                debug!(location = %site.name, category = %category, weight = %format_weight(stored), "category weight set");
                applied = applied.saturating_add(1);
            }
        }

        for (site, def) in self.sites.iter().zip(defs) {
            let Some(source_name) = def.copy_settings_from.as_deref() else {
                continue;
            };
            let source = self.site_named(source_name).ok_or_else(|| EngineError::Scenario {
                message: format!("{} copies settings from unknown location {source_name}", site.name),
            })?;
            service.on_settings_copied(source.id, site.id);
        }
        Ok(applied)
    }
}

impl PlacementHost for Yard {
    fn is_exposed(&self, location: LocationId, _job: &Job) -> bool {
        self.site(location).is_some_and(|site| !site.hidden && site.has_room())
    }

    fn is_valid_cell(&self, location: LocationId, cell: Cell, _job: &Job) -> bool {
        self.site(location)
            .is_some_and(|site| site.cells.contains(&cell) && !site.full_cells.contains(&cell))
    }
}

// -----------------------------------------------------------------------
// Job runner
// -----------------------------------------------------------------------

/// Totals from a run of the job queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Jobs that ended with a destination.
    pub placed: usize,
    /// Jobs whose destination the resolver changed.
    pub redirected: usize,
    /// Jobs with nowhere to go.
    pub unplaced: usize,
}

/// Where one job ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Final destination, if any.
    pub destination: Option<LocationId>,
    /// Cell chosen by the resolver, if any.
    pub cell: Option<Cell>,
    /// Whether the resolver overrode the host.
    pub redirected: bool,
}

/// Place one job: host default first, then the resolver.
pub fn place(service: &PriorityService, yard: &Yard, def: &JobDef) -> Placement {
    let job = def.to_job();
    let Some(item) = service.catalog().item(&job.item_type) else {
        warn!(item = %job.item_type, "job for unknown item type skipped");
        return Placement {
            destination: None,
            cell: None,
            redirected: false,
        };
    };

    let native = yard.native_destination(item, &job, def.current);
    let listing = yard.listing();
    let resolution = service.resolve(yard, &job, native, &listing, def.current);
    let destination = resolution.destination().or(native);

    info!(
        item = %item.display_label(),
        native = yard.name_of(native),
        destination = yard.name_of(destination),
        cell = ?resolution.cell(),
        redirected = !resolution.is_unchanged(),
        "job placed"
    );
    Placement {
        destination,
        cell: resolution.cell(),
        redirected: !resolution.is_unchanged(),
    }
}

/// Place every job in order.
pub fn run_jobs(service: &PriorityService, yard: &Yard, jobs: &[JobDef]) -> RunSummary {
    jobs.iter()
        .map(|def| place(service, yard, def))
        .fold(RunSummary::default(), |mut summary, placement| {
            if placement.destination.is_some() {
                summary.placed = summary.placed.saturating_add(1);
            } else {
                summary.unplaced = summary.unplaced.saturating_add(1);
            }
            if placement.redirected {
                summary.redirected = summary.redirected.saturating_add(1);
            }
            summary
        })
}
