//! End-to-end resolution scenarios through [`PriorityService`].
//!
//! Each test builds a small yard of storage locations, sets operator
//! weights through the gesture hooks, and checks where the resolver sends
//! a job.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use std::collections::BTreeSet;

use stowage_core::{
    PlacementHost, PriorityService, RescanTrigger, Resolution, ResolveError, StorageCandidate,
    StowageConfig,
};
use stowage_types::{
    Category, CategoryId, Cell, ItemType, ItemTypeId, Job, LocationId, StoragePriority,
    WeightGesture,
};
use stowage_weights::DefinitionCatalog;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Stockpile {
    id: LocationId,
    priority: StoragePriority,
    accepts: BTreeSet<ItemTypeId>,
    position: Cell,
    cells: Vec<Cell>,
}

impl Stockpile {
    fn new(priority: StoragePriority, x: i32, z: i32) -> Self {
        Self {
            id: LocationId::new(),
            priority,
            accepts: BTreeSet::from([ItemTypeId::new("Steel"), ItemTypeId::new("Wood")]),
            position: Cell::new(x, z),
            cells: vec![Cell::new(x, z), Cell::new(x.saturating_add(1), z)],
        }
    }

    fn refusing(mut self, item: &str) -> Self {
        self.accepts.remove(&ItemTypeId::new(item));
        self
    }
}

impl StorageCandidate for Stockpile {
    fn location_id(&self) -> LocationId {
        self.id
    }

    fn base_priority(&self) -> StoragePriority {
        self.priority
    }

    fn accepts(&self, item: &ItemType) -> bool {
        self.accepts.contains(&item.id)
    }

    fn position(&self) -> Option<Cell> {
        Some(self.position)
    }

    fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[derive(Default)]
struct Colony {
    hidden: BTreeSet<LocationId>,
    full_cells: BTreeSet<(i32, i32)>,
}

impl PlacementHost for Colony {
    fn is_exposed(&self, location: LocationId, _job: &Job) -> bool {
        !self.hidden.contains(&location)
    }

    fn is_valid_cell(&self, _location: LocationId, cell: Cell, _job: &Job) -> bool {
        !self.full_cells.contains(&(cell.x, cell.z))
    }
}

fn catalog() -> DefinitionCatalog {
    DefinitionCatalog::from_definitions(
        [
            ItemType::new(
                "Steel",
                vec![CategoryId::new("Metals"), CategoryId::new("ResourcesRaw")],
            ),
            ItemType::new("Wood", vec![CategoryId::new("ResourcesRaw")]),
        ],
        [Category::new("Metals"), Category::new("ResourcesRaw")],
    )
}

fn service() -> PriorityService {
    PriorityService::new(StowageConfig::default(), catalog())
}

fn raise(svc: &PriorityService, location: LocationId, item: &str, times: usize) {
    for _ in 0..times {
        svc.apply_item_gesture(location, &ItemTypeId::new(item), WeightGesture::Raise);
    }
}

fn steel_at_origin() -> Job {
    Job::at("Steel", Cell::new(0, 0))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn weighted_incumbent_stays_until_outscored() {
    let svc = service();
    let near = Stockpile::new(StoragePriority::Normal, 2, 0);
    let far = Stockpile::new(StoragePriority::Normal, 20, 0);
    raise(&svc, far.id, "Steel", 3);

    // The host proposed the far location, so the fast path does not apply.
    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(far.id),
        &[&near, &far],
        StoragePriority::Unstored,
    );
    assert_eq!(outcome, Resolution::Unchanged);

    // A weighted incumbent loses the rescan when something else wins.
    let mut lowered = far;
    lowered.priority = StoragePriority::Low;
    svc.apply_item_gesture(lowered.id, &ItemTypeId::new("Steel"), WeightGesture::Reset);
    svc.apply_item_gesture(lowered.id, &ItemTypeId::new("Steel"), WeightGesture::Lower);
    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(lowered.id),
        &[&near, &lowered],
        StoragePriority::Unstored,
    );
    assert_eq!(outcome.destination(), Some(near.id));
}

#[test]
fn host_default_near_is_redirected_to_weighted_far() {
    let config = StowageConfig::parse("resolver:\n  rescan_trigger: any_candidate\n").unwrap();
    let svc = PriorityService::new(config, catalog());
    let near = Stockpile::new(StoragePriority::Normal, 2, 0);
    let far = Stockpile::new(StoragePriority::Normal, 20, 0);
    raise(&svc, far.id, "Steel", 3);

    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(near.id),
        &[&near, &far],
        StoragePriority::Unstored,
    );
    assert_eq!(
        outcome,
        Resolution::Redirect {
            destination: far.id,
            cell: Some(Cell::new(20, 0)),
            score: 5,
        }
    );
}

#[test]
fn refusing_candidate_is_never_chosen() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 1, 0);
    let picky = Stockpile::new(StoragePriority::Critical, 3, 0).refusing("Steel");
    raise(&svc, home.id, "Steel", 1);
    raise(&svc, picky.id, "Steel", 3);

    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(home.id),
        &[&home, &picky],
        StoragePriority::Unstored,
    );
    assert!(outcome.is_unchanged());
}

#[test]
fn hidden_candidate_is_skipped() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 1, 0);
    let hidden = Stockpile::new(StoragePriority::Critical, 3, 0);
    raise(&svc, home.id, "Steel", 1);

    let colony = Colony {
        hidden: BTreeSet::from([hidden.id]),
        ..Colony::default()
    };
    let outcome = svc.resolve(
        &colony,
        &steel_at_origin(),
        Some(home.id),
        &[&home, &hidden],
        StoragePriority::Unstored,
    );
    assert!(outcome.is_unchanged());
}

#[test]
fn never_selects_below_min_priority() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Preferred, 1, 0);
    let other = Stockpile::new(StoragePriority::Normal, 2, 0);
    // home drops to 3 - 3 = 0, other stays at 2. Both are below Important.
    svc.apply_item_gesture(home.id, &ItemTypeId::new("Steel"), WeightGesture::Lower);
    svc.apply_item_gesture(home.id, &ItemTypeId::new("Steel"), WeightGesture::Lower);
    svc.apply_item_gesture(home.id, &ItemTypeId::new("Steel"), WeightGesture::Lower);

    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(home.id),
        &[&home, &other],
        StoragePriority::Important,
    );
    assert!(outcome.is_unchanged());

    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(home.id),
        &[&home, &other],
        StoragePriority::Normal,
    );
    assert_eq!(outcome.destination(), Some(other.id));
}

#[test]
fn equal_scores_prefer_closer_then_earlier() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 0, 1);
    let far = Stockpile::new(StoragePriority::Important, 9, 0);
    let left = Stockpile::new(StoragePriority::Important, -4, 0);
    let right = Stockpile::new(StoragePriority::Important, 4, 0);
    raise(&svc, home.id, "Steel", 1);

    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(home.id),
        &[&home, &far, &left, &right],
        StoragePriority::Unstored,
    );
    assert_eq!(outcome.destination(), Some(left.id));

    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(home.id),
        &[&home, &far, &right, &left],
        StoragePriority::Unstored,
    );
    assert_eq!(outcome.destination(), Some(right.id));
}

#[test]
fn category_weights_lift_a_location() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Normal, 1, 0);
    let metals = Stockpile::new(StoragePriority::Low, 8, 0);
    raise(&svc, home.id, "Steel", 1);
    for _ in 0..2 {
        svc.apply_category_gesture(metals.id, &CategoryId::new("Metals"), WeightGesture::Raise);
        svc.apply_category_gesture(metals.id, &CategoryId::new("ResourcesRaw"), WeightGesture::Raise);
    }

    // home: 2 + 1 = 3, metals: 1 + clamp(2 + 2) = 4
    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(home.id),
        &[&home, &metals],
        StoragePriority::Unstored,
    );
    assert_eq!(outcome.destination(), Some(metals.id));
}

#[test]
fn resolution_is_deterministic() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Normal, 1, 1);
    let a = Stockpile::new(StoragePriority::Important, 5, 5);
    let b = Stockpile::new(StoragePriority::Important, -5, 5);
    raise(&svc, home.id, "Steel", 1);

    let candidates = [&home, &a, &b];
    let job = steel_at_origin();
    let first = svc.resolve(&Colony::default(), &job, Some(home.id), &candidates, StoragePriority::Unstored);
    let second = svc.resolve(&Colony::default(), &job, Some(home.id), &candidates, StoragePriority::Unstored);
    assert_eq!(first, second);
    assert!(!first.is_unchanged());
}

#[test]
fn disabled_session_defers_to_host() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 1, 0);
    let better = Stockpile::new(StoragePriority::Critical, 2, 0);
    raise(&svc, home.id, "Steel", 1);
    assert!(!svc.toggle_session());

    let outcome = svc.resolve(
        &Colony::default(),
        &steel_at_origin(),
        Some(home.id),
        &[&home, &better],
        StoragePriority::Unstored,
    );
    assert!(outcome.is_unchanged());
}

#[test]
fn unknown_item_and_missing_default_defer_to_host() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 1, 0);
    let better = Stockpile::new(StoragePriority::Critical, 2, 0);
    raise(&svc, home.id, "Steel", 1);

    let gold = Job::at("Gold", Cell::new(0, 0));
    let outcome = svc.resolve(&Colony::default(), &gold, Some(home.id), &[&home, &better], StoragePriority::Unstored);
    assert!(outcome.is_unchanged());

    let outcome = svc.resolve(&Colony::default(), &steel_at_origin(), None, &[&home, &better], StoragePriority::Unstored);
    assert!(outcome.is_unchanged());
}

#[test]
fn carrier_position_drives_distance() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 0, 5);
    let west = Stockpile::new(StoragePriority::Important, -10, 0);
    let east = Stockpile::new(StoragePriority::Important, 10, 0);
    raise(&svc, home.id, "Steel", 1);

    let job = Job::at("Steel", Cell::new(-9, 0)).carried_from(Cell::new(9, 0));
    let outcome = svc.resolve(&Colony::default(), &job, Some(home.id), &[&home, &west, &east], StoragePriority::Unstored);
    assert_eq!(outcome.destination(), Some(east.id));
}

#[test]
fn job_without_position_is_a_fault() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 0, 5);
    raise(&svc, home.id, "Steel", 1);

    let job = Job {
        item_type: ItemTypeId::new("Steel"),
        item_position: None,
        carrier_position: None,
    };
    let result = svc
        .resolver()
        .try_resolve(&Colony::default(), &job, Some(home.id), &[&home], StoragePriority::Unstored);
    assert!(matches!(result, Err(ResolveError::MissingJobPosition { .. })));
}

#[test]
fn no_valid_cell_keeps_destination_without_cell() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 0, 5);
    let full = Stockpile::new(StoragePriority::Critical, 3, 0);
    raise(&svc, home.id, "Steel", 1);

    let colony = Colony {
        full_cells: BTreeSet::from([(3, 0), (4, 0)]),
        ..Colony::default()
    };
    let outcome = svc.resolve(&colony, &steel_at_origin(), Some(home.id), &[&home, &full], StoragePriority::Unstored);
    assert_eq!(outcome.destination(), Some(full.id));
    assert_eq!(outcome.cell(), None);
}

#[test]
fn resolving_does_not_create_models() {
    let svc = service();
    let home = Stockpile::new(StoragePriority::Low, 0, 5);
    let others: Vec<Stockpile> = (1..=5)
        .map(|x| Stockpile::new(StoragePriority::Normal, x, 0))
        .collect();
    raise(&svc, home.id, "Steel", 1);

    let mut candidates: Vec<&Stockpile> = vec![&home];
    candidates.extend(others.iter());
    let _ = svc.resolve(&Colony::default(), &steel_at_origin(), Some(home.id), &candidates, StoragePriority::Unstored);
    assert_eq!(svc.registry().len(), 1);
}

#[test]
fn default_trigger_is_default_destination() {
    assert_eq!(
        service().config().resolver.rescan_trigger,
        RescanTrigger::DefaultDestination
    );
}
