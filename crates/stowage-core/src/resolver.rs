//! Destination search under weighted scoring.
//!
//! The host proposes a destination for each storage job. When weighting is
//! in play, [`DestinationResolver`] rescores every candidate the host would
//! consider, picks the best by score and then by distance, and chooses the
//! nearest valid cell inside the winner.
//!
//! # Ordering
//!
//! Candidates are visited in the host's listing order. A later candidate
//! replaces the running best only when its score is strictly higher, or
//! the scores are equal and it is strictly closer. Exact ties keep the
//! first one seen, so the same inputs always produce the same answer.

use serde::Serialize;
use tracing::{debug, info, warn};

use stowage_types::{Cell, ItemType, Job, LocationId, StoragePriority};
use stowage_weights::{DefinitionCatalog, ScoreBreakdown, WeightModel, WeightRegistry};

use crate::config::RescanTrigger;
use crate::error::ResolveError;
use crate::host::{PlacementHost, StorageCandidate};
use crate::session::SessionSettings;

/// Outcome of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Keep the host's own choice.
    Unchanged,
    /// Send the item somewhere else.
    Redirect {
        /// The winning location.
        destination: LocationId,
        /// Nearest valid cell inside it. `None` leaves cell selection to
        /// the host.
        cell: Option<Cell>,
        /// The winner's effective score.
        score: i32,
    },
}

impl Resolution {
    /// Whether the host's choice stands.
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// The redirected destination, if any.
    pub const fn destination(&self) -> Option<LocationId> {
        match self {
            Self::Unchanged => None,
            Self::Redirect { destination, .. } => Some(*destination),
        }
    }

    /// The redirected cell, if one was chosen.
    pub const fn cell(&self) -> Option<Cell> {
        match self {
            Self::Unchanged => None,
            Self::Redirect { cell, .. } => *cell,
        }
    }
}

/// Running best during the scan.
struct Leader<'c, C> {
    candidate: &'c C,
    location: LocationId,
    score: i32,
    distance: i64,
}

impl<C> Leader<'_, C> {
    const fn is_beaten_by(&self, score: i32, distance: i64) -> bool {
        score > self.score || (score == self.score && distance < self.distance)
    }
}

/// Weighted destination search over borrowed engine state.
///
/// Cheap to build; construct one per placement pass.
#[derive(Debug, Clone, Copy)]
pub struct DestinationResolver<'a> {
    registry: &'a WeightRegistry,
    catalog: &'a DefinitionCatalog,
    session: &'a SessionSettings,
    trigger: RescanTrigger,
}

impl<'a> DestinationResolver<'a> {
    /// Create a resolver.
    pub const fn new(
        registry: &'a WeightRegistry,
        catalog: &'a DefinitionCatalog,
        session: &'a SessionSettings,
        trigger: RescanTrigger,
    ) -> Self {
        Self {
            registry,
            catalog,
            session,
            trigger,
        }
    }

    /// Resolve a destination, falling back to [`Resolution::Unchanged`] on
    /// any fault.
    ///
    /// `min_priority` is the rank of the job's current assignment; nothing
    /// scoring below it is ever chosen.
    pub fn resolve<C: StorageCandidate>(
        &self,
        host: &impl PlacementHost,
        job: &Job,
        default_destination: Option<LocationId>,
        candidates: &[C],
        min_priority: StoragePriority,
    ) -> Resolution {
        match self.try_resolve(host, job, default_destination, candidates, min_priority) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(item = %job.item_type, error = %e, "resolution aborted, keeping host destination");
                Resolution::Unchanged
            }
        }
    }

    /// Resolve a destination, reporting scan faults.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ScanFault`] for a candidate with a nil id or
    /// no position, and [`ResolveError::MissingJobPosition`] when the job
    /// has nothing to measure distance from.
    pub fn try_resolve<C: StorageCandidate>(
        &self,
        host: &impl PlacementHost,
        job: &Job,
        default_destination: Option<LocationId>,
        candidates: &[C],
        min_priority: StoragePriority,
    ) -> Result<Resolution, ResolveError> {
        if !self.session.is_enabled() {
            return Ok(Resolution::Unchanged);
        }
        let Some(default_destination) = default_destination else {
            return Ok(Resolution::Unchanged);
        };
        let Some(item) = self.catalog.item(&job.item_type) else {
            debug!(item = %job.item_type, "item type not in catalog");
            return Ok(Resolution::Unchanged);
        };
        if !self.should_rescan(default_destination, candidates) {
            return Ok(Resolution::Unchanged);
        }

        let origin = job
            .effective_position()
            .ok_or_else(|| ResolveError::MissingJobPosition {
                item: job.item_type.clone(),
            })?;

        let Some(winner) = self.scan(host, job, item, origin, candidates, min_priority.rank())? else {
            return Ok(Resolution::Unchanged);
        };
        if winner.location == default_destination {
            return Ok(Resolution::Unchanged);
        }

        let cell = nearest_valid_cell(host, winner.location, winner.candidate.cells(), origin, job);
        info!(
            item = %job.item_type,
            from = %default_destination,
            to = %winner.location,
            score = winner.score,
            cell = ?cell,
            "storage destination redirected"
        );
        Ok(Resolution::Redirect {
            destination: winner.location,
            cell,
            score: winner.score,
        })
    }

    /// Effective score breakdown for one location and item.
    ///
    /// A location without a model scores as unweighted.
    pub fn score_of(&self, location: LocationId, base_rank: i32, item: &ItemType) -> ScoreBreakdown {
        self.registry.get(location).map_or_else(
            || WeightModel::new().explain(base_rank, item),
            |handle| handle.read(|model| model.explain(base_rank, item)),
        )
    }

    fn should_rescan<C: StorageCandidate>(&self, default_destination: LocationId, candidates: &[C]) -> bool {
        match self.trigger {
            RescanTrigger::DefaultDestination => self
                .registry
                .get(default_destination)
                .is_some_and(|handle| handle.has_any_override()),
            RescanTrigger::AnyCandidate => self.registry.any_override_among(
                std::iter::once(default_destination).chain(candidates.iter().map(StorageCandidate::location_id)),
            ),
        }
    }

    fn scan<'c, C: StorageCandidate>(
        &self,
        host: &impl PlacementHost,
        job: &Job,
        item: &ItemType,
        origin: Cell,
        candidates: &'c [C],
        min_rank: i32,
    ) -> Result<Option<Leader<'c, C>>, ResolveError> {
        let mut best: Option<Leader<'c, C>> = None;

        for candidate in candidates {
            let location = candidate.location_id();
            if location.is_nil() {
                return Err(ResolveError::ScanFault {
                    location,
                    reason: "candidate has no identity".to_owned(),
                });
            }
            if !candidate.accepts(item) || !host.is_exposed(location, job) {
                continue;
            }

            let breakdown = self.score_of(location, candidate.base_priority().rank(), item);
            debug!(
                location = %location,
                item = %item.id,
                source = ?breakdown.source,
                "{breakdown}"
            );
            if breakdown.effective < min_rank {
                continue;
            }

            let position = candidate.position().ok_or_else(|| ResolveError::ScanFault {
                location,
                reason: "candidate has no position".to_owned(),
            })?;
            let distance = origin.distance_squared(position);

            if best.as_ref().is_none_or(|leader| leader.is_beaten_by(breakdown.effective, distance)) {
                best = Some(Leader {
                    candidate,
                    location,
                    score: breakdown.effective,
                    distance,
                });
            }
        }

        Ok(best)
    }
}

/// Nearest cell the host accepts. First in listing order wins exact ties.
fn nearest_valid_cell(
    host: &impl PlacementHost,
    location: LocationId,
    cells: &[Cell],
    origin: Cell,
    job: &Job,
) -> Option<Cell> {
    cells
        .iter()
        .copied()
        .filter(|&cell| host.is_valid_cell(location, cell, job))
        .min_by_key(|&cell| origin.distance_squared(cell))
}
