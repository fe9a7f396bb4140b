//! `Registry` — the ordered set of intersections taking part in a run.

use std::collections::BTreeMap;

use tl_core::IntersectionId;
use tl_scan::Scanner;

use crate::{Intersection, SetupOutcome};

/// Operative intersections in ascending id order, plus the setup outcomes
/// of those that were excluded.
///
/// Owned by the controller for the whole run; nothing is added or removed
/// once the run starts.
#[derive(Debug, Default)]
pub struct Registry {
    intersections: Vec<Intersection>,
    excluded:      Vec<SetupOutcome>,
}

impl Registry {
    /// Split setup outcomes into operative intersections and exclusions.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = SetupOutcome>) -> Self {
        let mut registry = Registry::default();
        for outcome in outcomes {
            match outcome {
                SetupOutcome::Ready(ix) => registry.intersections.push(ix),
                other => registry.excluded.push(other),
            }
        }
        registry.intersections.sort_by_key(Intersection::id);
        registry
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Intersections that were skipped or failed at setup.
    pub fn excluded(&self) -> &[SetupOutcome] {
        &self.excluded
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Intersection> {
        self.intersections.iter_mut()
    }

    pub fn get(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.iter().find(|ix| ix.id() == id)
    }

    /// The first registered (lowest-id) intersection.
    pub fn first(&self) -> Option<&Intersection> {
        self.intersections.first()
    }

    /// The lowest-id intersection other than `id`, if any.
    pub fn other(&self, id: IntersectionId) -> Option<IntersectionId> {
        self.intersections.iter().map(Intersection::id).find(|&other| other != id)
    }

    pub fn scanner_count(&self) -> usize {
        self.intersections.iter().map(|ix| ix.scanners().len()).sum()
    }

    /// Every scanner of every intersection, in registry order.
    pub fn scanners_mut(&mut self) -> impl Iterator<Item = &mut Scanner> {
        self.intersections.iter_mut().flat_map(|ix| ix.scanners_mut().iter_mut())
    }

    /// Aggregate vehicle count per intersection from the last collection.
    pub fn totals(&self) -> BTreeMap<IntersectionId, u64> {
        self.intersections
            .iter()
            .map(|ix| (ix.id(), ix.total_vehicles()))
            .collect()
    }
}
