//! Multi-unit learner state.

use std::collections::BTreeMap;

use crate::id::UnitId;
use crate::progress::Progress;
use crate::summary::UnitSummary;
use crate::unit::Unit;

/// Everything known about one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitEntry {
    /// Listing projection
    pub summary: UnitSummary,

    /// Unit content, when available
    pub unit: Option<Unit>,

    /// Learner progress, when the unit has been touched
    pub progress: Option<Progress>,
}

impl UnitEntry {
    /// Recompute the summary cache from content and progress.
    pub fn reconcile(&mut self) {
        self.summary.project(self.unit.as_ref(), self.progress.as_ref());
    }
}

/// The whole catalogue plus all progress, keyed by unit id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearnerState {
    /// Entries by unit id
    pub units: BTreeMap<UnitId, UnitEntry>,
}

impl LearnerState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, entry: UnitEntry) {
        self.units.insert(entry.summary.id.clone(), entry);
    }

    /// Summaries in unit id order.
    pub fn summaries(&self) -> Vec<&UnitSummary> {
        self.units.values().map(|e| &e.summary).collect()
    }

    /// Unit content by id.
    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.get(id).and_then(|e| e.unit.as_ref())
    }

    /// Progress by unit id.
    pub fn progress(&self, id: &UnitId) -> Option<&Progress> {
        self.units.get(id).and_then(|e| e.progress.as_ref())
    }

    /// Recompute every summary cache.
    pub fn reconcile(&mut self) {
        for entry in self.units.values_mut() {
            entry.reconcile();
        }
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when there are no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
