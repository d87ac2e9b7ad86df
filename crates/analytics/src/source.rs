//! Inputs to the analytics engine.

use unitrack_core::{LearnerState, Progress, Unit, UnitId, UnitSummary};

/// Read access to the data analytics are computed from.
pub trait AnalyticsSource {
    /// Listing rows of every known unit.
    fn summaries(&self) -> Vec<&UnitSummary>;

    /// Unit content by id.
    fn unit(&self, id: &UnitId) -> Option<&Unit>;

    /// Stored progress by unit id.
    fn progress(&self, id: &UnitId) -> Option<&Progress>;
}

impl AnalyticsSource for LearnerState {
    fn summaries(&self) -> Vec<&UnitSummary> {
        LearnerState::summaries(self)
    }

    fn unit(&self, id: &UnitId) -> Option<&Unit> {
        LearnerState::unit(self, id)
    }

    fn progress(&self, id: &UnitId) -> Option<&Progress> {
        LearnerState::progress(self, id)
    }
}
