//! Transfer document: the versioned envelope holding the whole learner state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unitrack_core::{LearnerState, Progress, Time, Unit, UnitEntry, UnitId, UnitSummary};

/// Format revision written by this crate. Revision 2 carries unit content.
pub const CURRENT_VERSION: u32 = 2;

fn legacy_version() -> u32 {
    1
}

/// Everything exported for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEntry {
    /// Listing row
    pub unit_summary: UnitSummary,

    /// Learner progress, absent for untouched units
    #[serde(default)]
    pub progress: Option<Progress>,

    /// Unit content (revision 2 and later)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_data: Option<Unit>,
}

/// Full export of a learner's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDocument {
    /// Format revision, 1 when absent
    #[serde(default = "legacy_version")]
    pub version: u32,

    /// When the export was taken
    pub export_date: Time,

    /// Number of units in the export
    pub total_units: usize,

    /// Entries by unit id
    pub units: BTreeMap<UnitId, TransferEntry>,
}

impl TransferDocument {
    /// Export `state` as of `now`.
    pub fn from_state(state: &LearnerState, now: Time) -> Self {
        let units: BTreeMap<UnitId, TransferEntry> = state
            .units
            .iter()
            .map(|(id, entry)| {
                (
                    id.clone(),
                    TransferEntry {
                        unit_summary: entry.summary.clone(),
                        progress: entry.progress.clone(),
                        unit_data: entry.unit.clone(),
                    },
                )
            })
            .collect();

        Self {
            version: CURRENT_VERSION,
            export_date: now,
            total_units: units.len(),
            units,
        }
    }

    /// Rebuild learner state, recomputing every summary.
    ///
    /// The map key is the unit's identity; summaries and progress recorded
    /// under a different id are rekeyed to it.
    pub fn into_state(self) -> LearnerState {
        let mut state = LearnerState::new();
        for (id, entry) in self.units {
            let mut summary = entry.unit_summary;
            summary.id = id.clone();
            let progress = entry.progress.map(|mut p| {
                p.unit_id = id.clone();
                p
            });
            let mut unit_entry = UnitEntry {
                summary,
                unit: entry.unit_data,
                progress,
            };
            unit_entry.reconcile();
            state.insert(unit_entry);
        }
        state
    }
}
