//! Unit catalogue and summary cache.
//!
//! Storage layout:
//! - `units`: every uploaded [`Unit`]
//! - `unit-summaries`: the [`UnitSummary`] listing rows
//! - `progress-<unitId>`: one [`Progress`] document per touched unit

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use unitrack_core::{
    Clock, LearnerState, Progress, Unit, UnitEntry, UnitId, UnitSummary, UnitValidationError,
};
use unitrack_storage::{read_json, write_json, KeyValueStore};

use crate::error::{ProgressError, Result};

/// Key holding the unit catalogue.
pub const UNITS_KEY: &str = "units";

/// Key holding the unit summaries.
pub const SUMMARIES_KEY: &str = "unit-summaries";

const PROGRESS_PREFIX: &str = "progress-";

/// Storage key of a unit's progress document.
pub fn progress_key(unit_id: &UnitId) -> String {
    format!("{}{}", PROGRESS_PREFIX, unit_id)
}

/// Uploaded units, their summaries, and access to stored progress.
#[derive(Clone)]
pub struct UnitCatalog {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl UnitCatalog {
    /// Create a catalogue over `storage`.
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Underlying store.
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Time source.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// All uploaded units.
    pub async fn units(&self) -> Result<Vec<Unit>> {
        self.read_list(UNITS_KEY).await
    }

    /// A unit by id.
    pub async fn unit(&self, id: &UnitId) -> Result<Option<Unit>> {
        Ok(self.units().await?.into_iter().find(|u| &u.id == id))
    }

    /// All summaries, in the order units were added.
    pub async fn summaries(&self) -> Result<Vec<UnitSummary>> {
        self.read_list(SUMMARIES_KEY).await
    }

    /// Validate and store a unit, creating or refreshing its summary.
    ///
    /// Re-uploading a unit keeps its `date_added` and recomputes the counts
    /// against the existing progress.
    pub async fn add_unit(&self, unit: Unit) -> Result<UnitSummary> {
        unit.validate()?;

        let mut units = self.units().await?;
        match units.iter_mut().find(|u| u.id == unit.id) {
            Some(existing) => *existing = unit.clone(),
            None => units.push(unit.clone()),
        }

        let progress = self.load_progress(&unit.id).await?;
        let mut summaries = self.summaries().await?;
        let summary = match summaries.iter_mut().find(|s| s.id == unit.id) {
            Some(existing) => {
                existing.project(Some(&unit), progress.as_ref());
                existing.clone()
            }
            None => {
                let mut summary = UnitSummary::for_unit(&unit, self.clock.now());
                summary.project(Some(&unit), progress.as_ref());
                summaries.push(summary.clone());
                summary
            }
        };

        write_json(self.storage.as_ref(), UNITS_KEY, &units).await?;
        write_json(self.storage.as_ref(), SUMMARIES_KEY, &summaries).await?;

        info!(unit_id = %unit.id, total_tasks = summary.total_tasks, "Unit added");
        Ok(summary)
    }

    /// Remove a unit, its summary and its progress. Returns false when the
    /// unit was unknown.
    pub async fn remove_unit(&self, id: &UnitId) -> Result<bool> {
        let mut units = self.units().await?;
        let mut summaries = self.summaries().await?;
        let before = units.len() + summaries.len();

        units.retain(|u| &u.id != id);
        summaries.retain(|s| &s.id != id);
        let removed = units.len() + summaries.len() != before;

        write_json(self.storage.as_ref(), UNITS_KEY, &units).await?;
        write_json(self.storage.as_ref(), SUMMARIES_KEY, &summaries).await?;
        self.storage.remove(&progress_key(id)).await?;

        if removed {
            info!(unit_id = %id, "Unit removed");
        }
        Ok(removed)
    }

    /// Stored progress for a unit.
    ///
    /// A document that no longer parses is logged and treated as absent so a
    /// corrupt record never blocks the learner.
    pub async fn load_progress(&self, id: &UnitId) -> Result<Option<Progress>> {
        let Some(raw) = self.storage.get(&progress_key(id)).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(progress) => Ok(Some(progress)),
            Err(e) => {
                warn!(unit_id = %id, error = %e, "Discarding unreadable progress");
                Ok(None)
            }
        }
    }

    /// Write a unit's progress document.
    pub async fn save_progress(&self, progress: &Progress) -> Result<()> {
        write_json(self.storage.as_ref(), &progress_key(&progress.unit_id), progress).await?;
        Ok(())
    }

    /// Bring one summary in line with `progress`.
    pub async fn refresh_summary(&self, progress: &Progress) -> Result<()> {
        let mut summaries = self.summaries().await?;
        let Some(summary) = summaries.iter_mut().find(|s| s.id == progress.unit_id) else {
            debug!(unit_id = %progress.unit_id, "No summary to refresh");
            return Ok(());
        };
        summary.project(None, Some(progress));
        write_json(self.storage.as_ref(), SUMMARIES_KEY, &summaries).await?;
        Ok(())
    }

    /// Recompute every summary from units and stored progress.
    pub async fn recalculate(&self) -> Result<Vec<UnitSummary>> {
        let units = self.units().await?;
        let mut summaries = self.summaries().await?;
        for summary in summaries.iter_mut() {
            let unit = units.iter().find(|u| u.id == summary.id);
            let progress = self.load_progress(&summary.id).await?;
            summary.project(unit, progress.as_ref());
        }
        write_json(self.storage.as_ref(), SUMMARIES_KEY, &summaries).await?;
        Ok(summaries)
    }

    /// Everything in the catalogue as one in-memory state.
    pub async fn snapshot(&self) -> Result<LearnerState> {
        let mut units = self.units().await?;
        let mut state = LearnerState::new();
        for summary in self.summaries().await? {
            let unit = units
                .iter()
                .position(|u| u.id == summary.id)
                .map(|i| units.swap_remove(i));
            let progress = self.load_progress(&summary.id).await?;
            state.insert(UnitEntry { summary, unit, progress });
        }

        // Units uploaded without a summary row still belong in the state.
        let now = self.clock.now();
        for unit in units {
            let progress = self.load_progress(&unit.id).await?;
            let mut entry = UnitEntry {
                summary: UnitSummary::for_unit(&unit, now),
                unit: Some(unit),
                progress,
            };
            entry.reconcile();
            state.insert(entry);
        }
        Ok(state)
    }

    /// Replace the whole catalogue and all progress with `state`.
    ///
    /// Every unit id is checked and summaries are recomputed before anything
    /// is written. Progress for units absent from `state` is deleted last.
    pub async fn replace_all(&self, mut state: LearnerState) -> Result<()> {
        for id in state.units.keys() {
            if id.is_blank() {
                return Err(UnitValidationError::MissingId.into());
            }
            if !id.is_path_safe() {
                return Err(UnitValidationError::UnsafeId(id.clone()).into());
            }
        }
        state.reconcile();

        let units: Vec<&Unit> = state.units.values().filter_map(|e| e.unit.as_ref()).collect();
        let summaries: Vec<&UnitSummary> = state.summaries();

        for entry in state.units.values() {
            match &entry.progress {
                Some(progress) if progress.unit_id == entry.summary.id => {
                    self.save_progress(progress).await?
                }
                Some(progress) => {
                    let mut progress = progress.clone();
                    progress.unit_id = entry.summary.id.clone();
                    self.save_progress(&progress).await?
                }
                None => self.storage.remove(&progress_key(&entry.summary.id)).await?,
            }
        }
        write_json(self.storage.as_ref(), UNITS_KEY, &units).await?;
        write_json(self.storage.as_ref(), SUMMARIES_KEY, &summaries).await?;

        let keep: HashSet<String> = state.units.keys().map(progress_key).collect();
        for key in self.storage.keys().await? {
            if key.starts_with(PROGRESS_PREFIX) && !keep.contains(&key) {
                self.storage.remove(&key).await?;
            }
        }

        info!(units = state.len(), "Catalogue replaced");
        Ok(())
    }

    /// Look up a unit or fail with `UnitNotFound`.
    pub async fn require_unit(&self, id: &UnitId) -> Result<Unit> {
        self.unit(id)
            .await?
            .ok_or_else(|| ProgressError::UnitNotFound(id.clone()))
    }

    async fn read_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match read_json::<Vec<T>>(self.storage.as_ref(), key).await {
            Ok(list) => Ok(list.unwrap_or_default()),
            Err(unitrack_storage::StorageError::Json(e)) => {
                warn!(key, error = %e, "Discarding unreadable list");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_clock, sample_unit};
    use unitrack_core::{StudentAnswer, TaskId};
    use unitrack_storage::MemoryStore;

    fn catalog() -> (UnitCatalog, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (UnitCatalog::new(storage.clone(), fixed_clock()), storage)
    }

    #[tokio::test]
    async fn test_add_unit_creates_summary_with_unique_total() {
        let (catalog, _) = catalog();
        let summary = catalog.add_unit(sample_unit("u1", &[&["t1", "t2"], &["t2", "t3"]])).await.unwrap();

        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.completed_tasks, 0);
        assert_eq!(catalog.units().await.unwrap().len(), 1);
        assert_eq!(catalog.summaries().await.unwrap(), vec![summary]);
    }

    #[tokio::test]
    async fn test_add_unit_rejects_invalid() {
        let (catalog, _) = catalog();
        let mut unit = sample_unit("u1", &[&["t1"]]);
        unit.learning_outcomes.clear();
        let err = catalog.add_unit(unit).await.unwrap_err();
        assert!(matches!(err, ProgressError::InvalidUnit(_)));
    }

    #[tokio::test]
    async fn test_reupload_keeps_date_added() {
        let (catalog, _) = catalog();
        let first = catalog.add_unit(sample_unit("u1", &[&["t1"]])).await.unwrap();
        let second = catalog.add_unit(sample_unit("u1", &[&["t1", "t2"]])).await.unwrap();

        assert_eq!(second.date_added, first.date_added);
        assert_eq!(second.total_tasks, 2);
        assert_eq!(catalog.summaries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unit_drops_progress() {
        let (catalog, storage) = catalog();
        catalog.add_unit(sample_unit("u1", &[&["t1"]])).await.unwrap();
        let progress = Progress::new(UnitId::from("u1"), catalog.clock().now());
        catalog.save_progress(&progress).await.unwrap();

        assert!(catalog.remove_unit(&UnitId::from("u1")).await.unwrap());
        assert!(catalog.units().await.unwrap().is_empty());
        assert!(storage.get("progress-u1").await.unwrap().is_none());
        assert!(!catalog.remove_unit(&UnitId::from("u1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_progress_is_treated_as_absent() {
        let (catalog, storage) = catalog();
        storage.set("progress-u1", "{not json").await.unwrap();
        assert!(catalog.load_progress(&UnitId::from("u1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_all_reconciles_and_drops_stale_progress() {
        let (catalog, storage) = catalog();
        catalog.add_unit(sample_unit("old", &[&["t1"]])).await.unwrap();
        catalog
            .save_progress(&Progress::new(UnitId::from("old"), catalog.clock().now()))
            .await
            .unwrap();

        let now = catalog.clock().now();
        let unit = sample_unit("u1", &[&["t1", "t2"]]);
        let mut progress = Progress::new(UnitId::from("u1"), now);
        let mut answer = StudentAnswer::new(TaskId::from("t1"), "x", now);
        answer.is_good_enough = true;
        progress.answers.push(answer);

        let mut summary = UnitSummary::for_unit(&unit, now);
        summary.completed_tasks = 7;
        let mut state = LearnerState::new();
        state.insert(UnitEntry { summary, unit: Some(unit), progress: Some(progress) });

        catalog.replace_all(state).await.unwrap();

        let summaries = catalog.summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].completed_tasks, 1);
        assert!(storage.get("progress-old").await.unwrap().is_none());
        assert!(storage.get("progress-u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_replace_all_with_unsafe_id_writes_nothing() {
        let (catalog, storage) = catalog();
        catalog.add_unit(sample_unit("old", &[&["t1"]])).await.unwrap();
        let before = catalog.snapshot().await.unwrap();
        let mut keys_before = storage.keys().await.unwrap();
        keys_before.sort();

        let now = catalog.clock().now();
        let mut state = LearnerState::new();
        for id in ["a-first", "BTEC/5"] {
            let unit = sample_unit(id, &[&["t1"]]);
            state.insert(UnitEntry {
                summary: UnitSummary::for_unit(&unit, now),
                progress: Some(Progress::new(unit.id.clone(), now)),
                unit: Some(unit),
            });
        }

        let err = catalog.replace_all(state).await.unwrap_err();
        assert!(matches!(
            err,
            ProgressError::InvalidUnit(UnitValidationError::UnsafeId(ref id)) if id.as_str() == "BTEC/5"
        ));
        let mut keys_after = storage.keys().await.unwrap();
        keys_after.sort();
        assert_eq!(keys_after, keys_before);
        assert_eq!(catalog.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_add_unit_rejects_unsafe_id() {
        let (catalog, storage) = catalog();
        let err = catalog.add_unit(sample_unit("BTEC/5", &[&["t1"]])).await.unwrap_err();
        assert!(matches!(
            err,
            ProgressError::InvalidUnit(UnitValidationError::UnsafeId(_))
        ));
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_collects_units_and_progress() {
        let (catalog, _) = catalog();
        catalog.add_unit(sample_unit("u1", &[&["t1"]])).await.unwrap();
        catalog.add_unit(sample_unit("u2", &[&["t1"]])).await.unwrap();
        catalog
            .save_progress(&Progress::new(UnitId::from("u2"), catalog.clock().now()))
            .await
            .unwrap();

        let state = catalog.snapshot().await.unwrap();
        assert_eq!(state.len(), 2);
        assert!(state.unit(&UnitId::from("u1")).is_some());
        assert!(state.progress(&UnitId::from("u1")).is_none());
        assert!(state.progress(&UnitId::from("u2")).is_some());
    }
}
