//! Export and import of the whole catalogue.

use tracing::{debug, info, warn};
use unitrack_progress::UnitCatalog;

use crate::chunk::{base_name, metadata_name, single_name, ChunkManifest, TransferPayload, UnitChunk};
use crate::document::{TransferDocument, CURRENT_VERSION};
use crate::error::{Result, TransferError};
use crate::files::{FileSink, FileSource};

/// Moves learner state between a catalogue and transfer files.
#[derive(Clone)]
pub struct TransferService {
    catalog: UnitCatalog,
}

/// What an import replaced the catalogue with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Units imported
    pub units: usize,

    /// Format revision of the source document
    pub version: u32,

    /// Whether the source was a chunked export
    pub chunked: bool,
}

impl TransferService {
    /// Service over `catalog`.
    pub fn new(catalog: UnitCatalog) -> Self {
        Self { catalog }
    }

    /// Export the current catalogue.
    pub async fn export(&self) -> Result<TransferDocument> {
        let state = self.catalog.snapshot().await?;
        Ok(TransferDocument::from_state(&state, self.catalog.clock().now()))
    }

    /// Replace the catalogue with `doc`. Returns the number of units.
    pub async fn import(&self, doc: TransferDocument) -> Result<usize> {
        if doc.version > CURRENT_VERSION {
            return Err(TransferError::UnsupportedVersion(doc.version));
        }
        if doc.total_units != doc.units.len() {
            warn!(
                declared = doc.total_units,
                actual = doc.units.len(),
                "Transfer unit count does not match its entries"
            );
        }

        let state = doc.into_state();
        let units = state.len();
        self.catalog.replace_all(state).await?;
        info!(units, "Imported learner state");
        Ok(units)
    }

    /// Export to `sink` under `name`, splitting when larger than `threshold`.
    ///
    /// Returns the names of the files written.
    pub async fn export_to(
        &self,
        sink: &dyn FileSink,
        name: &str,
        threshold: usize,
    ) -> Result<Vec<String>> {
        let base = base_name(name);
        let payload = TransferPayload::split(self.export().await?, base, threshold)?;
        let written = write_payload(sink, base, &payload).await?;
        info!(
            file = base,
            files = written.len(),
            chunked = payload.is_chunked(),
            "Exported learner state"
        );
        Ok(written)
    }

    /// Import the export named `name` from `source`.
    pub async fn import_from(&self, source: &dyn FileSource, name: &str) -> Result<ImportReport> {
        let payload = read_payload(source, name).await?;
        let chunked = payload.is_chunked();
        let doc = payload.into_document()?;
        let version = doc.version;
        let units = self.import(doc).await?;
        Ok(ImportReport {
            units,
            version,
            chunked,
        })
    }
}

/// Write every file of `payload`. Chunks go first so a manifest never points
/// at parts that are not there yet.
///
/// A single-file export removes any manifest left under the same name, which
/// would otherwise take precedence on import.
pub async fn write_payload(
    sink: &dyn FileSink,
    base: &str,
    payload: &TransferPayload,
) -> Result<Vec<String>> {
    let mut written = Vec::new();
    for (file, content) in payload.files(base)? {
        sink.write_file(&file, &content).await?;
        written.push(file);
    }
    if !payload.is_chunked() {
        let manifest = metadata_name(base);
        debug!(file = %manifest, "Removing superseded manifest");
        sink.remove_file(&manifest).await?;
    }
    Ok(written)
}

/// Read an export, reassembling it when a `-metadata` manifest is present.
pub async fn read_payload(source: &dyn FileSource, name: &str) -> Result<TransferPayload> {
    let base = base_name(name);

    if let Some(raw) = source.read_file(&metadata_name(base)).await? {
        let manifest: ChunkManifest = serde_json::from_str(&raw)?;
        let mut parts = Vec::with_capacity(manifest.files.len());
        for file in &manifest.files {
            let raw = source
                .read_file(file)
                .await?
                .ok_or_else(|| TransferError::NotFound(file.clone()))?;
            let part: UnitChunk = serde_json::from_str(&raw)?;
            parts.push(part);
        }
        return Ok(TransferPayload::Chunked { manifest, parts });
    }

    let file = single_name(base);
    let raw = source
        .read_file(&file)
        .await?
        .ok_or(TransferError::NotFound(file))?;
    Ok(TransferPayload::Single(serde_json::from_str(&raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use unitrack_core::{
        Clock, FixedClock, LearningOutcome, OutcomeId, Task, TaskId, TaskType, Unit, UnitId,
    };
    use unitrack_progress::ProgressStore;
    use unitrack_storage::{MemoryStore, StorageFolder};

    use crate::chunk::DEFAULT_CHUNK_THRESHOLD;

    fn catalog() -> UnitCatalog {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
        UnitCatalog::new(Arc::new(MemoryStore::new()), clock)
    }

    fn unit(id: &str, tasks: &[&str]) -> Unit {
        Unit {
            id: UnitId::from(id),
            title: format!("Unit {}", id),
            scenario: "A small business network".into(),
            instructions: String::new(),
            learning_outcomes: vec![LearningOutcome {
                id: OutcomeId::from("lo1"),
                description: "Outcome".into(),
                tasks: tasks
                    .iter()
                    .map(|t| Task {
                        id: TaskId::from(*t),
                        description: format!("Task {}", t),
                        task_type: TaskType::Standard,
                        acceptance_criteria: vec![],
                    })
                    .collect(),
                indicative_content: vec![],
            }],
        }
    }

    async fn populated() -> UnitCatalog {
        let catalog = catalog();
        catalog.add_unit(unit("u1", &["t1", "t2", "t3"])).await.unwrap();
        catalog.add_unit(unit("u2", &["t1"])).await.unwrap();

        let mut store = ProgressStore::open(catalog.clone(), UnitId::from("u1")).await.unwrap();
        store.update_answer(&TaskId::from("t1"), "<p>draft</p>").await.unwrap();
        store.mark_task_complete(&TaskId::from("t1")).await.unwrap();
        store.update_answer(&TaskId::from("t2"), "<p>half</p>").await.unwrap();
        catalog
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let source = populated().await;
        let doc = TransferService::new(source.clone()).export().await.unwrap();
        assert_eq!(doc.total_units, 2);

        let target = catalog();
        target.add_unit(unit("stale", &["x"])).await.unwrap();
        let imported = TransferService::new(target.clone()).import(doc).await.unwrap();
        assert_eq!(imported, 2);

        let mut expected = source.snapshot().await.unwrap();
        expected.reconcile();
        assert_eq!(target.snapshot().await.unwrap(), expected);
        assert!(target.unit(&UnitId::from("stale")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_recomputes_completed_count() {
        let source = populated().await;
        let mut doc = TransferService::new(source).export().await.unwrap();
        doc.units
            .get_mut(&UnitId::from("u1"))
            .unwrap()
            .unit_summary
            .completed_tasks = 99;

        let target = catalog();
        TransferService::new(target.clone()).import(doc).await.unwrap();
        let summaries = target.summaries().await.unwrap();
        let u1 = summaries.iter().find(|s| s.id == UnitId::from("u1")).unwrap();
        assert_eq!(u1.completed_tasks, 1);
        assert_eq!(u1.total_tasks, 3);
    }

    #[tokio::test]
    async fn test_rejects_newer_version() {
        let mut doc = TransferService::new(catalog()).export().await.unwrap();
        doc.version = CURRENT_VERSION + 1;
        let err = TransferService::new(catalog()).import(doc).await.unwrap_err();
        assert!(matches!(err, TransferError::UnsupportedVersion(3)));
    }

    #[tokio::test]
    async fn test_chunked_and_single_files_import_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let folder = StorageFolder::new(dir.path());
        let service = TransferService::new(populated().await);

        let single = service.export_to(&folder, "whole.json", DEFAULT_CHUNK_THRESHOLD).await.unwrap();
        assert_eq!(single, vec!["whole.json"]);
        let chunked = service.export_to(&folder, "parts", 0).await.unwrap();
        assert_eq!(
            chunked,
            vec!["parts-unit-u1.json", "parts-unit-u2.json", "parts-metadata.json"]
        );

        let from_single = catalog();
        let report = TransferService::new(from_single.clone())
            .import_from(&folder, "whole")
            .await
            .unwrap();
        assert!(!report.chunked);
        assert_eq!(report.version, CURRENT_VERSION);

        let from_chunks = catalog();
        let report = TransferService::new(from_chunks.clone())
            .import_from(&folder, "parts.json")
            .await
            .unwrap();
        assert!(report.chunked);
        assert_eq!(report.units, 2);

        assert_eq!(
            from_single.snapshot().await.unwrap(),
            from_chunks.snapshot().await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_export_and_missing_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let folder = StorageFolder::new(dir.path());
        let service = TransferService::new(populated().await);

        let err = service.import_from(&folder, "absent").await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound(f) if f == "absent.json"));

        service.export_to(&folder, "parts", 0).await.unwrap();
        std::fs::remove_file(dir.path().join("parts-unit-u2.json")).unwrap();
        let err = service.import_from(&folder, "parts").await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound(f) if f == "parts-unit-u2.json"));
    }

    #[tokio::test]
    async fn test_single_export_replaces_earlier_chunked_export() {
        let dir = tempfile::tempdir().unwrap();
        let folder = StorageFolder::new(dir.path());
        let source = populated().await;
        let service = TransferService::new(source.clone());

        service.export_to(&folder, "backup", 0).await.unwrap();
        let mut store = ProgressStore::open(source.clone(), UnitId::from("u1")).await.unwrap();
        store.mark_task_complete(&TaskId::from("t2")).await.unwrap();

        let written = service
            .export_to(&folder, "backup", DEFAULT_CHUNK_THRESHOLD)
            .await
            .unwrap();
        assert_eq!(written, vec!["backup.json"]);
        assert!(!folder.exists("backup-metadata.json").await.unwrap());

        let target = catalog();
        let report = TransferService::new(target.clone())
            .import_from(&folder, "backup")
            .await
            .unwrap();
        assert!(!report.chunked);
        let summaries = target.summaries().await.unwrap();
        let u1 = summaries.iter().find(|s| s.id == UnitId::from("u1")).unwrap();
        assert_eq!(u1.completed_tasks, 2);
    }
}
