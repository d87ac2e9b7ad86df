//! Size-driven splitting of transfer documents into per-unit files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;
use unitrack_core::{Time, UnitId};

use crate::document::{TransferDocument, TransferEntry};
use crate::error::{Result, TransferError};

/// Serialized size above which an export is split.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 4 * 1024 * 1024;

/// Suffix of the manifest file for a chunked export.
pub const METADATA_SUFFIX: &str = "-metadata";

/// Index file of a chunked export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkManifest {
    /// Shared by the manifest and all of its chunks
    pub export_id: Ulid,

    /// Format revision of the reassembled document
    pub version: u32,

    /// When the export was taken
    pub export_date: Time,

    /// Units in the export
    pub total_units: usize,

    /// Unit ids, one chunk each
    pub unit_ids: Vec<UnitId>,

    /// Chunk file names, parallel to `unit_ids`
    pub files: Vec<String>,
}

/// One unit of a chunked export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitChunk {
    /// Export this chunk belongs to
    pub export_id: Ulid,

    /// Unit id
    pub unit_id: UnitId,

    /// Exported data for the unit
    pub entry: TransferEntry,
}

/// A transfer document as it travels: whole, or as a manifest plus parts.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferPayload {
    /// One self-contained file
    Single(TransferDocument),

    /// Manifest plus one part per unit
    Chunked {
        /// Index of the parts
        manifest: ChunkManifest,
        /// Per-unit parts
        parts: Vec<UnitChunk>,
    },
}

/// File name of an unchunked export.
pub fn single_name(base: &str) -> String {
    format!("{}.json", base)
}

/// File name of a chunked export's manifest.
pub fn metadata_name(base: &str) -> String {
    format!("{}{}.json", base, METADATA_SUFFIX)
}

/// Infix separating chunk files from the manifest.
const CHUNK_INFIX: &str = "-unit-";

/// File name of one unit's chunk. Never equal to the manifest's name.
pub fn chunk_name(base: &str, unit_id: &UnitId) -> String {
    format!("{}{}{}.json", base, CHUNK_INFIX, unit_id)
}

/// Strip a trailing `.json` from a user-supplied export name.
pub fn base_name(name: &str) -> &str {
    name.strip_suffix(".json").unwrap_or(name)
}

impl TransferPayload {
    /// Keep `doc` whole unless its serialized form exceeds `threshold` bytes.
    pub fn split(doc: TransferDocument, base: &str, threshold: usize) -> Result<Self> {
        let size = serde_json::to_vec(&doc)?.len();
        if size <= threshold {
            return Ok(Self::Single(doc));
        }

        let export_id = Ulid::new();
        let unit_ids: Vec<UnitId> = doc.units.keys().cloned().collect();
        let files = unit_ids.iter().map(|id| chunk_name(base, id)).collect();
        let manifest = ChunkManifest {
            export_id,
            version: doc.version,
            export_date: doc.export_date,
            total_units: doc.total_units,
            unit_ids,
            files,
        };
        let parts = doc
            .units
            .into_iter()
            .map(|(unit_id, entry)| UnitChunk {
                export_id,
                unit_id,
                entry,
            })
            .collect();

        Ok(Self::Chunked { manifest, parts })
    }

    /// True for a manifest-plus-parts payload.
    pub fn is_chunked(&self) -> bool {
        matches!(self, Self::Chunked { .. })
    }

    /// Files to write, as `(name, content)` pairs, manifest last.
    pub fn files(&self, base: &str) -> Result<Vec<(String, String)>> {
        match self {
            Self::Single(doc) => Ok(vec![(single_name(base), serde_json::to_string_pretty(doc)?)]),
            Self::Chunked { manifest, parts } => {
                let mut files = Vec::with_capacity(parts.len() + 1);
                for part in parts {
                    files.push((chunk_name(base, &part.unit_id), serde_json::to_string(part)?));
                }
                files.push((metadata_name(base), serde_json::to_string_pretty(manifest)?));
                Ok(files)
            }
        }
    }

    /// Reassemble the document. Both shapes go through here.
    pub fn into_document(self) -> Result<TransferDocument> {
        match self {
            Self::Single(doc) => Ok(doc),
            Self::Chunked { manifest, parts } => {
                let mut by_id: BTreeMap<UnitId, UnitChunk> = BTreeMap::new();
                for (i, part) in parts.into_iter().enumerate() {
                    if part.export_id != manifest.export_id {
                        let file = manifest
                            .files
                            .get(i)
                            .cloned()
                            .unwrap_or_else(|| part.unit_id.to_string());
                        return Err(TransferError::ChunkMismatch {
                            file,
                            expected: manifest.export_id,
                            found: part.export_id,
                        });
                    }
                    by_id.insert(part.unit_id.clone(), part);
                }

                let mut units = BTreeMap::new();
                for unit_id in &manifest.unit_ids {
                    let part = by_id
                        .remove(unit_id)
                        .ok_or_else(|| TransferError::NotFound(unit_id.to_string()))?;
                    units.insert(unit_id.clone(), part.entry);
                }

                Ok(TransferDocument {
                    version: manifest.version,
                    export_date: manifest.export_date,
                    total_units: manifest.total_units,
                    units,
                })
            }
        }
    }
}
