//! Storage folder: a flat directory of exported progress files.
//!
//! Backs the storage server and the local export/import commands.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use super::{validate_name, Result, StorageError};

/// Listing entry for a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Last modification time
    pub modified: chrono::DateTime<chrono::Utc>,
}

/// A directory holding JSON files addressed by bare file name.
#[derive(Debug, Clone)]
pub struct StorageFolder {
    root: PathBuf,
}

impl StorageFolder {
    /// Folder rooted at `root`. The directory is created on first save.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All `*.json` files, sorted by name. A missing folder is empty.
    pub async fn list(&self) -> Result<Vec<FileInfo>> {
        let mut files = Vec::new();
        let mut rd = match fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            files.push(FileInfo {
                name: name.to_string(),
                size: meta.len(),
                modified: meta.modified()?.into(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// True when `name` exists in the folder.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        Ok(fs::try_exists(self.root.join(name)).await?)
    }

    /// Read a file verbatim.
    pub async fn load(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        match fs::read_to_string(self.root.join(name)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a file verbatim, creating the folder if needed.
    pub async fn save(&self, name: &str, content: &str) -> Result<()> {
        validate_name(name)?;
        fs::create_dir_all(&self.root).await?;
        fs::write(self.root.join(name), content.as_bytes()).await?;
        info!(file = name, bytes = content.len(), "Saved storage file");
        Ok(())
    }

    /// Delete a file. Returns false when it was not there.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        match fs::remove_file(self.root.join(name)).await {
            Ok(()) => {
                info!(file = name, "Removed storage file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_folder_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let folder = StorageFolder::new(dir.path().join("nested"));
        assert!(folder.list().await.unwrap().is_empty());

        folder.save("b.json", "{}").await.unwrap();
        folder.save("a.json", "[1,2]").await.unwrap();
        folder.save("notes.txt", "ignored").await.unwrap();

        let files = folder.list().await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
        assert_eq!(files[0].size, 5);
        assert_eq!(folder.load("a.json").await.unwrap(), "[1,2]");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let folder = StorageFolder::new(dir.path());
        let err = folder.load("missing.json").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(!folder.exists("missing.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_reports_whether_file_existed() {
        let dir = tempfile::tempdir().unwrap();
        let folder = StorageFolder::new(dir.path());
        folder.save("a.json", "{}").await.unwrap();

        assert!(folder.remove("a.json").await.unwrap());
        assert!(!folder.exists("a.json").await.unwrap());
        assert!(!folder.remove("a.json").await.unwrap());
        assert!(matches!(
            folder.remove("../a.json").await.unwrap_err(),
            StorageError::InvalidName(_)
        ));
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let folder = StorageFolder::new(dir.path());
        let err = folder.save("../outside.json", "{}").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
        let err = folder.load("sub/inner.json").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }
}
