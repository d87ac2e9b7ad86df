//! Where transfer files are read from and written to.

use async_trait::async_trait;
use unitrack_storage::{StorageError, StorageFolder};

use crate::error::Result;

/// Named files a transfer can be read from.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Contents of `name`, or `None` when it does not exist.
    async fn read_file(&self, name: &str) -> Result<Option<String>>;
}

/// Named files a transfer can be written to.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Write `content` to `name`, replacing any existing file.
    async fn write_file(&self, name: &str, content: &str) -> Result<()>;

    /// Delete `name`. A missing file is not an error.
    async fn remove_file(&self, name: &str) -> Result<()>;
}

#[async_trait]
impl FileSource for StorageFolder {
    async fn read_file(&self, name: &str) -> Result<Option<String>> {
        match self.load(name).await {
            Ok(content) => Ok(Some(content)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FileSink for StorageFolder {
    async fn write_file(&self, name: &str, content: &str) -> Result<()> {
        self.save(name, content).await?;
        Ok(())
    }

    async fn remove_file(&self, name: &str) -> Result<()> {
        self.remove(name).await?;
        Ok(())
    }
}
