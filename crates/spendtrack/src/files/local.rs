use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use spendtrack_core::auth::UserId;
use spendtrack_core::files::{
    content_type_for, object_key, FileStorage, FileStorageError, Result, StoredFile,
};
use uuid::Uuid;

use super::MOCK_FILES_PATH;

/// Stores receipts on local disk for demo mode.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves `key` below the root, refusing anything that could escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(FileStorageError::UploadFailed(format!(
                "refusing to write outside upload dir: {key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn upload(&self, user_id: &UserId, filename: &str, data: Vec<u8>) -> Result<StoredFile> {
        let key = object_key(user_id, filename, Utc::now(), Uuid::new_v4());
        let path = self.path_for(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FileStorageError::UploadFailed(e.to_string()))?;
        }

        let size = data.len();
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| FileStorageError::UploadFailed(e.to_string()))?;

        let url = self.url_for(&key);
        tracing::info!(%user_id, %filename, %url, size, "Stored receipt locally");

        Ok(StoredFile {
            key,
            url,
            content_type: content_type_for(filename).to_string(),
            size,
        })
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}{}/{}", self.public_base_url, MOCK_FILES_PATH, key)
    }
}
