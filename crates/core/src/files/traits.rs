use async_trait::async_trait;

use crate::auth::UserId;

use super::{FileStorageError, StoredFile};

/// Result type for file storage operations.
pub type Result<T> = std::result::Result<T, FileStorageError>;

/// Storage for uploaded receipt files.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `data` under a fresh key in the user's namespace.
    async fn upload(&self, user_id: &UserId, filename: &str, data: Vec<u8>) -> Result<StoredFile>;

    /// Public URL for a previously stored key.
    fn url_for(&self, key: &str) -> String;
}
