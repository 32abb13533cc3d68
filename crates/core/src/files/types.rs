use serde::{Deserialize, Serialize};

/// A file accepted by a [`FileStorage`](super::FileStorage) backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Backend-relative key, `{user_id}/{unix_ts}_{uuid}{ext}`.
    pub key: String,
    /// URL the file can be fetched from.
    pub url: String,
    pub content_type: String,
    pub size: usize,
}
