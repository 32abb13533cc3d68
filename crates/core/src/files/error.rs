use thiserror::Error;

/// Errors that can occur while accepting or storing a file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileStorageError {
    #[error("Invalid file format")]
    InvalidPayload,
    #[error("File too large (max {})", human_size(.max_bytes))]
    TooLarge { max_bytes: usize },
    #[error("File is empty")]
    EmptyFile,
    #[error("Upload failed: {0}")]
    UploadFailed(String),
    #[error("Storage unavailable: {0}")]
    ConnectionFailed(String),
}

/// Formats a byte limit as whole MB, or KB below one MiB, rounding up.
fn human_size(bytes: &usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;
    let bytes = *bytes;
    if bytes >= MIB {
        format!("{}MB", bytes.div_ceil(MIB))
    } else {
        format!("{}KB", bytes.div_ceil(KIB))
    }
}

impl FileStorageError {
    /// Message safe to return to the client.
    pub fn public_message(&self) -> String {
        match self {
            Self::UploadFailed(_) | Self::ConnectionFailed(_) => "Failed to upload file".to_string(),
            other => other.to_string(),
        }
    }
}

/// Maps a [`FileStorageError`] to an HTTP status code.
pub fn file_storage_error_to_status_code(error: &FileStorageError) -> u16 {
    match error {
        FileStorageError::InvalidPayload | FileStorageError::EmptyFile => 400,
        FileStorageError::TooLarge { .. } => 413,
        FileStorageError::UploadFailed(_) => 500,
        FileStorageError::ConnectionFailed(_) => 503,
    }
}
