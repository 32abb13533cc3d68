mod error;
mod functions;
mod traits;
mod types;

pub use error::{file_storage_error_to_status_code, FileStorageError};
pub use functions::{
    content_type_for, decode_receipt_payload, file_extension, object_key, DEFAULT_MAX_UPLOAD_BYTES,
};
pub use traits::{FileStorage, Result};
pub use types::StoredFile;
