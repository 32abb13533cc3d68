//! Receipt file storage backends.
//!
//! Concrete implementations of `spendtrack_core::files::FileStorage`:
//! [`LocalFileStorage`] writes under a directory the server serves back at
//! `/mock-files`, [`S3FileStorage`] uploads to a bucket (`cloud` feature).

mod local;
#[cfg(feature = "cloud")]
mod s3;

pub use local::LocalFileStorage;
#[cfg(feature = "cloud")]
pub use s3::S3FileStorage;

/// URL prefix the local backend's files are served under.
pub const MOCK_FILES_PATH: &str = "/mock-files";
