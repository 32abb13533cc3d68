//! Functional core for spendtrack.
//!
//! Pure types, validation and provider contracts shared by the auth crate
//! and the server. Nothing in here performs I/O; backends live in the crates
//! that own the corresponding SDK or database driver.

pub mod api;
pub mod auth;
pub mod deployment;
pub mod expense;
pub mod files;
pub mod serde;
pub mod storage;
