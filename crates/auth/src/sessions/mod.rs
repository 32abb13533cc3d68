//! Server-side sessions for locally managed accounts.

mod sqlite;

pub(crate) use sqlite::parse_timestamp;
pub use sqlite::{Session, SessionStore};

#[cfg(test)]
pub(crate) use sqlite::tests::memory_pool;
