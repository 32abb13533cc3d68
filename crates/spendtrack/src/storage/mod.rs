//! Expense storage backends.
//!
//! Concrete implementations of `spendtrack_core::storage::ExpenseRepository`.
//! The backend is chosen at startup from the deployment mode:
//!
//! - local mode: [`SqliteRepository`] on `rusqlite` and `tokio-rusqlite`
//! - cloud mode: [`DynamoDbRepository`] on `aws-sdk-dynamodb`
//!
//! [`InMemoryRepository`] backs tests. The DynamoDB backend is only compiled
//! with the `cloud` feature.

#[cfg(test)]
pub mod inmemory;
pub mod sqlite;

#[cfg(feature = "cloud")]
pub mod dynamodb;

#[cfg(test)]
pub use inmemory::InMemoryRepository;
pub use sqlite::SqliteRepository;

#[cfg(feature = "cloud")]
pub use dynamodb::DynamoDbRepository;
