//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` to `RepositoryError`, turning constraint
//! failures into their semantic variants.

use rusqlite::ffi;
use spendtrack_core::storage::RepositoryError;

const ENTITY: &str = "Expense";

fn map_rusqlite_error(err: &rusqlite::Error, id: &str) -> RepositoryError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepositoryError::AlreadyExists {
                entity_type: ENTITY,
                id: id.to_string(),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_CHECK
                || sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_NOTNULL =>
        {
            RepositoryError::InvalidData(format!("{ENTITY} violates a table constraint: {err}"))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        rusqlite::Error::QueryReturnedNoRows => RepositoryError::expense_not_found(id),

        rusqlite::Error::FromSqlConversionFailure(..) => {
            RepositoryError::Serialization(err.to_string())
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error for the expense identified by `id`.
///
/// `QueryReturnedNoRows` is used by the repository to signal that an update
/// or delete touched nothing.
pub fn map_tokio_rusqlite_error(err: tokio_rusqlite::Error, id: impl AsRef<str>) -> RepositoryError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, id.as_ref())
        }
        tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
