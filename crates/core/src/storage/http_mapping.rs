//! HTTP status codes for [`RepositoryError`] variants.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404
/// - `AlreadyExists` -> 409
/// - `ConnectionFailed` -> 503, the backing store is unreachable
/// - `QueryFailed` and `Serialization` -> 500
/// - `InvalidData` -> 400
///
/// # Examples
///
/// ```
/// use spendtrack_core::storage::{repository_error_to_status_code, RepositoryError};
///
/// let error = RepositoryError::expense_not_found("abc-123");
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (RepositoryError::expense_not_found("e-1"), 404),
            (
                RepositoryError::AlreadyExists {
                    entity_type: "Expense",
                    id: "e-2".to_string(),
                },
                409,
            ),
            (RepositoryError::ConnectionFailed("refused".to_string()), 503),
            (RepositoryError::QueryFailed("syntax".to_string()), 500),
            (RepositoryError::Serialization("bad json".to_string()), 500),
            (RepositoryError::InvalidData("bad uuid".to_string()), 400),
        ];

        for (error, status) in cases {
            assert_eq!(repository_error_to_status_code(&error), status, "{error}");
        }
    }
}
