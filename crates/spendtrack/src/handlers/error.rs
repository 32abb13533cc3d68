use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use spendtrack_core::api::{ErrorResponse, FieldErrors};
use spendtrack_core::expense::ExpenseError;
use spendtrack_core::files::{file_storage_error_to_status_code, FileStorageError};
use spendtrack_core::storage::{repository_error_to_status_code, RepositoryError};
use thiserror::Error;

/// A failure with a fixed status and client-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

/// Per-field request validation failures.
#[derive(Debug, Error)]
#[error("Validation failed")]
pub struct InvalidFields(pub FieldErrors);

/// Handler error wrapping `anyhow::Error`.
///
/// Known domain errors are downcast to their status code and rendered as the
/// JSON error envelope; anything else is logged and reported as a 500.
pub struct AppError(pub anyhow::Error);

fn envelope(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn repository_message(err: &RepositoryError) -> &'static str {
    match err {
        RepositoryError::NotFound { .. } => "Expense not found",
        RepositoryError::AlreadyExists { .. } => "Expense already exists",
        RepositoryError::InvalidData(_) => "Invalid expense data",
        RepositoryError::ConnectionFailed(_) => "Storage temporarily unavailable",
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => {
            "Failed to process expense"
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self.0.downcast::<spendtrack_auth::AuthError>() {
            Ok(auth) => return auth.into_response(),
            Err(err) => err,
        };

        if let Some(repo_error) = err.downcast_ref::<RepositoryError>() {
            let status = StatusCode::from_u16(repository_error_to_status_code(repo_error))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(error = %repo_error, "Expense storage error");
            }
            return envelope(status, repository_message(repo_error));
        }

        if let Some(file_error) = err.downcast_ref::<FileStorageError>() {
            let status = StatusCode::from_u16(file_storage_error_to_status_code(file_error))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(error = %file_error, "Receipt storage error");
            }
            return envelope(status, file_error.public_message());
        }

        if let Some(expense_error) = err.downcast_ref::<ExpenseError>() {
            return envelope(StatusCode::BAD_REQUEST, expense_error.to_string());
        }

        if let Some(InvalidFields(errors)) = err.downcast_ref::<InvalidFields>() {
            return (
                StatusCode::BAD_REQUEST,
                Json(errors.clone().into_response()),
            )
                .into_response();
        }

        if let Some(rejection) = err.downcast_ref::<JsonRejection>() {
            tracing::debug!(detail = %rejection.body_text(), "Rejected request body");
            return if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                envelope(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            } else {
                envelope(StatusCode::BAD_REQUEST, "Invalid JSON")
            };
        }

        if let Some(http) = err.downcast_ref::<HttpError>() {
            return envelope(http.status, http.message.clone());
        }

        tracing::error!(error = ?err, "Unhandled application error");
        envelope(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred",
        )
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use spendtrack_core::api::require_fields;
    use spendtrack_core::auth::AuthError as CoreAuthError;

    async fn render(err: impl Into<AppError>) -> (StatusCode, serde_json::Value) {
        let response = err.into().into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_repository_errors() {
        let (status, body) = render(RepositoryError::expense_not_found("e-1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Expense not found");

        let (status, body) =
            render(RepositoryError::QueryFailed("no such table".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process expense");
    }

    #[tokio::test]
    async fn test_file_errors_hide_details() {
        let (status, body) =
            render(FileStorageError::UploadFailed("AccessDenied".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to upload file");

        let (status, _) = render(FileStorageError::TooLarge { max_bytes: 10 }).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_expense_and_field_errors() {
        let (status, body) = render(ExpenseError::MissingRequiredFields).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Amount and category required");

        let (status, body) = render(InvalidFields(require_fields(&[("file", None)]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["errors"]["file"], "file is required");
    }

    #[tokio::test]
    async fn test_auth_errors_use_auth_rendering() {
        let err = spendtrack_auth::AuthError::from(CoreAuthError::MissingToken);
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication token missing");
    }

    #[tokio::test]
    async fn test_http_and_unknown_errors() {
        let (status, body) = render(HttpError::bad_request("No fields to update")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No fields to update");

        let (status, body) = render(anyhow::anyhow!("boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An unexpected error occurred");
    }
}
