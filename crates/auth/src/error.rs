use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use spendtrack_core::api::{ErrorResponse, FieldErrors};
use spendtrack_core::auth::auth_error_to_status_code;
use thiserror::Error;

/// Auth errors for the spendtrack_auth crate.
///
/// This wraps the core `AuthError` and adds the request-level failures that
/// only exist at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error reported by an auth backend
    #[error(transparent)]
    Core(#[from] spendtrack_core::auth::AuthError),

    /// One or more request fields failed validation
    #[error("Validation failed")]
    InvalidFields(FieldErrors),

    /// Request body could not be parsed
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        AuthError::InvalidFields(errors)
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::InvalidJson(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Core(err) => {
                let status = StatusCode::from_u16(auth_error_to_status_code(&err))
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if err.is_internal() {
                    tracing::error!(error = %err, "Auth backend error");
                }
                (status, Json(ErrorResponse::new(err.public_message()))).into_response()
            }
            AuthError::InvalidFields(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors.into_response())).into_response()
            }
            AuthError::InvalidJson(detail) => {
                tracing::debug!(%detail, "Rejected request body");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new("Invalid JSON")),
                )
                    .into_response()
            }
            AuthError::Config(_) => {
                tracing::error!("Config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Server configuration error")),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use spendtrack_core::api::require_fields;
    use spendtrack_core::auth::AuthError as CoreError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_core_error_uses_public_message() {
        let response = AuthError::from(CoreError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_internal_error_is_masked() {
        let response = AuthError::from(CoreError::Storage("disk I/O".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "An unexpected error occurred"
        );
    }

    #[tokio::test]
    async fn test_field_errors_render_validation_envelope() {
        let errors = require_fields(&[("email", None)]);
        let response = AuthError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["errors"]["email"], "email is required");
    }
}
