use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

/// `{"status": "success", "message": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl SuccessResponse<()> {
    /// A success envelope without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// `{"status": "error", "error": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            error: error.into(),
        }
    }
}

/// `{"status": "error", "error": "Validation failed", "errors": {field: message}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub status: String,
    pub error: String,
    pub errors: BTreeMap<String, String>,
}

impl ValidationErrorResponse {
    pub fn new(errors: BTreeMap<String, String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            error: "Validation failed".to_string(),
            errors,
        }
    }
}

/// Login response. The access token travels in a cookie, not in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub status: String,
    pub message: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn new(
        message: impl Into<String>,
        id_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            id_token: id_token.into(),
            refresh_token,
            expires_in,
        }
    }
}
