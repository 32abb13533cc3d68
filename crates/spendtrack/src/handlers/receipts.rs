//! Receipt upload handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use spendtrack_auth::CurrentUser;
use spendtrack_core::api::{require_fields, SuccessResponse};
use spendtrack_core::files::{decode_receipt_payload, FileStorageError};
use spendtrack_core::serde::deserialize_optional_string;

use crate::handlers::error::{AppError, HttpError, InvalidFields};
use crate::handlers::expenses::load_owned_expense;
use crate::state::AppState;

/// Body of `POST /api/receipts/upload/`.
///
/// `file` is base64, optionally as a `data:` URL.
#[derive(Debug, Deserialize)]
pub struct UploadReceiptRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub expense_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptData {
    pub file_url: String,
    pub file_name: String,
    pub expense_id: Option<Uuid>,
    pub content_type: String,
    pub size: usize,
}

/// POST /api/receipts/upload/
///
/// Stores the receipt and, when `expense_id` is given, links it to that
/// expense. The expense is checked before anything is uploaded.
pub async fn upload_receipt(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<UploadReceiptRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<ReceiptData>>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::from(FileStorageError::TooLarge {
                max_bytes: state.config.max_upload_bytes,
            })
        } else {
            AppError::from(rejection)
        }
    })?;

    require_fields(&[
        ("file", body.file.as_deref()),
        ("filename", body.filename.as_deref()),
    ])
    .into_result()
    .map_err(InvalidFields)?;
    let (Some(file), Some(filename)) = (body.file, body.filename) else {
        return Err(HttpError::bad_request("file and filename are required").into());
    };
    let filename = filename.trim().to_string();

    let expense_id = match body.expense_id.as_deref() {
        Some(raw) => Some(load_owned_expense(&state, &user.user_id, raw).await?.id),
        None => None,
    };

    let bytes = decode_receipt_payload(&file, state.config.max_upload_bytes)?;
    let stored = state.files.upload(&user.user_id, &filename, bytes).await?;

    tracing::info!(
        user_id = %user.user_id,
        file_name = %filename,
        key = %stored.key,
        size = stored.size,
        "Receipt uploaded"
    );

    if let Some(id) = expense_id {
        if let Err(err) = state.expenses.update_receipt_url(id, &stored.url).await {
            tracing::error!(expense_id = %id, error = %err, "Failed to link receipt to expense");
            return Err(HttpError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Receipt uploaded but could not link to expense",
            )
            .into());
        }
        tracing::info!(expense_id = %id, url = %stored.url, "Receipt linked to expense");
    }

    Ok(Json(SuccessResponse::with_data(
        "Receipt uploaded",
        ReceiptData {
            file_url: stored.url,
            file_name: filename,
            expense_id,
            content_type: stored.content_type,
            size: stored.size,
        },
    )))
}
