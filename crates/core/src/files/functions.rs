//! Pure helpers shared by the file storage backends.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::FileStorageError;
use crate::auth::UserId;

/// Upload limit applied when none is configured: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MAX_EXTENSION_LEN: usize = 10;

/// Returns the lowercased extension of `filename` including the dot, or an
/// empty string when there is none or it looks unsafe to reuse in a key.
pub fn file_extension(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}

/// MIME type for a receipt file, based on its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match file_extension(filename).as_str() {
        ".pdf" => "application/pdf",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Builds the storage key `{user_id}/{unix_ts}_{id}{ext}`.
pub fn object_key(user_id: &UserId, filename: &str, now: DateTime<Utc>, id: Uuid) -> String {
    format!(
        "{}/{}_{}{}",
        user_id,
        now.timestamp(),
        id,
        file_extension(filename)
    )
}

/// Decodes a base64 receipt sent in a JSON body.
///
/// Accepts an optional `data:<mime>;base64,` prefix, embedded line breaks and
/// missing `=` padding. The size limit is checked before decoding so
/// oversized payloads are rejected without allocating the decoded buffer.
pub fn decode_receipt_payload(payload: &str, max_bytes: usize) -> Result<Vec<u8>, FileStorageError> {
    let payload = payload.trim();
    let encoded = if payload.starts_with("data:") {
        match payload.split_once(',') {
            Some((_, data)) => data,
            None => return Err(FileStorageError::InvalidPayload),
        }
    } else {
        payload
    };

    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let compact = compact.trim_end_matches('=');

    if compact.is_empty() {
        return Err(FileStorageError::EmptyFile);
    }
    if compact.len() / 4 * 3 > max_bytes + 3 {
        return Err(FileStorageError::TooLarge { max_bytes });
    }

    let padded = format!("{compact}{}", "=".repeat((4 - compact.len() % 4) % 4));
    let bytes = STANDARD
        .decode(&padded)
        .or_else(|_| URL_SAFE.decode(&padded))
        .map_err(|_| FileStorageError::InvalidPayload)?;

    if bytes.is_empty() {
        return Err(FileStorageError::EmptyFile);
    }
    if bytes.len() > max_bytes {
        return Err(FileStorageError::TooLarge { max_bytes });
    }
    Ok(bytes)
}
