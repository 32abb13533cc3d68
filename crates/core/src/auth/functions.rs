use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Lifetime of demo ID tokens.
pub const DEMO_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Generate a cryptographically random session token.
#[cfg(feature = "auth")]
pub fn generate_session_token() -> String {
    use rand::{distr::Alphanumeric, Rng};

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Generate a six digit password reset code.
#[cfg(feature = "auth")]
pub fn generate_reset_code() -> String {
    use rand::Rng;

    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

/// Computes the `SECRET_HASH` required by user pool clients that have a
/// client secret: base64(HMAC-SHA256(secret, username + client_id)).
#[cfg(feature = "auth")]
pub fn compute_secret_hash(
    username: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, AuthError> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let mut mac = Hmac::<Sha256>::new_from_slice(client_secret.as_bytes())
        .map_err(|e| AuthError::Provider(format!("invalid client secret: {e}")))?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Check if something that expires at `expires_at` has expired.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at <= now
}

/// Calculate expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

/// Derive a display name from an email address.
pub fn display_name(email: &str) -> String {
    match email.split('@').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "User".to_string(),
    }
}

/// Claims carried by the ID token issued in local mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoIdTokenClaims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl DemoIdTokenClaims {
    pub fn new(sub: impl Into<String>, email: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: sub.into(),
            email: email.into(),
            iat,
            exp: iat + DEMO_TOKEN_TTL_SECS,
        }
    }
}

/// Encodes demo claims as unsigned base64 JSON.
///
/// These tokens are informational only; requests are authenticated with the
/// session-backed access token.
pub fn encode_demo_id_token(claims: &DemoIdTokenClaims) -> Result<String, AuthError> {
    let json = serde_json::to_vec(claims).map_err(|e| AuthError::Provider(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// Decodes a demo ID token, tolerating stripped `=` padding and the URL-safe
/// alphabet.
#[cfg(test)]
pub(crate) fn decode_demo_id_token(token: &str) -> Result<DemoIdTokenClaims, AuthError> {
    use base64::engine::general_purpose::URL_SAFE;

    let trimmed = token.trim().trim_end_matches('=');
    let padded = format!("{trimmed}{}", "=".repeat((4 - trimmed.len() % 4) % 4));

    let bytes = STANDARD
        .decode(&padded)
        .or_else(|_| URL_SAFE.decode(&padded))
        .map_err(|_| AuthError::InvalidToken)?;

    serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)
}
