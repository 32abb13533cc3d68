use std::time::Duration;

use crate::error::AuthError;

/// Cognito user pool app client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CognitoConfig {
    pub client_id: String,
    /// Required when the app client was created with a secret.
    pub client_secret: Option<String>,
    pub region: Option<String>,
    /// Override for local emulators.
    pub endpoint_url: Option<String>,
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub session_ttl: Duration,
    pub reset_code_ttl: Duration,
    /// How often expired local sessions are deleted.
    pub session_purge_interval: Duration,
    /// SQLite database holding local accounts and sessions.
    pub database_url: String,
    pub cognito: Option<CognitoConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "access_token".to_string(),
            cookie_secure: true,
            session_ttl: Duration::from_secs(24 * 60 * 60),
            reset_code_ttl: Duration::from_secs(15 * 60),
            session_purge_interval: Duration::from_secs(60 * 60),
            database_url: "sqlite://spendtrack-auth.db".to_string(),
            cognito: None,
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_DATABASE_URL`: local account database (default: `sqlite://spendtrack-auth.db`)
    /// - `SESSION_TTL_HOURS`: local session lifetime in hours (default: 24)
    /// - `RESET_CODE_TTL_MINUTES`: password reset code lifetime (default: 15)
    /// - `SESSION_PURGE_INTERVAL_MINUTES`: expired session cleanup period (default: 60)
    /// - `COOKIE_SECURE`: whether to set the secure flag on cookies (default: true)
    /// - `COGNITO_CLIENT_ID`: user pool app client id (enables Cognito)
    /// - `COGNITO_CLIENT_SECRET`: app client secret (optional)
    /// - `COGNITO_REGION` or `AWS_REGION`: user pool region
    /// - `COGNITO_ENDPOINT_URL`: endpoint override (optional)
    ///
    /// # Errors
    ///
    /// Returns an error if a client secret is set without a client id, or if
    /// a duration is zero or longer than [`MAX_DURATION_HOURS`].
    pub fn from_env() -> Result<Self, AuthError> {
        let defaults = Self::default();

        let session_ttl =
            duration_var("SESSION_TTL_HOURS", 60 * 60)?.unwrap_or(defaults.session_ttl);
        let reset_code_ttl =
            duration_var("RESET_CODE_TTL_MINUTES", 60)?.unwrap_or(defaults.reset_code_ttl);
        let session_purge_interval = duration_var("SESSION_PURGE_INTERVAL_MINUTES", 60)?
            .unwrap_or(defaults.session_purge_interval);

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.cookie_secure);

        let cognito = match non_empty_var("COGNITO_CLIENT_ID") {
            Some(client_id) => Some(CognitoConfig {
                client_id,
                client_secret: non_empty_var("COGNITO_CLIENT_SECRET"),
                region: non_empty_var("COGNITO_REGION").or_else(|| non_empty_var("AWS_REGION")),
                endpoint_url: non_empty_var("COGNITO_ENDPOINT_URL"),
            }),
            None if non_empty_var("COGNITO_CLIENT_SECRET").is_some() => {
                return Err(AuthError::Config(
                    "COGNITO_CLIENT_SECRET is set but COGNITO_CLIENT_ID is missing".to_string(),
                ))
            }
            None => None,
        };

        Ok(Self {
            cookie_name: defaults.cookie_name,
            cookie_secure,
            session_ttl,
            reset_code_ttl,
            session_purge_interval,
            database_url: non_empty_var("AUTH_DATABASE_URL").unwrap_or(defaults.database_url),
            cognito,
        })
    }
}

/// Upper bound for every configured duration (one year).
pub const MAX_DURATION_HOURS: u64 = 24 * 365;

/// Reads a whole number of `unit_secs` units. Unparseable values fall back to
/// the default; zero and values above [`MAX_DURATION_HOURS`] are rejected.
fn duration_var(key: &str, unit_secs: u64) -> Result<Option<Duration>, AuthError> {
    let Some(units) = non_empty_var(key).and_then(|s| s.trim().parse::<u64>().ok()) else {
        return Ok(None);
    };
    let secs = units
        .checked_mul(unit_secs)
        .filter(|secs| (1..=MAX_DURATION_HOURS * 60 * 60).contains(secs))
        .ok_or_else(|| {
            AuthError::Config(format!(
                "{key} must be between 1 and {} {}",
                MAX_DURATION_HOURS * 60 * 60 / unit_secs,
                if unit_secs == 60 { "minutes" } else { "hours" },
            ))
        })?;
    Ok(Some(Duration::from_secs(secs)))
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
