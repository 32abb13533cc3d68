use serde::{Deserialize, Serialize};

/// Opaque identifier of an account.
///
/// Local accounts use a UUID string, Cognito accounts use the user pool
/// `sub`. Both are carried as text so expenses never depend on the backend
/// that issued the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tokens handed out on a successful login.
///
/// The access token authenticates later requests. In local mode it is the
/// server-side session token; in cloud mode it is the Cognito access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

/// Result of a sign-up call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupOutcome {
    pub user_id: UserId,
    pub email: String,
    /// False when the account still needs a confirmation code.
    pub confirmed: bool,
}

/// Profile data exposed to the account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "crate::serde::deserialize_optional_string")]
    pub name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    /// Token the request was authenticated with, needed for calls that act
    /// on the caller's own account.
    pub access_token: String,
}
