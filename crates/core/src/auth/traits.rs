use async_trait::async_trait;

use super::{
    AuthError, AuthTokens, AuthenticatedUser, ProfileUpdate, SignupOutcome, UserProfile,
};
use crate::deployment::DeploymentMode;

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Account management and request authentication.
///
/// Implemented by the local (SQLite sessions) and cloud (Cognito) backends.
/// Callers validate the shape of their input first; implementations still
/// reject what their store cannot accept.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for tokens.
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens>;

    /// Register a new account.
    async fn signup(&self, email: &str, password: &str) -> Result<SignupOutcome>;

    /// Confirm a new account with the code delivered at sign-up.
    async fn confirm_signup(&self, email: &str, code: &str) -> Result<()>;

    /// Start the password reset flow by issuing a reset code.
    async fn forgot_password(&self, email: &str) -> Result<()>;

    /// Check a reset code without consuming it.
    async fn verify_reset_code(&self, email: &str, code: &str) -> Result<()>;

    /// Finish the password reset flow.
    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()>;

    /// Change the password of the account that owns `access_token`.
    ///
    /// Existing sessions are revoked on success.
    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()>;

    async fn get_user_profile(&self, access_token: &str) -> Result<UserProfile>;

    async fn update_user_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile>;

    /// Resolve an access token to the user it was issued to.
    async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser>;

    /// Invalidate the given access token.
    async fn logout(&self, access_token: &str) -> Result<()>;

    /// Which backend family this service belongs to.
    fn mode(&self) -> DeploymentMode;
}
