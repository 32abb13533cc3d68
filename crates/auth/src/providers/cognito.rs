//! Cognito user pool implementation of `AuthService`.
//!
//! Uses the app client API (no admin calls), so the server only needs the
//! client id and, for clients created with one, the client secret.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client;
use spendtrack_core::auth::{
    compute_secret_hash, display_name, AuthError, AuthService, AuthTokens, AuthenticatedUser,
    ProfileUpdate, Result, SignupOutcome, UserId, UserProfile,
};
use spendtrack_core::deployment::DeploymentMode;

use crate::config::CognitoConfig;

/// `AuthService` backed by a Cognito user pool.
#[derive(Clone)]
pub struct CognitoAuthService {
    client: Client,
    client_id: String,
    client_secret: Option<String>,
}

impl CognitoAuthService {
    /// Creates a new service with the given Cognito client.
    pub fn new(client: Client, config: &CognitoConfig) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Creates a client from the AWS default credential chain.
    pub async fn from_config(config: &CognitoConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config), config)
    }

    /// `SECRET_HASH` for `username`, when the app client has a secret.
    fn secret_hash(&self, username: &str) -> Result<Option<String>> {
        self.client_secret
            .as_deref()
            .map(|secret| compute_secret_hash(username, &self.client_id, secret))
            .transpose()
    }

    async fn fetch_user(&self, access_token: &str) -> Result<UserProfile> {
        let output = self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| map_cognito_error("GetUser", e))?;

        Ok(profile_from_attributes(
            output.username(),
            output.user_attributes(),
        ))
    }
}

#[async_trait]
impl AuthService for CognitoAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let mut request = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password);
        if let Some(hash) = self.secret_hash(email)? {
            request = request.auth_parameters("SECRET_HASH", hash);
        }

        let output = request
            .send()
            .await
            .map_err(|e| map_cognito_error("InitiateAuth", e))?;

        let Some(result) = output.authentication_result() else {
            // MFA and forced password change challenges are not handled here
            let challenge = output
                .challenge_name()
                .map(|c| c.as_str().to_string())
                .unwrap_or_default();
            tracing::warn!(%challenge, "Login returned an unsupported challenge");
            return Err(match challenge.as_str() {
                "NEW_PASSWORD_REQUIRED" => AuthError::PasswordResetRequired,
                _ => AuthError::Provider(format!("unsupported challenge: {challenge}")),
            });
        };

        let access_token = result
            .access_token()
            .ok_or_else(|| AuthError::Provider("missing access token".to_string()))?;
        let id_token = result
            .id_token()
            .ok_or_else(|| AuthError::Provider("missing id token".to_string()))?;

        Ok(AuthTokens {
            access_token: access_token.to_string(),
            id_token: id_token.to_string(),
            refresh_token: result.refresh_token().map(str::to_string),
            expires_in: i64::from(result.expires_in()),
        })
    }

    async fn signup(&self, email: &str, password: &str) -> Result<SignupOutcome> {
        let email_attribute = AttributeType::builder()
            .name("email")
            .value(email)
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let output = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .user_attributes(email_attribute)
            .set_secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| map_cognito_error("SignUp", e))?;

        Ok(SignupOutcome {
            user_id: UserId::new(output.user_sub()),
            email: email.to_string(),
            confirmed: output.user_confirmed(),
        })
    }

    async fn confirm_signup(&self, email: &str, code: &str) -> Result<()> {
        self.client
            .confirm_sign_up()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .set_secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| map_cognito_error("ConfirmSignUp", e))?;

        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        self.client
            .forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .set_secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| map_cognito_error("ForgotPassword", e))?;

        Ok(())
    }

    /// Cognito cannot check a reset code without consuming it, so only the
    /// shape of the input is checked here.
    async fn verify_reset_code(&self, email: &str, code: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(AuthError::validation("email", "email is required"));
        }
        if code.trim().is_empty() {
            return Err(AuthError::validation("code", "code is required"));
        }
        Ok(())
    }

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .password(new_password)
            .set_secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| map_cognito_error("ConfirmForgotPassword", e))?;

        Ok(())
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        self.client
            .change_password()
            .access_token(access_token)
            .previous_password(current_password)
            .proposed_password(new_password)
            .send()
            .await
            .map_err(|e| {
                let message = e.message().map(str::to_string);
                match map_cognito_error("ChangePassword", e) {
                    AuthError::InvalidCredentials => {
                        change_password_rejection(message.as_deref())
                    }
                    other => other,
                }
            })?;

        // Revoke every token issued before the change.
        if let Err(err) = self.logout(access_token).await {
            tracing::warn!(error = %err, "Global sign-out after password change failed");
        }
        Ok(())
    }

    async fn get_user_profile(&self, access_token: &str) -> Result<UserProfile> {
        self.fetch_user(access_token).await
    }

    async fn update_user_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile> {
        if let Some(name) = &update.name {
            let attribute = AttributeType::builder()
                .name("name")
                .value(name.trim())
                .build()
                .map_err(|e| AuthError::Provider(e.to_string()))?;

            self.client
                .update_user_attributes()
                .access_token(access_token)
                .user_attributes(attribute)
                .send()
                .await
                .map_err(|e| map_cognito_error("UpdateUserAttributes", e))?;
        }

        self.fetch_user(access_token).await
    }

    async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser> {
        let profile = self
            .fetch_user(access_token)
            .await
            .map_err(|e| match e {
                AuthError::InvalidCredentials | AuthError::UserNotFound => AuthError::InvalidToken,
                other => other,
            })?;

        Ok(AuthenticatedUser {
            user_id: profile.user_id,
            email: profile.email,
            name: profile.name,
            access_token: access_token.to_string(),
        })
    }

    async fn logout(&self, access_token: &str) -> Result<()> {
        self.client
            .global_sign_out()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| map_cognito_error("GlobalSignOut", e))?;

        Ok(())
    }

    fn mode(&self) -> DeploymentMode {
        DeploymentMode::Cloud
    }
}

/// Builds a profile from `GetUser` attributes. The `sub` attribute is the
/// stable user id; the username is used when it is absent.
fn profile_from_attributes(username: &str, attributes: &[AttributeType]) -> UserProfile {
    let attribute = |name: &str| {
        attributes
            .iter()
            .find(|a| a.name() == name)
            .and_then(|a| a.value())
            .map(str::to_string)
    };

    let email = attribute("email").unwrap_or_default();
    let name = attribute("name")
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| display_name(&email));

    UserProfile {
        user_id: UserId::new(attribute("sub").unwrap_or_else(|| username.to_string())),
        email_verified: attribute("email_verified").as_deref() == Some("true"),
        email,
        name,
    }
}

/// Cognito answers both a wrong previous password and an expired, revoked or
/// malformed access token with `NotAuthorizedException`; only the message
/// differs.
fn change_password_rejection(message: Option<&str>) -> AuthError {
    match message {
        Some(m) if m.to_ascii_lowercase().contains("access token") => AuthError::InvalidToken,
        _ => AuthError::IncorrectPassword,
    }
}

/// Map an SDK error to `AuthError` through its error code.
fn map_cognito_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> AuthError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let mapped = match err.code() {
        Some(code) => AuthError::from_provider_code(code),
        None => AuthError::Provider(format!("{operation} failed")),
    };

    if mapped.is_internal() {
        tracing::error!(operation, error = %DisplayErrorContext(&err), "Cognito request failed");
    } else {
        tracing::debug!(operation, error = %mapped, "Cognito rejected request");
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> AttributeType {
        AttributeType::builder().name(name).value(value).build().unwrap()
    }

    #[test]
    fn test_profile_from_attributes() {
        let profile = profile_from_attributes(
            "alice@example.com",
            &[
                attr("sub", "0f9c-sub"),
                attr("email", "alice@example.com"),
                attr("email_verified", "true"),
                attr("name", "Alice"),
            ],
        );

        assert_eq!(profile.user_id.as_str(), "0f9c-sub");
        assert_eq!(profile.email, "alice@example.com");
        assert_eq!(profile.name, "Alice");
        assert!(profile.email_verified);
    }

    #[test]
    fn test_profile_defaults() {
        let profile = profile_from_attributes("bob", &[attr("email", "bob@example.com")]);

        assert_eq!(profile.user_id.as_str(), "bob");
        assert_eq!(profile.name, "bob");
        assert!(!profile.email_verified);
    }

    fn service(secret: Option<&str>) -> CognitoAuthService {
        let sdk_config = aws_config::SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        CognitoAuthService::new(
            Client::new(&sdk_config),
            &CognitoConfig {
                client_id: "client-id".to_string(),
                client_secret: secret.map(str::to_string),
                region: None,
                endpoint_url: None,
            },
        )
    }

    #[test]
    fn test_change_password_rejection() {
        assert_eq!(
            change_password_rejection(Some("Incorrect username or password.")),
            AuthError::IncorrectPassword
        );
        assert_eq!(change_password_rejection(None), AuthError::IncorrectPassword);
        for message in [
            "Access Token has expired",
            "Access Token has been revoked",
            "Invalid Access Token",
        ] {
            assert_eq!(
                change_password_rejection(Some(message)),
                AuthError::InvalidToken
            );
        }
    }

    #[test]
    fn test_secret_hash_only_with_secret() {
        assert_eq!(service(None).secret_hash("a@b.c").unwrap(), None);
        assert_eq!(
            service(Some("secret")).secret_hash("a@b.c").unwrap(),
            Some(compute_secret_hash("a@b.c", "client-id", "secret").unwrap())
        );
    }

    #[tokio::test]
    async fn test_verify_reset_code_checks_fields_only() {
        let service = service(None);
        assert!(service.verify_reset_code("a@b.c", "123456").await.is_ok());
        assert!(matches!(
            service.verify_reset_code("a@b.c", "").await,
            Err(AuthError::Validation { .. })
        ));
        assert_eq!(service.mode(), DeploymentMode::Cloud);
    }
}
