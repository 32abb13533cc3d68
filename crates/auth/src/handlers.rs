//! HTTP handlers for account routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use spendtrack_core::api::{
    require_fields, validate_email, validate_password_strength, SuccessResponse, TokenResponse,
};
use spendtrack_core::auth::{ProfileUpdate, SignupOutcome, UserProfile};
use spendtrack_core::serde::deserialize_optional_string;

use crate::error::AuthError;
use crate::extractors::CurrentUser;
use crate::AuthState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub current_password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub new_password: Option<String>,
}

/// Payload returned by sign-up.
#[derive(Debug, Serialize)]
pub struct SignupData {
    pub user_id: String,
    pub email: String,
    pub confirmed: bool,
}

impl From<SignupOutcome> for SignupData {
    fn from(outcome: SignupOutcome) -> Self {
        Self {
            user_id: outcome.user_id.to_string(),
            email: outcome.email,
            confirmed: outcome.confirmed,
        }
    }
}

/// Creates the auth router with all account routes.
///
/// Routes:
/// - `POST /api/signup/` - Register a new account
/// - `POST /api/confirm-signup/` - Confirm an account with its code
/// - `POST /api/login/` - Exchange credentials for tokens (sets the access cookie)
/// - `POST /api/forgot-password/` - Send a password reset code
/// - `POST /api/verify-reset-code/` - Check a reset code
/// - `POST /api/confirm-forgot-password/` - Set a new password with a reset code
/// - `POST /api/logout/` - End the current session
/// - `GET /api/profile/` - Get the caller's profile
/// - `PUT /api/profile/` - Update the caller's profile
/// - `POST /api/profile/change-password/` - Change password and end sessions
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/api/signup/", post(signup))
        .route("/api/confirm-signup/", post(confirm_signup))
        .route("/api/login/", post(login))
        .route("/api/forgot-password/", post(forgot_password))
        .route("/api/verify-reset-code/", post(verify_reset_code))
        .route("/api/confirm-forgot-password/", post(confirm_forgot_password))
        .route("/api/logout/", post(logout))
        .route("/api/profile/", get(get_profile).put(update_profile))
        .route("/api/profile/change-password/", post(change_password))
}

async fn signup(
    State(state): State<AuthState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<SignupData>>), AuthError> {
    let Json(body) = payload?;

    let mut errors = require_fields(&[
        ("email", body.email.as_deref()),
        ("password", body.password.as_deref()),
    ]);
    if let Some(email) = &body.email {
        errors.check("email", validate_email(email));
    }
    if let Some(password) = &body.password {
        errors.check("password", validate_password_strength(password));
    }
    errors.into_result()?;

    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();
    let outcome = state.service.signup(email.trim(), &password).await?;

    let message = if outcome.confirmed {
        "Sign up successful! You can now log in."
    } else {
        "Sign up successful! Please check your email for the confirmation code."
    };

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(message, outcome.into())),
    ))
}

async fn confirm_signup(
    State(state): State<AuthState>,
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<()>>, AuthError> {
    let Json(body) = payload?;
    require_fields(&[
        ("email", body.email.as_deref()),
        ("code", body.code.as_deref()),
    ])
    .into_result()?;

    let email = body.email.unwrap_or_default();
    let code = body.code.unwrap_or_default();
    state.service.confirm_signup(email.trim(), code.trim()).await?;

    Ok(Json(SuccessResponse::message("Account confirmed successfully")))
}

async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<TokenResponse>), AuthError> {
    let Json(body) = payload?;
    require_fields(&[
        ("email", body.email.as_deref()),
        ("password", body.password.as_deref()),
    ])
    .into_result()?;

    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();
    let tokens = state.service.login(email.trim(), &password).await?;

    let cookie = Cookie::build((state.config.cookie_name.clone(), tokens.access_token))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(tokens.expires_in))
        .build();

    Ok((
        jar.add(cookie),
        Json(TokenResponse::new(
            "Login successful",
            tokens.id_token,
            tokens.refresh_token,
            tokens.expires_in,
        )),
    ))
}

async fn forgot_password(
    State(state): State<AuthState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<()>>, AuthError> {
    let Json(body) = payload?;
    let mut errors = require_fields(&[("email", body.email.as_deref())]);
    if let Some(email) = &body.email {
        errors.check("email", validate_email(email));
    }
    errors.into_result()?;

    let email = body.email.unwrap_or_default();
    state.service.forgot_password(email.trim()).await?;

    Ok(Json(SuccessResponse::message("Password reset code sent")))
}

async fn verify_reset_code(
    State(state): State<AuthState>,
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<()>>, AuthError> {
    let Json(body) = payload?;
    require_fields(&[
        ("email", body.email.as_deref()),
        ("code", body.code.as_deref()),
    ])
    .into_result()?;

    let email = body.email.unwrap_or_default();
    let code = body.code.unwrap_or_default();
    state
        .service
        .verify_reset_code(email.trim(), code.trim())
        .await?;

    Ok(Json(SuccessResponse::message("Reset code is valid")))
}

async fn confirm_forgot_password(
    State(state): State<AuthState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<()>>, AuthError> {
    let Json(body) = payload?;
    let mut errors = require_fields(&[
        ("email", body.email.as_deref()),
        ("code", body.code.as_deref()),
        ("new_password", body.new_password.as_deref()),
    ]);
    if let Some(password) = &body.new_password {
        errors.check("new_password", validate_password_strength(password));
    }
    errors.into_result()?;

    let email = body.email.unwrap_or_default();
    let code = body.code.unwrap_or_default();
    let new_password = body.new_password.unwrap_or_default();
    state
        .service
        .confirm_forgot_password(email.trim(), code.trim(), &new_password)
        .await?;

    Ok(Json(SuccessResponse::message("Password reset successful")))
}

async fn logout(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SuccessResponse<()>>), AuthError> {
    state.service.logout(&user.access_token).await?;

    let jar = jar.remove(removal_cookie(&state));
    Ok((jar, Json(SuccessResponse::message("Logged out successfully"))))
}

async fn get_profile(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SuccessResponse<UserProfile>>, AuthError> {
    let profile = state.service.get_user_profile(&user.access_token).await?;
    Ok(Json(SuccessResponse::with_data("Profile retrieved", profile)))
}

async fn update_profile(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<SuccessResponse<UserProfile>>, AuthError> {
    let Json(update) = payload?;
    if update.is_empty() {
        require_fields(&[("name", None)]).into_result()?;
    }

    let profile = state
        .service
        .update_user_profile(&user.access_token, &update)
        .await?;
    Ok(Json(SuccessResponse::with_data("Profile updated", profile)))
}

async fn change_password(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SuccessResponse<()>>), AuthError> {
    let Json(body) = payload?;
    let mut errors = require_fields(&[
        ("current_password", body.current_password.as_deref()),
        ("new_password", body.new_password.as_deref()),
    ]);
    if let Some(password) = &body.new_password {
        errors.check("new_password", validate_password_strength(password));
    }
    errors.into_result()?;

    let current = body.current_password.unwrap_or_default();
    let new_password = body.new_password.unwrap_or_default();
    state
        .service
        .change_password(&user.access_token, &current, &new_password)
        .await?;

    let jar = jar.remove(removal_cookie(&state));
    Ok((
        jar,
        Json(SuccessResponse::message(
            "Password changed successfully. Please log in again.",
        )),
    ))
}

/// Clears the access cookie. Only emitted when the request carried it.
fn removal_cookie(state: &AuthState) -> Cookie<'static> {
    Cookie::build((state.config.cookie_name.clone(), ""))
        .path("/")
        .build()
}
