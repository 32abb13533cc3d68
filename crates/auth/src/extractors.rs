//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use spendtrack_core::auth::{AuthError as CoreError, AuthenticatedUser};

use crate::error::AuthError;
use crate::AuthState;

/// Extractor for the authenticated user. Rejects with 401 when the request
/// carries no token or the token is not accepted by the auth backend.
pub struct CurrentUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        // Authorization header first (API clients), then the cookie (browsers)
        let token = match bearer_token(&parts.headers) {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(&auth_state.config.cookie_name)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(CoreError::MissingToken)?,
        };

        let user = auth_state.service.authenticate(&token).await?;
        Ok(CurrentUser(user))
    }
}

/// Token from an `Authorization: Bearer <token>` header, if present.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}
