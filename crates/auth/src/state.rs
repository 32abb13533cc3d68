//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use spendtrack_core::auth::AuthService;

use crate::config::AuthConfig;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<dyn AuthService>,
    pub config: AuthConfig,
}

impl AuthState {
    pub fn new(service: Arc<dyn AuthService>, config: AuthConfig) -> Self {
        Self { service, config }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
