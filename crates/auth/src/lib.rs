//! Authentication for spendtrack.
//!
//! This crate provides:
//! - `AuthService` backends: local accounts with SQLite sessions, and Cognito
//!   (with the `cognito` feature)
//! - Axum extractors for authenticated requests
//! - The account routes (sign-up, login, password reset, profile)

mod config;
mod error;
mod extractors;
mod handlers;
mod password;
mod providers;
mod sessions;
mod state;

pub use config::{AuthConfig, CognitoConfig};
pub use error::AuthError;
pub use extractors::CurrentUser;
pub use handlers::auth_routes;
#[cfg(feature = "cognito")]
pub use providers::CognitoAuthService;
pub use providers::LocalAuthService;
pub use sessions::{Session, SessionStore};
pub use state::AuthState;
