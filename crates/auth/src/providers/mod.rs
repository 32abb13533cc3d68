//! `AuthService` implementations.
//!
//! - Local accounts in SQLite with server-side sessions
//! - Cognito user pools (with `cognito` feature)

#[cfg(feature = "cognito")]
mod cognito;
mod local;

#[cfg(feature = "cognito")]
pub use cognito::CognitoAuthService;
pub use local::LocalAuthService;
