mod error;
mod functions;
mod http_mapping;
mod traits;
mod types;

pub use error::AuthError;
#[cfg(feature = "auth")]
pub use functions::{
    compute_secret_hash, generate_reset_code, generate_session_token,
};
pub use functions::{
    calculate_expiry, display_name, encode_demo_id_token, is_expired,
    DemoIdTokenClaims, DEMO_TOKEN_TTL_SECS,
};
pub use http_mapping::auth_error_to_status_code;
pub use traits::{AuthService, Result};
pub use types::{
    AuthTokens, AuthenticatedUser, ProfileUpdate, SignupOutcome, UserId, UserProfile,
};
