//! JSON envelopes and request validation shared by every endpoint.

mod envelope;
mod validation;

pub use envelope::{ErrorResponse, SuccessResponse, TokenResponse, ValidationErrorResponse};
pub use validation::{
    require_fields, validate_email, validate_password_strength, FieldErrors, MIN_PASSWORD_LEN,
};
