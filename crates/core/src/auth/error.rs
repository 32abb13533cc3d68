use thiserror::Error;

/// Errors produced by any [`AuthService`](super::AuthService) backend.
///
/// The first group mirrors the error codes returned by the Cognito user pool
/// API so both backends report failures identically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User does not exist")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Password does not meet requirements")]
    InvalidPassword,

    #[error("Invalid parameter")]
    InvalidParameter,

    #[error("Invalid confirmation code")]
    CodeMismatch,

    #[error("Confirmation code expired")]
    ExpiredCode,

    #[error("Too many attempts, please try again later")]
    LimitExceeded,

    #[error("Password reset is required")]
    PasswordResetRequired,

    #[error("Too many requests, please try again later")]
    TooManyRequests,

    #[error("User is not confirmed")]
    UserNotConfirmed,

    #[error("Current password incorrect")]
    IncorrectPassword,

    #[error("Authentication token missing")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}

/// Message shown to clients for errors whose details stay in the logs.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

impl AuthError {
    /// Maps a user pool error code (the `__type` of the service error) to an
    /// [`AuthError`]. Unknown codes become [`AuthError::Provider`].
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "NotAuthorizedException" => Self::InvalidCredentials,
            "UserNotFoundException" => Self::UserNotFound,
            "UsernameExistsException" => Self::UserAlreadyExists,
            "InvalidPasswordException" => Self::InvalidPassword,
            "InvalidParameterException" => Self::InvalidParameter,
            "CodeMismatchException" => Self::CodeMismatch,
            "ExpiredCodeException" => Self::ExpiredCode,
            "LimitExceededException" => Self::LimitExceeded,
            "PasswordResetRequiredException" => Self::PasswordResetRequired,
            "TooManyRequestsException" => Self::TooManyRequests,
            "UserNotConfirmedException" => Self::UserNotConfirmed,
            other => Self::Provider(other.to_string()),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Message safe to return to the client.
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Provider(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// True for failures of the server or the provider rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Provider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes_map_to_variants() {
        let cases = [
            ("NotAuthorizedException", AuthError::InvalidCredentials),
            ("UserNotFoundException", AuthError::UserNotFound),
            ("UsernameExistsException", AuthError::UserAlreadyExists),
            ("InvalidPasswordException", AuthError::InvalidPassword),
            ("InvalidParameterException", AuthError::InvalidParameter),
            ("CodeMismatchException", AuthError::CodeMismatch),
            ("ExpiredCodeException", AuthError::ExpiredCode),
            ("LimitExceededException", AuthError::LimitExceeded),
            (
                "PasswordResetRequiredException",
                AuthError::PasswordResetRequired,
            ),
            ("TooManyRequestsException", AuthError::TooManyRequests),
            ("UserNotConfirmedException", AuthError::UserNotConfirmed),
        ];

        for (code, expected) in cases {
            assert_eq!(AuthError::from_provider_code(code), expected, "{code}");
        }
    }

    #[test]
    fn test_unknown_code_is_provider_error() {
        let err = AuthError::from_provider_code("InternalErrorException");
        assert_eq!(
            err,
            AuthError::Provider("InternalErrorException".to_string())
        );
        assert_eq!(err.public_message(), "An unexpected error occurred");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AuthError::LimitExceeded.public_message(),
            "Too many attempts, please try again later"
        );
        assert_eq!(
            AuthError::validation("email", "Invalid email format").to_string(),
            "Validation error: email - Invalid email format"
        );
        assert_eq!(
            AuthError::Storage("disk full".to_string()).public_message(),
            "An unexpected error occurred"
        );
    }

    #[test]
    fn test_is_internal() {
        assert!(AuthError::Provider("x".to_string()).is_internal());
        assert!(!AuthError::InvalidToken.is_internal());
    }
}
