//! HTTP status codes for [`AuthError`] variants.

use super::AuthError;

/// Maps an [`AuthError`] to an HTTP status code.
///
/// - credential and token failures -> 401
/// - unconfirmed account -> 403
/// - unknown user -> 404
/// - duplicate account -> 409
/// - throttling -> 429
/// - bad input (codes, passwords, parameters) -> 400
/// - storage and provider failures -> 500
///
/// # Examples
///
/// ```
/// use spendtrack_core::auth::{auth_error_to_status_code, AuthError};
///
/// assert_eq!(auth_error_to_status_code(&AuthError::UserAlreadyExists), 409);
/// ```
pub fn auth_error_to_status_code(error: &AuthError) -> u16 {
    match error {
        AuthError::InvalidCredentials
        | AuthError::IncorrectPassword
        | AuthError::MissingToken
        | AuthError::InvalidToken => 401,
        AuthError::UserNotConfirmed => 403,
        AuthError::UserNotFound => 404,
        AuthError::UserAlreadyExists => 409,
        AuthError::LimitExceeded | AuthError::TooManyRequests => 429,
        AuthError::InvalidPassword
        | AuthError::InvalidParameter
        | AuthError::CodeMismatch
        | AuthError::ExpiredCode
        | AuthError::PasswordResetRequired
        | AuthError::Validation { .. } => 400,
        AuthError::Storage(_) | AuthError::Provider(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_table_statuses() {
        let cases = [
            ("NotAuthorizedException", 401),
            ("UserNotFoundException", 404),
            ("UsernameExistsException", 409),
            ("InvalidPasswordException", 400),
            ("InvalidParameterException", 400),
            ("CodeMismatchException", 400),
            ("ExpiredCodeException", 400),
            ("LimitExceededException", 429),
            ("PasswordResetRequiredException", 400),
            ("TooManyRequestsException", 429),
            ("SomethingElseException", 500),
        ];

        for (code, status) in cases {
            let err = AuthError::from_provider_code(code);
            assert_eq!(auth_error_to_status_code(&err), status, "{code}");
        }
    }

    #[test]
    fn test_local_variants() {
        assert_eq!(auth_error_to_status_code(&AuthError::MissingToken), 401);
        assert_eq!(auth_error_to_status_code(&AuthError::InvalidToken), 401);
        assert_eq!(auth_error_to_status_code(&AuthError::IncorrectPassword), 401);
        assert_eq!(auth_error_to_status_code(&AuthError::UserNotConfirmed), 403);
        assert_eq!(
            auth_error_to_status_code(&AuthError::validation("email", "required")),
            400
        );
        assert_eq!(
            auth_error_to_status_code(&AuthError::Storage("boom".to_string())),
            500
        );
    }
}
