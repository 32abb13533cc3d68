use std::collections::BTreeMap;

use super::ValidationErrorResponse;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Per-field validation messages, keyed by request field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for `field`. The first error for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Records the error of `check`, if any.
    pub fn check(&mut self, field: &str, check: Result<(), String>) {
        if let Err(message) = check {
            self.add(field, message);
        }
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when no errors were recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn into_response(self) -> ValidationErrorResponse {
        ValidationErrorResponse::new(self.0)
    }
}

/// Reports every field whose value is missing or blank as
/// `"{field} is required"`.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (name, value) in fields {
        if value.is_none_or(|v| v.trim().is_empty()) {
            errors.add(*name, format!("{name} is required"));
        }
    }
    errors
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}
