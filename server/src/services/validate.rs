//! Credential validation rules.
//!
//! Field-level checks for register and login payloads, producing a
//! `field -> [messages]` map that surfaces verbatim in 422 responses.
//! These rules are a collaborator of the session service, not part of
//! the session protocol itself.

use std::collections::BTreeMap;

/// Field name -> list of human-readable problems.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const MAX_FIELD_LEN: usize = 225;
const MIN_PASSWORD_LEN: usize = 8;

/// Registration payload, mirrors the HTTP request body.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Login payload.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Normalize an email to its canonical stored form. Returns `None` when the
/// value is not shaped like an address at all.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || normalized.chars().count() > MAX_FIELD_LEN {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.entry(field.to_owned()).or_default().push(message.to_owned());
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        push(errors, "email", "The email field is required.");
    } else if normalize_email(email).is_none() {
        push(errors, "email", "The email must be a valid email address.");
    }
}

/// Validate a registration payload. An empty map means the payload passed.
/// Email uniqueness is the repository's call, not checked here.
#[must_use]
pub fn validate_register(req: &RegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if req.name.trim().is_empty() {
        push(&mut errors, "name", "The name field is required.");
    } else if req.name.trim().chars().count() > MAX_FIELD_LEN {
        push(&mut errors, "name", "The name may not be greater than 225 characters.");
    }

    check_email(&mut errors, &req.email);

    if req.password.is_empty() {
        push(&mut errors, "password", "The password field is required.");
    } else if req.password.chars().count() < MIN_PASSWORD_LEN {
        push(&mut errors, "password", "The password must be at least 8 characters.");
    }
    if !req.password.is_empty() && req.password != req.password_confirmation {
        push(&mut errors, "password", "The password confirmation does not match.");
    }

    errors
}

/// Validate a login payload. Shape checks only; whether the credentials
/// match anything is the repository's call.
#[must_use]
pub fn validate_login(req: &LoginRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, &req.email);
    if req.password.is_empty() {
        push(&mut errors, "password", "The password field is required.");
    }
    errors
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
