use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

/// FieldError
///
/// A single validation violation, attributed to the offending field. The 400
/// response body carries the full list, so a client can fix every problem in
/// one round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// ValidationPolicy
///
/// The configurable knobs of the validator. Sourced from AppConfig rather than
/// hard-coded so deployments can tighten the password rule without a rebuild.
#[derive(Debug, Clone, Copy)]
pub struct ValidationPolicy {
    pub min_password_length: usize,
}

/// validate
///
/// Checks every invariant of a candidate record and returns **all** violations,
/// not just the first. `password` is only supplied on the create path; update
/// paths cannot carry a password at all.
pub fn validate(
    candidate: &User,
    password: Option<&str>,
    policy: &ValidationPolicy,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if candidate.first_name.trim().is_empty() {
        errors.push(FieldError::new("firstName", "must not be empty"));
    }
    if candidate.last_name.trim().is_empty() {
        errors.push(FieldError::new("lastName", "must not be empty"));
    }
    if !email_is_valid(&candidate.email) {
        errors.push(FieldError::new("email", "is not a valid email address"));
    }
    if let Some(raw) = password {
        if raw.len() < policy.min_password_length {
            errors.push(FieldError::new(
                "password",
                &format!(
                    "must be at least {} characters long",
                    policy.min_password_length
                ),
            ));
        }
    }

    errors
}

/// email_is_valid
///
/// Standard address grammar: non-empty local part, exactly one '@', and a
/// domain containing at least one dot with no empty labels (so no leading or
/// trailing dot). Deliberately does not attempt full RFC 5322.
pub fn email_is_valid(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}
