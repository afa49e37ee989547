use std::sync::LazyLock;

use regex::Regex;
use shared::domain::{FormFields, ValidationError, ValidationErrors};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

/// Matches `local@domain.tld` over ASCII only; letters match in either case. The value is tested as given, without trimming.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks name, email and message in that order and returns only the failing fields.
pub fn validate(fields: &FormFields) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if fields.name.trim().is_empty() {
        errors.insert(ValidationError::NameRequired);
    }

    if fields.email.trim().is_empty() {
        errors.insert(ValidationError::EmailRequired);
    } else if !is_valid_email(&fields.email) {
        errors.insert(ValidationError::EmailInvalid);
    }

    if fields.message.trim().is_empty() {
        errors.insert(ValidationError::MessageRequired);
    }

    errors
}
