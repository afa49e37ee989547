use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent successfully.";
pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Message,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Message => "message",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FormFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Message => &mut self.message,
        };
        *slot = value.into();
    }

    /// True when every field is the empty string (not merely blank).
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email address")]
    EmailInvalid,
    #[error("Message is required")]
    MessageRequired,
}

impl ValidationError {
    pub fn field(self) -> FormField {
        match self {
            ValidationError::NameRequired => FormField::Name,
            ValidationError::EmailRequired | ValidationError::EmailInvalid => FormField::Email,
            ValidationError::MessageRequired => FormField::Message,
        }
    }
}

/// Inline errors keyed by field. Only currently invalid fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(BTreeMap<FormField, ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, error: ValidationError) {
        self.0.insert(error.field(), error);
    }

    pub fn get(&self, field: FormField) -> Option<ValidationError> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    /// Returns true if an error was removed.
    pub fn clear(&mut self, field: FormField) -> bool {
        self.0.remove(&field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, ValidationError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        let mut errors = Self::new();
        for error in iter {
            errors.insert(error);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

impl SubmissionStatus {
    pub fn success() -> Self {
        Self::Success {
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure() -> Self {
        Self::Error {
            message: FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionStatus::Idle)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Idle => None,
            SubmissionStatus::Success { message } | SubmissionStatus::Error { message } => {
                Some(message)
            }
        }
    }
}

/// Everything a presentation layer needs to redraw the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub fields: FormFields,
    pub errors: ValidationErrors,
    pub status: SubmissionStatus,
    pub in_flight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_keyed_by_owning_field() {
        let errors: ValidationErrors = [ValidationError::EmailRequired, ValidationError::EmailInvalid]
            .into_iter()
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FormField::Email), Some(ValidationError::EmailInvalid));
    }

    #[test]
    fn clearing_a_missing_field_reports_false() {
        let mut errors: ValidationErrors = [ValidationError::NameRequired].into_iter().collect();
        assert!(!errors.clear(FormField::Message));
        assert!(errors.clear(FormField::Name));
        assert!(errors.is_empty());
    }

    #[test]
    fn status_serializes_with_kind_tag() {
        let json = serde_json::to_value(SubmissionStatus::failure()).expect("serialize");
        assert_eq!(json["kind"], "error");
        assert_eq!(json["message"], FAILURE_MESSAGE);
        assert_eq!(
            serde_json::to_value(SubmissionStatus::Idle).expect("serialize")["kind"],
            "idle"
        );
    }

    #[test]
    fn set_and_get_address_the_same_slot() {
        let mut fields = FormFields::default();
        assert!(fields.is_empty());
        fields.set(FormField::Message, "hi");
        assert_eq!(fields.get(FormField::Message), "hi");
        assert!(!fields.is_empty());
    }
}
