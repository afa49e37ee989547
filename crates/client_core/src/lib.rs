//! Contact-form workflow: field state, validation, and the outbound email relay.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod validation;

pub use config::{load_settings_from, RelaySettings};
pub use controller::{ContactFormController, SubmissionOutcome};
pub use gateway::{EmailRelayGateway, SubmissionGateway};
pub use validation::{is_valid_email, validate};
