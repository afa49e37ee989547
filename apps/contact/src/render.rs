//! Plain-text rendering of the form state for the terminal.

use std::fmt::Write as _;

use shared::domain::{FormField, FormSnapshot};

pub const SENDING_LABEL: &str = "Sending...";

fn label(field: FormField) -> &'static str {
    match field {
        FormField::Name => "Name",
        FormField::Email => "Email",
        FormField::Message => "Message",
    }
}

pub fn render_snapshot(snapshot: &FormSnapshot) -> String {
    let mut out = String::new();
    if let Some(message) = snapshot.status.message() {
        let _ = writeln!(out, "{message}");
    }
    for (field, error) in snapshot.errors.iter() {
        let _ = writeln!(out, "{}: {error}", label(field));
    }
    if snapshot.in_flight {
        let _ = writeln!(out, "{SENDING_LABEL}");
    }
    out
}

pub fn direct_contact_line(address: &str) -> String {
    format!("Or reach out directly via: {address}")
}
