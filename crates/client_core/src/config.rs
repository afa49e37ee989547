use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "contact.toml";
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_RECIPIENT_NAME: &str = "Prashant";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay credentials and routing, loaded once at startup and handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub private_key: Option<String>,
    pub recipient_name: String,
    pub timeout: Duration,
    /// Address shown next to the form for people who prefer plain email.
    pub direct_contact: Option<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RELAY_ENDPOINT.into(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: String::new(),
            private_key: None,
            recipient_name: DEFAULT_RECIPIENT_NAME.into(),
            timeout: DEFAULT_TIMEOUT,
            direct_contact: None,
        }
    }
}

impl RelaySettings {
    pub fn endpoint_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.endpoint.trim())
            .with_context(|| format!("invalid relay endpoint '{}'", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("relay endpoint must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }

    pub fn ensure_complete(&self) -> anyhow::Result<()> {
        let missing: Vec<&str> = [
            ("service_id", &self.service_id),
            ("template_id", &self.template_id),
            ("public_key", &self.public_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        if !missing.is_empty() {
            bail!("relay settings incomplete; missing {}", missing.join(", "));
        }
        if self.timeout.is_zero() {
            bail!("relay timeout must be greater than zero");
        }
        self.endpoint_url()?;
        Ok(())
    }
}

/// Setting keys as they appear in the config file, with their environment overrides.
/// Later entries win, so the `APP__` form beats the plain one.
const ENV_OVERRIDES: &[(&str, &[&str])] = &[
    ("endpoint", &["EMAILJS_ENDPOINT", "APP__EMAILJS_ENDPOINT"]),
    ("service_id", &["EMAILJS_SERVICE_ID", "APP__EMAILJS_SERVICE_ID"]),
    ("template_id", &["EMAILJS_TEMPLATE_ID", "APP__EMAILJS_TEMPLATE_ID"]),
    ("public_key", &["EMAILJS_PUBLIC_KEY", "APP__EMAILJS_PUBLIC_KEY"]),
    ("private_key", &["EMAILJS_PRIVATE_KEY", "APP__EMAILJS_PRIVATE_KEY"]),
    ("recipient_name", &["CONTACT_RECIPIENT_NAME", "APP__RECIPIENT_NAME"]),
    ("timeout_seconds", &["EMAILJS_TIMEOUT_SECONDS", "APP__TIMEOUT_SECONDS"]),
    ("direct_contact", &["CONTACT_DIRECT_EMAIL", "APP__DIRECT_CONTACT"]),
];

pub fn load_settings_from(path: &Path) -> RelaySettings {
    let mut settings = RelaySettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Err(error) = apply_file_settings(&mut settings, &raw) {
            warn!(path = %path.display(), %error, "ignoring unreadable contact config file");
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file_settings(settings: &mut RelaySettings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw).context("contact config is not valid TOML")?;
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            other => {
                warn!(%key, kind = other.type_str(), "skipping non-scalar contact config value");
                continue;
            }
        };
        apply_setting(settings, &key, value);
    }
    Ok(())
}

pub(crate) fn apply_env_overrides(
    settings: &mut RelaySettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    for &(key, env_keys) in ENV_OVERRIDES {
        for &env_key in env_keys {
            if let Some(value) = lookup(env_key) {
                apply_setting(settings, key, value);
            }
        }
    }
}

fn apply_setting(settings: &mut RelaySettings, key: &str, value: String) {
    match key {
        "endpoint" => settings.endpoint = value,
        "service_id" => settings.service_id = value,
        "template_id" => settings.template_id = value,
        "public_key" => settings.public_key = value,
        "private_key" => settings.private_key = non_blank(value),
        "recipient_name" => settings.recipient_name = value,
        "direct_contact" => settings.direct_contact = non_blank(value),
        "timeout_seconds" => match value.trim().parse::<u64>() {
            Ok(secs) => settings.timeout = Duration::from_secs(secs),
            Err(_) => warn!(%value, "ignoring non-numeric relay timeout"),
        },
        _ => warn!(%key, "ignoring unknown contact config key"),
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
