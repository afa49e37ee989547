use serde::{Deserialize, Serialize};

use crate::domain::FormFields;

/// Body the relay returns when a message was accepted.
pub const RELAY_ACK: &str = "OK";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub reply_to: String,
    pub to_name: String,
    pub message: String,
}

impl TemplateParams {
    pub fn from_fields(fields: &FormFields, to_name: impl Into<String>) -> Self {
        Self {
            from_name: fields.name.clone(),
            reply_to: fields.email.clone(),
            to_name: to_name.into(),
            message: fields.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySendRequest {
    pub service_id: String,
    pub template_id: String,
    /// Public key of the relay account.
    pub user_id: String,
    #[serde(
        rename = "accessToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    pub template_params: TemplateParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_is_omitted_when_absent() {
        let request = RelaySendRequest {
            service_id: "service".into(),
            template_id: "template".into(),
            user_id: "public".into(),
            access_token: None,
            template_params: TemplateParams::from_fields(
                &FormFields::new("Ada", "ada@example.com", "hello"),
                "Prashant",
            ),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("accessToken").is_none());
        assert_eq!(json["template_params"]["reply_to"], "ada@example.com");
        assert_eq!(json["template_params"]["to_name"], "Prashant");
    }
}
