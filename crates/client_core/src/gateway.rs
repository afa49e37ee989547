use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::FormFields,
    error::GatewayError,
    protocol::{RelaySendRequest, TemplateParams, RELAY_ACK},
};
use tracing::debug;
use url::Url;

use crate::config::RelaySettings;

/// Outbound seam of the contact form. One call per accepted submission.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn send(&self, fields: &FormFields) -> Result<(), GatewayError>;
}

/// Posts the form to a hosted transactional email relay.
pub struct EmailRelayGateway {
    http: Client,
    endpoint: Url,
    settings: RelaySettings,
}

impl EmailRelayGateway {
    pub fn new(settings: RelaySettings) -> anyhow::Result<Self> {
        settings.ensure_complete()?;
        let endpoint = settings.endpoint_url()?;
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("failed to build relay http client")?;
        Ok(Self {
            http,
            endpoint,
            settings,
        })
    }

    fn request_for(&self, fields: &FormFields) -> RelaySendRequest {
        RelaySendRequest {
            service_id: self.settings.service_id.clone(),
            template_id: self.settings.template_id.clone(),
            user_id: self.settings.public_key.clone(),
            access_token: self.settings.private_key.clone(),
            template_params: TemplateParams::from_fields(fields, &self.settings.recipient_name),
        }
    }
}

#[async_trait]
impl SubmissionGateway for EmailRelayGateway {
    async fn send(&self, fields: &FormFields) -> Result<(), GatewayError> {
        let request = self.request_for(fields);
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        debug!(status = status.as_u16(), "relay responded");

        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim() != RELAY_ACK {
            return Err(GatewayError::UnexpectedAcknowledgment(body));
        }
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::transport(err.to_string())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
