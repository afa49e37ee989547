use thiserror::Error;

/// Failure of the outbound relay call. Variants are kept for diagnostics only;
/// every one of them is shown to the user as the same generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("relay transport failure: {0}")]
    Transport(String),
    #[error("relay request timed out")]
    Timeout,
    #[error("relay rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("relay returned unexpected acknowledgment: {0:?}")]
    UnexpectedAcknowledgment(String),
}

impl GatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
