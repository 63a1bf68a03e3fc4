//! Error type shared by the forwarding clients.

use thiserror::Error;

/// Failures talking to the downstream services.
///
/// Non-success statuses are surfaced once with the status code; there is no
/// retry layer here.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The workflow webhook answered with a non-success status.
    #[error("webhook error {status}")]
    WebhookStatus { status: u16 },
    /// The AI endpoint answered with a non-success status.
    #[error("ai error {status}")]
    AiStatus { status: u16 },
    /// Transport-level failure: connect, timeout, or body decode.
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_strings() {
        assert_eq!(
            ForwardError::WebhookStatus { status: 502 }.to_string(),
            "webhook error 502"
        );
        assert_eq!(
            ForwardError::AiStatus { status: 400 }.to_string(),
            "ai error 400"
        );
    }
}
