//! Error types for the analysis service transport.
//!
//! Transport errors never cross a controller boundary: the session guard
//! turns them into a `Failed` state and the conversation controller turns
//! them into an apology message.

use thiserror::Error;

/// Failures talking to the remote analysis/chat service.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to analysis service at {0}")]
    Connect(String),

    #[error("Analysis service error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode service response: {0}")]
    Decode(String),

    #[error("Failed to send request: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether the failure happened before the service produced any response.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_) | TransportError::Connect(_) | TransportError::Request(_)
        )
    }
}
