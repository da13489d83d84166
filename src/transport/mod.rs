//! Transport to the remote analysis service.
//!
//! Controllers depend on the [`Transport`] trait only; the binary injects
//! [`HttpTransport`], tests inject a scripted double.

pub mod http;
#[cfg(test)]
pub mod testutil;

pub use http::{HttpTransport, HttpTransportConfig};

use crate::error::TransportError;
use crate::models::ChatReply;
use async_trait::async_trait;
use serde_json::Value;

/// The two calls the dashboard makes against the service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `POST /analyze`; the report body is returned untouched.
    async fn analyze(&self, subject: &str) -> Result<Value, TransportError>;

    /// `POST /chat`.
    async fn chat(&self, message: &str) -> Result<ChatReply, TransportError>;
}
