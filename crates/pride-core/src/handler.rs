//! Contract between the cache layer and the origin data handler.

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::Config;
use crate::timing::TimingRecorder;

/// HTTP request type used throughout the service.
pub type Request = http::Request<Bytes>;

/// HTTP response type used throughout the service.
pub type Response = http::Response<Bytes>;

/// Uniform failure type for the origin handler.
///
/// Any failure inside the handler (network, decode, payload shape)
/// surfaces as this one error; the cache layer turns it into a branded
/// `503` and never writes the attempt to the store.
#[derive(Debug, thiserror::Error)]
#[error("origin handler failed: {0}")]
pub struct OriginError(#[from] pub anyhow::Error);

impl OriginError {
    /// Wrap any error as an origin failure.
    pub fn new(cause: impl Into<anyhow::Error>) -> Self {
        Self(cause.into())
    }

    /// Build an origin failure from a plain message.
    pub fn message(message: impl Into<String>) -> Self {
        Self(anyhow::anyhow!(message.into()))
    }
}

/// Produces the actual JSON payload when the cache cannot.
#[async_trait]
pub trait OriginHandler: Send + Sync {
    /// Handle one request against the origin data source.
    async fn handle(
        &self,
        request: &Request,
        config: &Config,
        timing: &TimingRecorder,
    ) -> Result<Response, OriginError>;
}
