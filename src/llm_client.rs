//! Transport seam between the dispatcher and a hosted inference endpoint

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// A remote endpoint that runs one model invocation per call
///
/// Implementations only move bytes: the request body is already transcoded for
/// the model family and the returned body is handed back to the adapter for
/// parsing.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Invoke `model_id` with a JSON request body, returning the raw response body
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Bytes>;

    /// Get the client type for debugging/logging
    fn client_type(&self) -> &str;

    /// Get the endpoint the client talks to
    fn endpoint(&self) -> &str;
}
