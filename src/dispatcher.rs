//! Inference dispatcher: one transcoded request in, plain text out

use crate::adapters::{self, InvokeRequest};
use crate::config::SamplingConfig;
use crate::error::{Error, Result};
use crate::llm_client::InferenceClient;
use std::sync::Arc;
use tracing::{debug, info};

/// Sends adapter-built requests to an [`InferenceClient`] and normalizes replies
#[derive(Clone)]
pub struct InferenceDispatcher {
    client: Arc<dyn InferenceClient>,
}

impl InferenceDispatcher {
    /// Create a dispatcher over `client`
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    /// Build the request for `model_id` and invoke it
    ///
    /// Unknown models fail with [`Error::UnsupportedModel`] before the client is
    /// touched.
    pub async fn send(
        &self,
        model_id: &str,
        user_text: &str,
        sampling: &SamplingConfig,
    ) -> Result<String> {
        let request = adapters::build_request(model_id, user_text, sampling)?;
        self.invoke(request).await
    }

    /// Perform one inference call and return the generated text
    ///
    /// The call runs on a spawned task so the caller's runtime keeps servicing
    /// other work; this future completes once that task does. There is no retry.
    pub async fn invoke(&self, request: InvokeRequest) -> Result<String> {
        let body = request.to_bytes()?;
        info!(
            model = %request.model_id,
            family = %request.family,
            client = self.client.client_type(),
            bytes = body.len(),
            "Dispatching inference request"
        );

        let client = Arc::clone(&self.client);
        let model_id = request.model_id.clone();
        let raw = tokio::spawn(async move { client.invoke_model(&model_id, body).await })
            .await
            .map_err(|e| Error::transport(format!("inference task did not complete: {}", e)))??;

        debug!(model = %request.model_id, bytes = raw.len(), "Received inference response");
        request.family.parse_body(&request.model_id, &raw)
    }

    /// Get the underlying client
    pub fn client(&self) -> &Arc<dyn InferenceClient> {
        &self.client
    }
}
