//! HTTP clients for the hosted inference runtime and prompt registry
//!
//! Both clients send the optional bearer token from [`ChatConfig`] and leave
//! timeouts to the transport default.

use crate::catalog::{PromptDetails, PromptRegistry, PromptSummaryPage};
use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::llm_client::InferenceClient;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Inference runtime client
pub struct BedrockRuntimeClient {
    /// HTTP client
    client: Client,
    /// Base URL
    base_url: Url,
    /// Bearer token
    api_key: Option<SecretString>,
}

impl BedrockRuntimeClient {
    /// Create a new runtime client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = ChatConfig::from_env()?;
        Self::new(&config)
    }

    /// Create a new runtime client with the given configuration
    pub fn new(config: &ChatConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: check_base(config.runtime_url()?)?,
            api_key: config.api_key.clone(),
        })
    }

    /// URL of the invoke operation for `model_id`
    pub fn invoke_url(&self, model_id: &str) -> Result<Url> {
        join_segments(&self.base_url, &["model", model_id, "invoke"])
    }
}

#[async_trait]
impl InferenceClient for BedrockRuntimeClient {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Bytes> {
        let url = self.invoke_url(model_id)?;
        debug!(%url, bytes = body.len(), "Invoking model");

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .body(body);

        let response = with_bearer(request, self.api_key.as_ref()).send().await?;
        let response = check_status(response, "Invoke").await?;
        Ok(response.bytes().await?)
    }

    fn client_type(&self) -> &str {
        "bedrock-runtime"
    }

    fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }
}

/// Prompt registry client
pub struct BedrockAgentClient {
    /// HTTP client
    client: Client,
    /// Base URL
    base_url: Url,
    /// Bearer token
    api_key: Option<SecretString>,
    /// `maxResults` sent with list requests
    page_size: Option<u32>,
}

impl BedrockAgentClient {
    /// Create a new registry client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = ChatConfig::from_env()?;
        Self::new(&config)
    }

    /// Create a new registry client with the given configuration
    pub fn new(config: &ChatConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: check_base(config.registry_url()?)?,
            api_key: config.api_key.clone(),
            page_size: config.registry_page_size,
        })
    }

    /// Get the base URL
    pub fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }

    /// URL of the get-prompt operation for `prompt_id`
    pub fn prompt_url(&self, prompt_id: &str) -> Result<Url> {
        join_segments(&self.base_url, &["prompts", prompt_id, ""])
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T> {
        let request = with_bearer(request.header(ACCEPT, JSON_MEDIA_TYPE), self.api_key.as_ref());
        let response = request
            .send()
            .await
            .map_err(|e| Error::registry_unavailable(format!("{} failed: {}", operation, e)))?;
        let response = check_status(response, operation)
            .await
            .map_err(|e| Error::registry_unavailable(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| Error::registry_unavailable(format!("{} returned malformed body: {}", operation, e)))
    }
}

#[async_trait]
impl PromptRegistry for BedrockAgentClient {
    async fn list_prompts(&self, next_token: Option<&str>) -> Result<PromptSummaryPage> {
        let url = join_segments(&self.base_url, &["prompts", ""])?;

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(page_size) = self.page_size {
            query.push(("maxResults", page_size.to_string()));
        }
        if let Some(token) = next_token {
            query.push(("nextToken", token.to_string()));
        }

        self.get_json(self.client.get(url).query(&query), "ListPrompts")
            .await
    }

    async fn get_prompt(&self, prompt_id: &str) -> Result<PromptDetails> {
        let url = self.prompt_url(prompt_id)?;
        self.get_json(self.client.get(url), "GetPrompt").await
    }
}

fn check_base(url: Url) -> Result<Url> {
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("{} cannot be used as a base URL", url)));
    }
    Ok(url)
}

/// Append path segments to `base`, percent-encoding each one
fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::config(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn with_bearer(request: RequestBuilder, api_key: Option<&SecretString>) -> RequestBuilder {
    match api_key {
        Some(key) => request.header(AUTHORIZATION, format!("Bearer {}", key.expose_secret())),
        None => request,
    }
}

async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = format!("{} failed with status {}: {}", operation, status, error_text);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::auth(message)),
        _ => Err(Error::transport(message)),
    }
}
