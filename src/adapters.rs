//! Model adapters: per-family request building and response parsing
//!
//! A model identifier such as `anthropic.claude-v2` or
//! `amazon.titan-text-express-v1` is split into its vendor and family tag, and
//! the pair is matched exactly against [`ModelFamily`]. Each family knows the
//! request body its models expect and where the generated text sits in the
//! response.

use crate::config::SamplingConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request/response transcoding strategy for one family of models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// Anthropic Claude, text-completion API
    AnthropicClaude,
    /// Amazon Titan Text
    AmazonTitan,
}

impl ModelFamily {
    /// Resolve the family of `model_id`
    ///
    /// Fails with [`Error::UnsupportedModel`] for anything not in the enumeration.
    pub fn resolve(model_id: &str) -> Result<Self> {
        let (vendor, rest) = model_id
            .split_once('.')
            .ok_or_else(|| Error::unsupported_model(model_id))?;
        let family = rest.split(['-', ':']).next().unwrap_or_default();

        match (vendor, family) {
            ("anthropic", "claude") => Ok(Self::AnthropicClaude),
            ("amazon", "titan") => Ok(Self::AmazonTitan),
            _ => Err(Error::unsupported_model(model_id)),
        }
    }

    /// Build the request body for `user_text`
    pub fn build_body(self, user_text: &str, sampling: &SamplingConfig) -> RequestBody {
        match self {
            Self::AnthropicClaude => RequestBody::ClaudeText(ClaudeTextRequest {
                prompt: format!("\n\nHuman: {}\n\nAssistant:", user_text),
                max_tokens_to_sample: sampling.max_tokens,
                temperature: sampling.temperature,
                top_p: sampling.top_p,
            }),
            Self::AmazonTitan => RequestBody::TitanText(TitanTextRequest {
                input_text: user_text.to_string(),
                text_generation_config: TitanGenerationConfig {
                    max_token_count: sampling.max_tokens,
                    temperature: sampling.temperature,
                    top_p: sampling.top_p,
                },
            }),
        }
    }

    /// Extract the generated text from a raw response body
    pub fn parse_body(self, model_id: &str, raw: &[u8]) -> Result<String> {
        match self {
            Self::AnthropicClaude => {
                let response: ClaudeTextResponse = serde_json::from_slice(raw)
                    .map_err(|e| Error::unrecognized_shape(model_id, e.to_string()))?;
                Ok(response.completion)
            }
            Self::AmazonTitan => {
                let response: TitanTextResponse = serde_json::from_slice(raw)
                    .map_err(|e| Error::unrecognized_shape(model_id, e.to_string()))?;
                response
                    .results
                    .into_iter()
                    .next()
                    .map(|result| result.output_text)
                    .ok_or_else(|| Error::unrecognized_shape(model_id, "empty `results` array"))
            }
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnthropicClaude => f.write_str("anthropic-claude"),
            Self::AmazonTitan => f.write_str("amazon-titan"),
        }
    }
}

/// A fully transcoded inference request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    /// Model identifier to invoke
    pub model_id: String,
    /// Family the identifier resolved to
    pub family: ModelFamily,
    /// Family-specific request body
    pub body: RequestBody,
}

impl InvokeRequest {
    /// Serialize the body as JSON
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.body)?)
    }
}

/// Family-specific request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// Claude text-completion body
    ClaudeText(ClaudeTextRequest),
    /// Titan text body
    TitanText(TitanTextRequest),
}

/// Claude text-completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaudeTextRequest {
    /// Prompt wrapped in Human/Assistant markers
    pub prompt: String,
    /// Maximum tokens to sample
    pub max_tokens_to_sample: u32,
    /// Temperature for sampling
    pub temperature: f32,
    /// Top-p sampling
    pub top_p: f32,
}

/// Titan text request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextRequest {
    /// Raw user text
    pub input_text: String,
    /// Sampling parameters
    pub text_generation_config: TitanGenerationConfig,
}

/// Titan sampling block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanGenerationConfig {
    /// Maximum tokens to generate
    pub max_token_count: u32,
    /// Temperature for sampling
    pub temperature: f32,
    /// Top-p sampling
    pub top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ClaudeTextResponse {
    completion: String,
}

#[derive(Debug, Deserialize)]
struct TitanTextResponse {
    results: Vec<TitanResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanResult {
    output_text: String,
}

/// Build the request for `model_id`
///
/// Resolution happens before anything else, so an unknown model never reaches
/// a transport.
pub fn build_request(
    model_id: &str,
    user_text: &str,
    sampling: &SamplingConfig,
) -> Result<InvokeRequest> {
    let family = ModelFamily::resolve(model_id)?;
    Ok(InvokeRequest {
        model_id: model_id.to_string(),
        family,
        body: family.build_body(user_text, sampling),
    })
}

/// Parse a raw response body from `model_id` into plain text
pub fn parse_response(model_id: &str, raw: &[u8]) -> Result<String> {
    ModelFamily::resolve(model_id)?.parse_body(model_id, raw)
}
