//! Configuration types for promptdeck

use crate::error::{Error, Result};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable carrying the bearer token for the hosted endpoints
pub const TOKEN_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Environment variable naming a YAML configuration file
pub const CONFIG_FILE_ENV: &str = "PROMPTDECK_CONFIG";

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_HISTORY_PATH: &str = "conversation_history.json";

/// Sampling parameters attached to every inference request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Maximum output length in tokens
    pub max_tokens: u32,
    /// Temperature for sampling
    pub temperature: f32,
    /// Nucleus-sampling probability
    pub top_p: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl SamplingConfig {
    /// Set the maximum output length
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the top-p parameter
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Region used to derive the default endpoints
    pub region: String,
    /// Override for the inference runtime base URL
    pub runtime_url: Option<String>,
    /// Override for the prompt registry base URL
    pub registry_url: Option<String>,
    /// File the conversation is saved to and loaded from
    pub history_path: PathBuf,
    /// User favourite prompts, listed after the catalog
    pub favorites: Vec<String>,
    /// Default sampling parameters
    pub sampling: SamplingConfig,
    /// Page size requested from the registry's list operation
    pub registry_page_size: Option<u32>,
    /// Bearer token (loaded from environment variable)
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            runtime_url: None,
            registry_url: None,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            favorites: vec![
                "Tell me a joke".to_string(),
                "What's the weather like today?".to_string(),
            ],
            sampling: SamplingConfig::default(),
            registry_page_size: None,
            api_key: None,
        }
    }
}

impl ChatConfig {
    /// Create a configuration for the given region with all other defaults
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Build the configuration from the process environment
    ///
    /// Reads `.env` if present, then the YAML file named by `PROMPTDECK_CONFIG`,
    /// then region overrides and the bearer token.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let mut config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(region) =
            std::env::var("PROMPTDECK_REGION").or_else(|_| std::env::var("AWS_REGION"))
        {
            config.region = region;
        }

        config.api_key = std::env::var(TOKEN_ENV).ok().map(SecretString::from);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Set the runtime base URL
    pub fn with_runtime_url(mut self, url: impl Into<String>) -> Self {
        self.runtime_url = Some(url.into());
        self
    }

    /// Set the registry base URL
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = Some(url.into());
        self
    }

    /// Set the history file
    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }

    /// Replace the favourite prompts
    pub fn with_favorites(mut self, favorites: Vec<String>) -> Self {
        self.favorites = favorites;
        self
    }

    /// Set the sampling defaults
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Base URL of the inference runtime
    pub fn runtime_url(&self) -> Result<Url> {
        match &self.runtime_url {
            Some(url) => parse_url(url),
            None => parse_url(&format!(
                "https://bedrock-runtime.{}.amazonaws.com",
                self.region
            )),
        }
    }

    /// Base URL of the prompt registry
    pub fn registry_url(&self) -> Result<Url> {
        match &self.registry_url {
            Some(url) => parse_url(url),
            None => parse_url(&format!(
                "https://bedrock-agent.{}.amazonaws.com",
                self.region
            )),
        }
    }

    /// Get the bearer token as a string, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret())
    }

    fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::config("region must not be empty"));
        }
        self.runtime_url()?;
        self.registry_url()?;
        if self.sampling.max_tokens == 0 {
            return Err(Error::config("sampling.max_tokens must be positive"));
        }
        if !(0.0..=1.0).contains(&self.sampling.top_p) {
            return Err(Error::config("sampling.top_p must be within 0.0..=1.0"));
        }
        Ok(())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::config(format!("Invalid URL {}: {}", raw, e)))
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("region", &self.region)
            .field("runtime_url", &self.runtime_url)
            .field("registry_url", &self.registry_url)
            .field("history_path", &self.history_path)
            .field("favorites", &self.favorites)
            .field("sampling", &self.sampling)
            .field("registry_page_size", &self.registry_page_size)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .finish()
    }
}
