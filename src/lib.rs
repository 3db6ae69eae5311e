//! # promptdeck
//!
//! A conversational client for hosted large-language-model endpoints.
//!
//! The user picks a prompt template (fetched from a managed prompt registry or
//! one of their favourites), sends it to a model, and can clear, save or load
//! the resulting conversation.
//!
//! ## Features
//!
//! - **Prompt catalog**: admin-managed templates pulled from the registry, with
//!   prompts lacking a text body skipped rather than failing the fetch
//! - **Model adapters**: one closed enumeration of model families, each with its
//!   own request body and response path
//! - **Distinguishable failures**: inference errors are results, never text
//!   masquerading as a reply
//! - **Conversation files**: flat JSON arrays of `{role, content}`, replaced
//!   wholesale on load
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promptdeck::{BedrockAgentClient, BedrockRuntimeClient, ChatConfig, ChatSession, InferenceDispatcher};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ChatConfig::from_env()?;
//!     let dispatcher = InferenceDispatcher::new(Arc::new(BedrockRuntimeClient::new(&config)?));
//!     let registry = BedrockAgentClient::new(&config)?;
//!
//!     let (mut session, notice) = ChatSession::start(&config, dispatcher, &registry).await;
//!     println!("{}", notice);
//!
//!     if let Some(reply) = session.send("Tell me a joke").await? {
//!         println!("{}", reply);
//!     }
//!     session.save()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod bedrock;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod llm_client;
pub mod session;
pub mod tracing_ext;
pub mod turns;
pub mod types;

// Re-exports for convenience
pub use adapters::{build_request, parse_response, InvokeRequest, ModelFamily};
pub use bedrock::{BedrockAgentClient, BedrockRuntimeClient};
pub use catalog::{PromptCatalog, PromptRegistry};
pub use config::{ChatConfig, SamplingConfig};
pub use dispatcher::InferenceDispatcher;
pub use error::{Error, Result};
pub use llm_client::InferenceClient;
pub use session::{Action, ChatSession, Notice, NoticeLevel};
pub use turns::{Conversation, Role, Turn};
pub use types::{ModelDescriptor, PromptSource, PromptTemplate};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::ChatConfig;
    pub use crate::error::{Error, Result};
    pub use crate::session::{Action, ChatSession, Notice};
    pub use crate::turns::{Conversation, Turn};
    pub use crate::types::*;
}
