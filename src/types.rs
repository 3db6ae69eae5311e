//! Core type definitions for promptdeck

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a prompt template came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptSource {
    /// Admin-managed template fetched from the prompt registry
    Registry {
        /// Registry-issued prompt identifier
        prompt_id: String,
    },
    /// One of the configured user favourites
    Favorite,
    /// Free text typed by the user
    UserAuthored,
}

/// A reusable prompt template
///
/// Immutable once constructed; the catalog hands out clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    text: String,
    source: PromptSource,
}

impl PromptTemplate {
    /// Create a template fetched from the registry
    pub fn from_registry(prompt_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PromptSource::Registry {
                prompt_id: prompt_id.into(),
            },
        }
    }

    /// Create a favourite template
    pub fn favorite(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PromptSource::Favorite,
        }
    }

    /// Create a template from free user input
    pub fn user_authored(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PromptSource::UserAuthored,
        }
    }

    /// Template text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Template origin
    pub fn source(&self) -> &PromptSource {
        &self.source
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A selectable model: user-facing label plus the identifier used for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelDescriptor {
    /// Label shown in the model selector
    pub label: &'static str,
    /// Model identifier sent to the inference endpoint
    pub id: &'static str,
}

impl ModelDescriptor {
    /// Every model the client offers, in selector order
    pub const ALL: &'static [ModelDescriptor] = &[presets::CLAUDE, presets::TITAN];

    /// Look up a model by its label (case-insensitive)
    pub fn by_label(label: &str) -> Option<ModelDescriptor> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.label.eq_ignore_ascii_case(label.trim()))
    }

    /// Look up a model by its exact identifier
    pub fn by_id(id: &str) -> Option<ModelDescriptor> {
        Self::ALL.iter().copied().find(|m| m.id == id)
    }
}

impl Default for ModelDescriptor {
    fn default() -> Self {
        presets::CLAUDE
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}

/// Statically enumerated models
pub mod presets {
    use super::ModelDescriptor;

    /// Anthropic Claude v2, text-completion API
    pub const CLAUDE: ModelDescriptor = ModelDescriptor {
        label: "Claude",
        id: "anthropic.claude-v2",
    };

    /// Amazon Titan Text Express
    pub const TITAN: ModelDescriptor = ModelDescriptor {
        label: "Titan",
        id: "amazon.titan-text-express-v1",
    };
}
