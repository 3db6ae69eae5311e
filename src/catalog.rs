//! Prompt catalog: admin-managed templates fetched from the prompt registry

use crate::error::{Error, Result};
use crate::types::PromptTemplate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Source of prompt summaries and prompt details
#[async_trait]
pub trait PromptRegistry: Send + Sync {
    /// Fetch one page of prompt summaries, continuing from `next_token`
    async fn list_prompts(&self, next_token: Option<&str>) -> Result<PromptSummaryPage>;

    /// Fetch the full details of one prompt
    async fn get_prompt(&self, prompt_id: &str) -> Result<PromptDetails>;
}

/// One page of the registry's prompt listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSummaryPage {
    /// Prompt summaries on this page
    #[serde(default)]
    pub prompt_summaries: Vec<PromptSummary>,
    /// Continuation token, absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Summary entry of a prompt listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptSummary {
    /// Prompt identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Prompt name
    #[serde(default)]
    pub name: Option<String>,
}

/// Full prompt definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDetails {
    /// Prompt identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Name of the variant to use by default
    #[serde(default)]
    pub default_variant: Option<String>,
    /// Declared variants, in registry order
    #[serde(default)]
    pub variants: Vec<PromptVariant>,
}

/// One variant of a prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariant {
    /// Variant name
    #[serde(default)]
    pub name: Option<String>,
    /// Template configuration; only the text form is understood
    #[serde(default)]
    pub template_configuration: Option<TemplateConfiguration>,
}

/// Template configuration of a variant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfiguration {
    /// Text template block
    #[serde(default)]
    pub text: Option<TextTemplate>,
}

/// Text template block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextTemplate {
    /// Template body
    #[serde(default)]
    pub text: Option<String>,
}

impl PromptDetails {
    /// The variant to take the template from
    ///
    /// The variant named by `defaultVariant` when it exists, otherwise the first
    /// declared one.
    pub fn selected_variant(&self) -> Option<&PromptVariant> {
        self.default_variant
            .as_deref()
            .and_then(|name| {
                self.variants
                    .iter()
                    .find(|variant| variant.name.as_deref() == Some(name))
            })
            .or_else(|| self.variants.first())
    }

    /// Plain-text template body of the selected variant
    pub fn template_text(&self) -> Option<&str> {
        self.selected_variant()?
            .template_configuration
            .as_ref()?
            .text
            .as_ref()?
            .text
            .as_deref()
    }
}

/// Why a prompt contributed no template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The prompt declares no variants
    NoVariants,
    /// The selected variant has no text body
    NoTextBody,
}

/// A prompt that was fetched but yielded no template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPrompt {
    /// Prompt identifier
    pub prompt_id: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Templates fetched for one session
#[derive(Debug, Clone, Default)]
pub struct PromptCatalog {
    templates: Vec<PromptTemplate>,
    skipped: Vec<SkippedPrompt>,
}

impl PromptCatalog {
    /// An empty catalog, used when the registry is unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetch every prompt the registry lists and extract its template text
    ///
    /// Follows list pagination to the end, then fetches details for each
    /// identifier in listing order. Any registry failure aborts the whole fetch
    /// with [`Error::RegistryUnavailable`]; prompts without a text body are
    /// skipped and recorded.
    pub async fn fetch(registry: &dyn PromptRegistry) -> Result<Self> {
        let prompt_ids = list_prompt_ids(registry).await?;
        info!(count = prompt_ids.len(), "Listed registry prompts");

        let mut catalog = Self::default();
        for prompt_id in prompt_ids {
            let details = registry
                .get_prompt(&prompt_id)
                .await
                .map_err(into_registry_error)?;
            catalog.ingest(prompt_id, &details);
        }

        info!(
            extracted = catalog.templates.len(),
            skipped = catalog.skipped.len(),
            "Built prompt catalog"
        );
        Ok(catalog)
    }

    fn ingest(&mut self, prompt_id: String, details: &PromptDetails) {
        if details.variants.is_empty() {
            warn!(%prompt_id, "Prompt has no variants, skipping");
            self.skipped.push(SkippedPrompt {
                prompt_id,
                reason: SkipReason::NoVariants,
            });
            return;
        }

        match details.template_text() {
            Some(text) => self
                .templates
                .push(PromptTemplate::from_registry(prompt_id, text)),
            None => {
                warn!(%prompt_id, "Prompt variant has no text template, skipping");
                self.skipped.push(SkippedPrompt {
                    prompt_id,
                    reason: SkipReason::NoTextBody,
                });
            }
        }
    }

    /// Extracted templates, in registry listing order
    pub fn templates(&self) -> &[PromptTemplate] {
        &self.templates
    }

    /// Prompts that yielded no template
    pub fn skipped(&self) -> &[SkippedPrompt] {
        &self.skipped
    }

    /// Number of prompt identifiers that were fetched
    pub fn fetched(&self) -> usize {
        self.templates.len() + self.skipped.len()
    }

    /// Whether the catalog has no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

async fn list_prompt_ids(registry: &dyn PromptRegistry) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = registry
            .list_prompts(next_token.as_deref())
            .await
            .map_err(into_registry_error)?;

        ids.extend(page.prompt_summaries.into_iter().filter_map(|s| s.id));

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    Ok(ids)
}

fn into_registry_error(err: Error) -> Error {
    match err {
        Error::RegistryUnavailable(_) => err,
        other => Error::registry_unavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory registry serving fixed pages and prompt details
    struct FakeRegistry {
        pages: Vec<PromptSummaryPage>,
        details: HashMap<String, PromptDetails>,
        get_calls: AtomicUsize,
        fail_get: bool,
    }

    impl FakeRegistry {
        fn new(pages: Vec<serde_json::Value>, details: Vec<(&str, serde_json::Value)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|p| serde_json::from_value(p).unwrap())
                    .collect(),
                details: details
                    .into_iter()
                    .map(|(id, d)| (id.to_string(), serde_json::from_value(d).unwrap()))
                    .collect(),
                get_calls: AtomicUsize::new(0),
                fail_get: false,
            }
        }
    }

    #[async_trait]
    impl PromptRegistry for FakeRegistry {
        async fn list_prompts(&self, next_token: Option<&str>) -> Result<PromptSummaryPage> {
            let index = next_token.map(|t| t.parse::<usize>().unwrap()).unwrap_or(0);
            Ok(self.pages[index].clone())
        }

        async fn get_prompt(&self, prompt_id: &str) -> Result<PromptDetails> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_get {
                return Err(Error::transport("connection reset"));
            }
            Ok(self.details.get(prompt_id).cloned().unwrap_or_default())
        }
    }

    fn text_variant(name: &str, text: &str) -> serde_json::Value {
        json!({"name": name, "templateConfiguration": {"text": {"text": text}}})
    }

    #[tokio::test]
    async fn test_one_extracted_one_skipped() {
        let registry = FakeRegistry::new(
            vec![json!({"promptSummaries": [{"id": "P1"}, {"id": "P2"}]})],
            vec![
                ("P1", json!({"variants": [text_variant("v1", "Summarize: {doc}")]})),
                ("P2", json!({"variants": [{"name": "v1", "templateConfiguration": {"chat": {}}}]})),
            ],
        );

        let catalog = PromptCatalog::fetch(&registry).await.unwrap();
        let texts: Vec<&str> = catalog.templates().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["Summarize: {doc}"]);
        assert_eq!(catalog.skipped()[0].prompt_id, "P2");
        assert_eq!(catalog.skipped()[0].reason, SkipReason::NoTextBody);
        assert_eq!(catalog.fetched(), 2);
    }

    #[tokio::test]
    async fn test_empty_variants_skipped_and_counted() {
        let registry = FakeRegistry::new(
            vec![json!({"promptSummaries": [{"id": "A"}, {"id": "B"}, {"id": "C"}, {"name": "no id"}]})],
            vec![
                ("A", json!({"variants": []})),
                ("B", json!({"variants": [text_variant("v", "Translate: {text}")]})),
                ("C", json!({"variants": [{"name": "v"}]})),
            ],
        );

        let catalog = PromptCatalog::fetch(&registry).await.unwrap();
        assert_eq!(catalog.templates().len(), 1);
        assert_eq!(catalog.skipped().len(), 2);
        assert_eq!(catalog.fetched(), 3);
        assert_eq!(registry.get_calls.load(Ordering::SeqCst), 3);
        assert_eq!(catalog.skipped()[0].reason, SkipReason::NoVariants);
    }

    #[tokio::test]
    async fn test_follows_pagination_in_order() {
        let registry = FakeRegistry::new(
            vec![
                json!({"promptSummaries": [{"id": "first"}], "nextToken": "1"}),
                json!({"promptSummaries": [{"id": "second"}], "nextToken": "2"}),
                json!({"promptSummaries": [{"id": "third"}]}),
            ],
            vec![
                ("first", json!({"variants": [text_variant("v", "one")]})),
                ("second", json!({"variants": [text_variant("v", "two")]})),
                ("third", json!({"variants": [text_variant("v", "three")]})),
            ],
        );

        let catalog = PromptCatalog::fetch(&registry).await.unwrap();
        let texts: Vec<&str> = catalog.templates().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_registry_error_aborts() {
        let mut registry = FakeRegistry::new(
            vec![json!({"promptSummaries": [{"id": "P1"}, {"id": "P2"}]})],
            vec![],
        );
        registry.fail_get = true;

        let err = PromptCatalog::fetch(&registry).await.unwrap_err();
        assert!(matches!(err, Error::RegistryUnavailable(_)));
        assert_eq!(registry.get_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_variant_preferred() {
        let details: PromptDetails = serde_json::from_value(json!({
            "defaultVariant": "formal",
            "variants": [text_variant("casual", "hey {name}"), text_variant("formal", "Dear {name}")]
        }))
        .unwrap();
        assert_eq!(details.template_text(), Some("Dear {name}"));
    }

    #[test]
    fn test_unknown_default_variant_falls_back_to_first() {
        let details: PromptDetails = serde_json::from_value(json!({
            "defaultVariant": "missing",
            "variants": [text_variant("casual", "hey {name}")]
        }))
        .unwrap();
        assert_eq!(details.template_text(), Some("hey {name}"));
    }
}
