//! Chat session: the state one interactive run owns
//!
//! A [`ChatSession`] is created when the shell starts and dropped when it
//! exits. It owns the conversation, the prompt catalog and the model choice,
//! and turns every failure into a [`Notice`] for the shell to show.

use crate::catalog::{PromptCatalog, PromptRegistry};
use crate::config::{ChatConfig, SamplingConfig};
use crate::dispatcher::InferenceDispatcher;
use crate::error::{Error, Result};
use crate::turns::{Conversation, Turn};
use crate::types::{ModelDescriptor, PromptTemplate};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Degraded but usable
    Warning,
    /// Operation failed; state is unchanged
    Error,
}

/// A user-visible message about the outcome of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text to show
    pub message: String,
}

impl Notice {
    /// Create a success notice
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Create a warning notice
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Create an error notice
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Whether this notice reports a failure
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&Error> for Notice {
    fn from(err: &Error) -> Self {
        let message = match err {
            Error::RegistryUnavailable(_) => {
                format!("Prompt catalog unavailable, only favourites are listed ({})", err)
            }
            Error::UnsupportedModel(model) => format!("Model {} is not supported", model),
            Error::Auth(_) => format!("The model endpoint rejected the credentials ({})", err),
            Error::Persistence { .. } => format!("Conversation file error ({})", err),
            _ => err.to_string(),
        };
        match err {
            Error::RegistryUnavailable(_) => Self::warning(message),
            _ => Self::error(message),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// User actions the shell can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a message with the selected model
    Send(String),
    /// Empty the conversation
    Clear,
    /// Write the conversation to the history file
    Save,
    /// Replace the conversation with the history file
    Load,
}

/// State of one interactive session
pub struct ChatSession {
    conversation: Conversation,
    catalog: PromptCatalog,
    favorites: Vec<String>,
    model: ModelDescriptor,
    sampling: SamplingConfig,
    history_path: PathBuf,
    dispatcher: InferenceDispatcher,
}

impl ChatSession {
    /// Create a session with an empty conversation and catalog
    pub fn new(config: &ChatConfig, dispatcher: InferenceDispatcher) -> Self {
        Self {
            conversation: Conversation::new(),
            catalog: PromptCatalog::empty(),
            favorites: config.favorites.clone(),
            model: ModelDescriptor::default(),
            sampling: config.sampling,
            history_path: config.history_path.clone(),
            dispatcher,
        }
    }

    /// Create a session and populate its catalog from `registry`
    pub async fn start(
        config: &ChatConfig,
        dispatcher: InferenceDispatcher,
        registry: &dyn PromptRegistry,
    ) -> (Self, Notice) {
        let mut session = Self::new(config, dispatcher);
        let notice = session.refresh_catalog(registry).await;
        (session, notice)
    }

    /// Fetch the catalog again; on failure the catalog becomes empty
    pub async fn refresh_catalog(&mut self, registry: &dyn PromptRegistry) -> Notice {
        match PromptCatalog::fetch(registry).await {
            Ok(catalog) => {
                let notice = Notice::success(format!(
                    "Loaded {} prompt(s) from the registry ({} skipped)",
                    catalog.templates().len(),
                    catalog.skipped().len()
                ));
                self.catalog = catalog;
                notice
            }
            Err(err) => {
                warn!(error = %err, "Prompt catalog unavailable");
                self.catalog = PromptCatalog::empty();
                Notice::from(&err)
            }
        }
    }

    /// Selectable prompts: catalog templates, then favourites
    pub fn prompt_options(&self) -> Vec<PromptTemplate> {
        self.catalog
            .templates()
            .iter()
            .cloned()
            .chain(self.favorites.iter().map(PromptTemplate::favorite))
            .collect()
    }

    /// Currently selected model
    pub fn model(&self) -> ModelDescriptor {
        self.model
    }

    /// Select a model by its label
    pub fn select_model(&mut self, label: &str) -> Result<ModelDescriptor> {
        let model = ModelDescriptor::by_label(label).ok_or_else(|| Error::unsupported_model(label))?;
        self.model = model;
        Ok(model)
    }

    /// The conversation so far
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The prompt catalog
    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// Where save and load read and write
    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Send `text` with the selected model
    ///
    /// On success the user turn and the assistant turn are appended together and
    /// the reply text is returned. On failure nothing is appended. Blank input is
    /// ignored and yields `Ok(None)`.
    pub async fn send(&mut self, text: &str) -> Result<Option<String>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let reply = self
            .dispatcher
            .send(self.model.id, text, &self.sampling)
            .await?;

        self.conversation.append(Turn::user(text));
        self.conversation.append(Turn::assistant(reply.clone()));
        Ok(Some(reply))
    }

    /// Empty the conversation
    pub fn clear(&mut self) {
        self.conversation.clear();
        info!("Cleared conversation");
    }

    /// Save the conversation to the history file
    pub fn save(&self) -> Result<()> {
        self.conversation.save(&self.history_path)
    }

    /// Replace the conversation with the history file; unchanged on failure
    pub fn load(&mut self) -> Result<()> {
        self.conversation.load(&self.history_path)
    }

    /// Run one action and report its outcome
    pub async fn handle(&mut self, action: Action) -> Notice {
        let outcome = match action {
            Action::Send(text) => self.send(&text).await.map(|reply| match reply {
                Some(_) => Notice::success(format!("{} replied", self.model.label)),
                None => Notice::warning("Nothing to send"),
            }),
            Action::Clear => {
                self.clear();
                Ok(Notice::success("Conversation cleared"))
            }
            Action::Save => self
                .save()
                .map(|()| Notice::success("Conversation saved successfully!")),
            Action::Load => self
                .load()
                .map(|()| Notice::success("Conversation loaded successfully!")),
        };

        outcome.unwrap_or_else(|err| {
            error!(error = %err, "Action failed");
            Notice::from(&err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PromptDetails, PromptSummaryPage};
    use crate::dispatcher::tests::ScriptedClient;
    use crate::turns::Role;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct TwoPromptRegistry;

    #[async_trait]
    impl PromptRegistry for TwoPromptRegistry {
        async fn list_prompts(&self, _next_token: Option<&str>) -> Result<PromptSummaryPage> {
            Ok(serde_json::from_value(json!({"promptSummaries": [{"id": "P1"}, {"id": "P2"}]}))?)
        }

        async fn get_prompt(&self, prompt_id: &str) -> Result<PromptDetails> {
            let details = match prompt_id {
                "P1" => json!({"variants": [{"templateConfiguration": {"text": {"text": "Summarize: {doc}"}}}]}),
                _ => json!({"variants": [{"templateConfiguration": {}}]}),
            };
            Ok(serde_json::from_value(details)?)
        }
    }

    struct DownRegistry;

    #[async_trait]
    impl PromptRegistry for DownRegistry {
        async fn list_prompts(&self, _next_token: Option<&str>) -> Result<PromptSummaryPage> {
            Err(Error::registry_unavailable("dns failure"))
        }

        async fn get_prompt(&self, _prompt_id: &str) -> Result<PromptDetails> {
            unreachable!("listing failed first")
        }
    }

    fn session_with(client: Arc<ScriptedClient>, history: PathBuf) -> ChatSession {
        let config = ChatConfig::default().with_history_path(history);
        ChatSession::new(&config, InferenceDispatcher::new(client))
    }

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let dir = tempdir().unwrap();
        let client = ScriptedClient::replying(json!({"completion": "hi there"}));
        let mut session = session_with(client.clone(), dir.path().join("h.json"));

        let reply = session.send("hello").await.unwrap();
        assert_eq!(reply.as_deref(), Some("hi there"));
        assert_eq!(
            session.conversation().turns(),
            &[Turn::user("hello"), Turn::assistant("hi there")]
        );
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_appends_nothing() {
        let dir = tempdir().unwrap();
        let client = ScriptedClient::failing(Error::auth("expired token"));
        let mut session = session_with(client, dir.path().join("h.json"));

        let notice = session.handle(Action::Send("hello".to_string())).await;
        assert!(notice.is_error());
        assert!(notice.message.contains("credentials"));
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_is_not_sent() {
        let dir = tempdir().unwrap();
        let client = ScriptedClient::replying(json!({"completion": "unused"}));
        let mut session = session_with(client.clone(), dir.path().join("h.json"));

        assert_eq!(session.send("   ").await.unwrap(), None);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_selected_model_drives_request_shape() {
        let dir = tempdir().unwrap();
        let client = ScriptedClient::replying(json!({"results": [{"outputText": "titan says hi"}]}));
        let mut session = session_with(client.clone(), dir.path().join("h.json"));

        session.select_model("Titan").unwrap();
        assert_eq!(session.send("hello").await.unwrap().as_deref(), Some("titan says hi"));
        let body = client.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["inputText"], "hello");

        assert!(matches!(
            session.select_model("Llama"),
            Err(Error::UnsupportedModel(_))
        ));
        assert_eq!(session.model().label, "Titan");
    }

    #[tokio::test]
    async fn test_catalog_then_favorites() {
        let client = ScriptedClient::replying(json!({"completion": "unused"}));
        let config = ChatConfig::default();
        let (session, notice) =
            ChatSession::start(&config, InferenceDispatcher::new(client), &TwoPromptRegistry).await;

        assert_eq!(notice.level, NoticeLevel::Success);
        let options: Vec<String> = session
            .prompt_options()
            .iter()
            .map(|p| p.text().to_string())
            .collect();
        assert_eq!(
            options,
            vec![
                "Summarize: {doc}".to_string(),
                "Tell me a joke".to_string(),
                "What's the weather like today?".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_registry_down_degrades_to_favorites() {
        let client = ScriptedClient::replying(json!({"completion": "unused"}));
        let config = ChatConfig::default().with_favorites(vec!["Only me".to_string()]);
        let (session, notice) =
            ChatSession::start(&config, InferenceDispatcher::new(client), &DownRegistry).await;

        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(session.catalog().is_empty());
        assert_eq!(session.prompt_options().len(), 1);
    }

    #[tokio::test]
    async fn test_save_clear_load_cycle() {
        let dir = tempdir().unwrap();
        let client = ScriptedClient::replying(json!({"completion": "hi there"}));
        let mut session = session_with(client, dir.path().join("h.json"));

        session.send("hello").await.unwrap();
        let saved = session.conversation().clone();
        assert_eq!(session.handle(Action::Save).await.level, NoticeLevel::Success);

        session.handle(Action::Clear).await;
        assert!(session.conversation().is_empty());

        let notice = session.handle(Action::Load).await;
        assert_eq!(notice.message, "Conversation loaded successfully!");
        assert_eq!(session.conversation(), &saved);
        assert_eq!(session.conversation().turns()[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_conversation() {
        let dir = tempdir().unwrap();
        let history = dir.path().join("h.json");
        let client = ScriptedClient::replying(json!({"completion": "hi there"}));
        let mut session = session_with(client, history.clone());

        session.send("hello").await.unwrap();
        session.save().unwrap();
        session.send("again").await.unwrap();
        let before = session.conversation().clone();

        // Simulate the file becoming unreadable between save and load.
        std::fs::remove_file(&history).unwrap();
        std::fs::create_dir(&history).unwrap();

        let notice = session.handle(Action::Load).await;
        assert!(notice.is_error());
        assert_eq!(session.conversation(), &before);
        assert_eq!(session.conversation().len(), 4);
    }
}
