//! Turn and conversation management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Turn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered log of turns for one session
///
/// Mutated only through [`append`](Self::append), [`clear`](Self::clear) and
/// [`load`](Self::load). Turns are never reordered or deduplicated. On disk the
/// conversation is a JSON array of `{"role", "content"}` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the conversation
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drop every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Write the whole conversation to `path`, replacing any previous contents
    ///
    /// The JSON goes to a temporary file next to `path` which is then renamed
    /// over it, so a failed save leaves the previous file intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with(path.as_ref(), |file, json| file.write_all(json))
    }

    fn save_with<F>(&self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut NamedTempFile, &[u8]) -> io::Result<()>,
    {
        let json = serde_json::to_vec(&self.turns).map_err(|e| Error::persistence(path, e))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::persistence(path, e))?;
        write(&mut file, &json)
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| Error::persistence(path, e))?;
        file.persist(path)
            .map_err(|e| Error::persistence(path, e.error))?;

        info!(path = %path.display(), turns = self.turns.len(), "Saved conversation");
        Ok(())
    }

    /// Replace the conversation with the contents of `path`
    ///
    /// The file is read and decoded completely before anything is replaced, so
    /// a failed load leaves the current turns untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let loaded = Self::read(path.as_ref())?;
        self.turns = loaded;
        Ok(())
    }

    fn read(path: &Path) -> Result<Vec<Turn>> {
        let bytes = std::fs::read(path).map_err(|e| Error::persistence(path, e))?;
        let turns: Vec<Turn> =
            serde_json::from_slice(&bytes).map_err(|e| Error::persistence(path, e))?;

        debug!(path = %path.display(), turns = turns.len(), "Loaded conversation");
        Ok(turns)
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
