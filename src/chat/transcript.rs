//! Id-tagged conversation transcript
//!
//! Every entry carries a UUID. A pending "thinking" placeholder is replaced
//! by looking up its id, so overlapping submissions each resolve their own
//! placeholder regardless of completion order.

use super::{ChatErrorKind, ChatMessage, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content of an assistant entry that is still awaiting a reply
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// Lifecycle of a transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryState {
    /// Waiting for the relay to answer
    Pending,
    /// Final text is available
    Complete,
    /// The request failed; the message holds the user-facing explanation
    Failed {
        /// Failure category
        kind: ChatErrorKind,
        /// Underlying error text, for logs and `/status`
        detail: String,
    },
}

/// A single message in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Unique entry identifier
    pub id: Uuid,
    /// The rendered message
    pub message: ChatMessage,
    /// Entry lifecycle state
    pub state: EntryState,
    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}

impl TranscriptEntry {
    fn new(message: ChatMessage, state: EntryState) -> Self {
        Self {
            id: Uuid::new_v4(),
            message,
            state,
            created_at: Utc::now(),
        }
    }
}

/// Append-only conversation log for one session
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    system_prompt: Option<String>,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Create an empty transcript framed by an optional system prompt
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            system_prompt,
            entries: Vec::new(),
        }
    }

    /// Append a user message
    pub fn push_user(&mut self, text: impl Into<String>) -> Uuid {
        let entry = TranscriptEntry::new(ChatMessage::user(text), EntryState::Complete);
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Append a "thinking" placeholder for a reply that is on its way
    pub fn begin_pending(&mut self) -> Uuid {
        let entry = TranscriptEntry::new(
            ChatMessage::assistant(THINKING_PLACEHOLDER),
            EntryState::Pending,
        );
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Replace the pending placeholder `id` with the assistant reply
    ///
    /// # Returns
    ///
    /// `false` if `id` does not name a pending entry
    pub fn resolve(&mut self, id: Uuid, text: impl Into<String>) -> bool {
        match self.pending_mut(id) {
            Some(entry) => {
                entry.message.content = text.into();
                entry.state = EntryState::Complete;
                true
            }
            None => false,
        }
    }

    /// Replace the pending placeholder `id` with a categorized error message
    ///
    /// # Returns
    ///
    /// `false` if `id` does not name a pending entry
    pub fn fail(&mut self, id: Uuid, kind: ChatErrorKind, detail: impl Into<String>) -> bool {
        match self.pending_mut(id) {
            Some(entry) => {
                entry.message.content = kind.user_facing_message().to_string();
                entry.state = EntryState::Failed {
                    kind,
                    detail: detail.into(),
                };
                true
            }
            None => false,
        }
    }

    /// Messages to send upstream: the system prompt, then every completed
    /// entry in order. Pending and failed entries are left out.
    pub fn messages_for_request(&self) -> Vec<ChatMessage> {
        self.system_prompt
            .iter()
            .map(ChatMessage::system)
            .chain(
                self.entries
                    .iter()
                    .filter(|e| e.state == EntryState::Complete)
                    .map(|e| e.message.clone()),
            )
            .collect()
    }

    /// Look up an entry by id
    pub fn get(&self, id: Uuid) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// All entries in order
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with `role`
    pub fn count_role(&self, role: Role) -> usize {
        self.entries.iter().filter(|e| e.message.role == role).count()
    }

    /// Number of placeholders still awaiting a reply
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == EntryState::Pending)
            .count()
    }

    /// Drop every entry, keeping the system prompt
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn pending_mut(&mut self, id: Uuid) -> Option<&mut TranscriptEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id && e.state == EntryState::Pending)
    }
}
