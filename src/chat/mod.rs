//! Chat messages, transcript, and the routine assistant session
//!
//! - `transcript`: id-tagged, append-only conversation log
//! - `session`: submits user input through the relay and resolves replies
//! - `prompts`: system prompt and routine request construction

use serde::{Deserialize, Serialize};

pub mod prompts;
pub mod session;
pub mod transcript;

pub use session::ChatSession;
pub use transcript::{EntryState, Transcript, TranscriptEntry, THINKING_PLACEHOLDER};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation
    System,
    /// The person using the assistant
    User,
    /// The model's replies
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat-completion message
///
/// # Examples
///
/// ```
/// use routine_builder::chat::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Build me a routine");
/// assert_eq!(msg.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Category of a failed chat submission, used to pick the user-facing text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatErrorKind {
    /// The upstream rejected the relay's credential (401)
    Unauthorized,
    /// The upstream is throttling requests (429)
    RateLimited,
    /// The relay or upstream failed internally (5xx)
    Server,
    /// The relay could not be reached
    Network,
    /// Anything else
    Other,
}

impl ChatErrorKind {
    /// Text shown to the user in place of the assistant reply
    pub fn user_facing_message(self) -> &'static str {
        match self {
            Self::Unauthorized => concat!(
                "The assistant could not authenticate with the AI service. ",
                "Please check the relay's API key."
            ),
            Self::RateLimited => concat!(
                "The assistant is receiving too many requests right now. ",
                "Please wait a moment and try again."
            ),
            Self::Server => {
                "The assistant service is having trouble right now. Please try again shortly."
            }
            Self::Network => concat!(
                "Could not reach the assistant. ",
                "Check your connection and that the relay is running."
            ),
            Self::Other => {
                "Sorry, something went wrong while generating a response. Please try again."
            }
        }
    }
}
