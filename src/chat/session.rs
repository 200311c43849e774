//! Routine assistant chat session
//!
//! Each submission moves through `idle -> awaiting-response -> rendered |
//! errored`. The transcript lock is released while the relay call is in
//! flight, so several submissions can overlap; each resolves the
//! placeholder it created.

use super::prompts;
use super::transcript::Transcript;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::relay::{ChatRequest, RelayCallError, RelayClient};
use crate::selection::SelectionSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-request overrides passed through to the relay
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Model override
    pub model: Option<String>,
    /// Token limit override
    pub max_tokens: Option<u32>,
    /// Temperature override
    pub temperature: Option<f64>,
}

impl From<&ClientConfig> for RequestOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// A chat conversation with the routine assistant
///
/// Cloning is cheap and clones share the same transcript.
#[derive(Clone)]
pub struct ChatSession {
    transcript: Arc<Mutex<Transcript>>,
    client: RelayClient,
    options: RequestOptions,
}

impl ChatSession {
    /// Create a session using `system_prompt`, or the built-in advisor prompt
    pub fn new(client: RelayClient, system_prompt: Option<String>) -> Self {
        let prompt = system_prompt.unwrap_or_else(|| prompts::SYSTEM_PROMPT.to_string());
        Self {
            transcript: Arc::new(Mutex::new(Transcript::new(Some(prompt)))),
            client,
            options: RequestOptions::default(),
        }
    }

    /// Apply per-request overrides to every submission
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Submit user text and wait for the reply
    ///
    /// The transcript always ends up with the user message and a resolved
    /// assistant entry: the reply on success, or a categorized error
    /// message on failure.
    ///
    /// # Errors
    ///
    /// Returns the relay failure so callers can log or inspect it
    pub async fn submit(
        &self,
        text: impl Into<String>,
    ) -> std::result::Result<String, RelayCallError> {
        let (pending_id, request) = {
            let mut transcript = self.transcript.lock().await;
            transcript.push_user(text);
            let request = ChatRequest {
                model: self.options.model.clone(),
                messages: transcript.messages_for_request(),
                max_tokens: self.options.max_tokens,
                temperature: self.options.temperature,
            };
            (transcript.begin_pending(), request)
        };

        let result = self.client.send(&request).await;

        let mut transcript = self.transcript.lock().await;
        match &result {
            Ok(reply) => {
                transcript.resolve(pending_id, reply.clone());
            }
            Err(e) => {
                tracing::warn!("Chat submission failed: {}", e);
                transcript.fail(pending_id, e.kind(), e.to_string());
            }
        }

        result
    }

    /// Ask for a routine built from `selection`
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the relay call fails
    pub async fn request_routine(&self, selection: &SelectionSet) -> Result<String> {
        let message = prompts::routine_request(selection)?;
        Ok(self.submit(message).await?)
    }

    /// Snapshot of the transcript
    pub async fn transcript(&self) -> Transcript {
        self.transcript.lock().await.clone()
    }

    /// Forget the conversation, keeping the system prompt
    pub async fn reset(&self) {
        self.transcript.lock().await.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{EntryState, Role};
    use std::time::Duration;

    #[tokio::test]
    async fn test_submit_to_unreachable_relay_records_network_failure() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = RelayClient::new("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        let session = ChatSession::new(client, None);

        let result = session.submit("hello").await;
        assert!(matches!(result, Err(RelayCallError::Network(_))));

        let transcript = session.transcript().await;
        assert_eq!(transcript.count_role(Role::User), 1);
        assert_eq!(transcript.pending_count(), 0);
        let reply = &transcript.entries()[1];
        assert!(matches!(reply.state, EntryState::Failed { .. }));
        assert_eq!(
            reply.message.content,
            crate::chat::ChatErrorKind::Network.user_facing_message()
        );
    }

    #[tokio::test]
    async fn test_new_session_uses_default_system_prompt() {
        let client = RelayClient::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        let session = ChatSession::new(client, None);
        let messages = session.transcript().await.messages_for_request();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, prompts::SYSTEM_PROMPT);
    }
}
