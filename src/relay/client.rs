//! HTTP client for the relay endpoint

use super::envelope::{ChatCompletion, ChatRequest, ErrorCode, ErrorEnvelope};
use crate::chat::ChatErrorKind;
use crate::error::Result;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Failure calling the relay
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayCallError {
    /// The relay could not be reached or the connection failed
    #[error("Relay request failed: {0}")]
    Network(String),

    /// The relay answered with a non-success status
    #[error("Relay returned {status}: {error}")]
    Status {
        /// HTTP status from the relay
        status: u16,
        /// Structured code, when the relay supplied one
        code: Option<ErrorCode>,
        /// Summary from the error body
        error: String,
        /// Upstream detail text, if forwarded
        details: Option<String>,
    },

    /// The relay answered 2xx but the body had no usable completion
    #[error("Invalid relay response: {0}")]
    InvalidResponse(String),
}

impl RelayCallError {
    /// Category used to choose the user-facing message
    ///
    /// The structured code wins; the HTTP status is the fallback for
    /// relays that do not send one.
    pub fn kind(&self) -> ChatErrorKind {
        match self {
            Self::Network(_) => ChatErrorKind::Network,
            Self::InvalidResponse(_) => ChatErrorKind::Other,
            Self::Status { status, code, .. } => match code {
                Some(ErrorCode::Unauthorized) => ChatErrorKind::Unauthorized,
                Some(ErrorCode::RateLimited) => ChatErrorKind::RateLimited,
                Some(ErrorCode::Internal) => ChatErrorKind::Server,
                _ => match status {
                    401 => ChatErrorKind::Unauthorized,
                    429 => ChatErrorKind::RateLimited,
                    500..=599 => ChatErrorKind::Server,
                    _ => ChatErrorKind::Other,
                },
            },
        }
    }
}

/// Client posting chat requests to the relay
///
/// # Examples
///
/// ```no_run
/// use routine_builder::chat::ChatMessage;
/// use routine_builder::relay::{ChatRequest, RelayClient};
/// use std::time::Duration;
///
/// # async fn example() -> routine_builder::error::Result<()> {
/// let client = RelayClient::new("http://127.0.0.1:8787/", Duration::from_secs(30))?;
/// let reply = client
///     .send(&ChatRequest::new(vec![ChatMessage::user("Hello")]))
///     .await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    url: String,
}

impl RelayClient {
    /// Create a client for the relay at `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Send `request` and return the assistant text
    ///
    /// # Errors
    ///
    /// Returns a [`RelayCallError`] describing how the call failed
    pub async fn send(&self, request: &ChatRequest) -> std::result::Result<String, RelayCallError> {
        tracing::debug!(
            "Posting {} messages to relay {}",
            request.messages.len(),
            self.url
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Relay request failed: {}", e);
                RelayCallError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Relay returned error {}: {}", status, text);

            let error = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => RelayCallError::Status {
                    status: status.as_u16(),
                    code: envelope.code,
                    error: envelope.error,
                    details: envelope.details.or(envelope.message),
                },
                Err(_) => RelayCallError::Status {
                    status: status.as_u16(),
                    code: None,
                    error: if text.is_empty() {
                        status.to_string()
                    } else {
                        text
                    },
                    details: None,
                },
            };
            return Err(error);
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse relay response: {}", e);
            RelayCallError::InvalidResponse(e.to_string())
        })?;

        completion.first_content().ok_or_else(|| {
            RelayCallError::InvalidResponse("response contained no message content".to_string())
        })
    }
}
