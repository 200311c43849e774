//! Relay wire types
//!
//! The relay accepts `{model?, messages, max_tokens?, temperature?}` and
//! answers with either the upstream JSON verbatim or an [`ErrorEnvelope`].

use crate::chat::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Machine-readable failure code carried in every relay error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request body failed validation
    BadRequest,
    /// The HTTP method is not POST or OPTIONS
    MethodNotAllowed,
    /// The upstream rejected the credential
    Unauthorized,
    /// The upstream is throttling
    RateLimited,
    /// The upstream failed with some other status
    UpstreamError,
    /// The relay itself failed
    Internal,
}

impl ErrorCode {
    /// Code for a non-success upstream status
    pub fn from_upstream_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            429 => Self::RateLimited,
            _ => Self::UpstreamError,
        }
    }
}

/// Error body returned by the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short human-readable summary
    pub error: String,
    /// Upstream response text, for forwarded upstream failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Exception text, for internal failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured failure code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// Body the relay sends upstream
///
/// Fields stay as raw JSON so caller-supplied values pass through untouched.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamRequest {
    pub model: Value,
    pub messages: Value,
    pub max_tokens: Value,
    pub temperature: Value,
}

/// Request built by the chat client
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatRequest {
    /// Model override; the relay default applies when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
    /// Token limit override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ChatRequest {
    /// Request carrying `messages` with relay defaults for everything else
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }
}

/// Successful chat-completion response, reduced to what the client reads
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

/// Message inside a completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice, if present and non-empty
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
    }
}

/// JavaScript-style truthiness of a JSON value
///
/// `null`, `false`, `0`, and `""` are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_code_from_status() {
        assert_eq!(ErrorCode::from_upstream_status(401), ErrorCode::Unauthorized);
        assert_eq!(ErrorCode::from_upstream_status(429), ErrorCode::RateLimited);
        assert_eq!(ErrorCode::from_upstream_status(503), ErrorCode::UpstreamError);
    }

    #[test]
    fn test_error_envelope_omits_empty_fields() {
        let envelope = ErrorEnvelope {
            error: "Invalid request".to_string(),
            details: None,
            message: None,
            code: Some(ErrorCode::BadRequest),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"error": "Invalid request", "code": "bad_request"}));
    }

    #[test]
    fn test_error_envelope_accepts_missing_code() {
        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"error":"boom","details":"upstream text"}"#).unwrap();
        assert!(envelope.code.is_none());
        assert_eq!(envelope.details.as_deref(), Some("upstream text"));
    }

    #[test]
    fn test_chat_request_skips_unset_overrides() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"messages": [{"role": "user", "content": "hi"}]})
        );
    }

    #[test]
    fn test_first_content() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Use cleanser first."}}]
        }))
        .unwrap();
        assert_eq!(
            completion.first_content().as_deref(),
            Some("Use cleanser first.")
        );

        let empty: ChatCompletion = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.first_content().is_none());
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("gpt-4o-mini")));
        assert!(is_truthy(&json!(0.2)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
