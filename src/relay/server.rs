//! Credential-injecting chat relay
//!
//! A single stateless handler mounted on every path. It validates the chat
//! payload, fills in defaults, forwards it upstream with the server-held
//! bearer credential, and returns the upstream answer. Every response,
//! including failures, carries the same CORS header set.

use super::envelope::{is_truthy, ErrorCode, ErrorEnvelope, UpstreamRequest};
use crate::config::RelayConfig;
use crate::error::{Result, RoutineError};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::middleware;
use axum::routing::any;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Methods advertised in `Access-Control-Allow-Methods`
pub const ALLOW_METHODS: &str = "POST, OPTIONS";
/// Headers advertised in `Access-Control-Allow-Headers`
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
/// Preflight cache lifetime, 24 hours
pub const MAX_AGE_SECONDS: &str = "86400";

/// Shared, immutable relay state
pub struct RelayState {
    config: RelayConfig,
    api_key: String,
    client: reqwest::Client,
    cors: Vec<(HeaderName, HeaderValue)>,
}

impl RelayState {
    /// Build relay state from configuration
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::MissingCredentials` if no credential is
    /// configured, or `RoutineError::Config` if the allowed origin is not a
    /// valid header value
    pub fn new(config: RelayConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                RoutineError::MissingCredentials("relay has no upstream API key".to_string())
            })?;

        let origin = HeaderValue::from_str(&config.allow_origin).map_err(|e| {
            RoutineError::Config(format!(
                "Invalid relay.allow_origin '{}': {}",
                config.allow_origin, e
            ))
        })?;

        let cors = vec![
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, origin),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOW_METHODS),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOW_HEADERS),
            ),
            (
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from_static(MAX_AGE_SECONDS),
            ),
        ];

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.upstream_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            config,
            api_key,
            client,
            cors,
        })
    }

    fn apply_cors(&self, response: &mut Response) {
        let headers = response.headers_mut();
        for (name, value) in &self.cors {
            headers.insert(name.clone(), value.clone());
        }
    }

    fn build_upstream_request(&self, payload: &mut Value, messages: Value) -> UpstreamRequest {
        let mut take_or = |field: &str, default: Value| -> Value {
            match payload.get_mut(field).map(Value::take) {
                Some(v) if is_truthy(&v) => v,
                _ => default,
            }
        };

        UpstreamRequest {
            model: take_or("model", Value::from(self.config.default_model.clone())),
            messages,
            max_tokens: take_or("max_tokens", Value::from(self.config.default_max_tokens)),
            temperature: take_or("temperature", Value::from(self.config.default_temperature)),
        }
    }
}

/// Failure while relaying a chat request
#[derive(Error, Debug)]
pub enum RelayFailure {
    /// Payload failed validation
    #[error("{0}")]
    BadRequest(String),

    /// Method other than POST or OPTIONS
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Upstream answered with a non-success status
    #[error("Upstream API error: {status}")]
    Upstream {
        /// Upstream HTTP status
        status: u16,
        /// Upstream response text
        body: String,
    },

    /// Anything else: unreadable payload, transport failure, bad upstream JSON
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for RelayFailure {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            Self::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                ErrorEnvelope {
                    error,
                    details: None,
                    message: None,
                    code: Some(ErrorCode::BadRequest),
                },
            ),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorEnvelope {
                    error: "Method not allowed".to_string(),
                    details: None,
                    message: None,
                    code: Some(ErrorCode::MethodNotAllowed),
                },
            ),
            Self::Upstream { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorEnvelope {
                    error: format!("Upstream API error: {}", status),
                    details: Some(body),
                    message: None,
                    code: Some(ErrorCode::from_upstream_status(status)),
                },
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope {
                    error: "Internal server error".to_string(),
                    details: None,
                    message: Some(message),
                    code: Some(ErrorCode::Internal),
                },
            ),
        };

        (status, Json(envelope)).into_response()
    }
}

/// Build the relay router
///
/// Every path is routed to the same handler. CORS headers are added as a
/// router layer so extractor rejections carry them too. Request bodies are
/// not size-limited.
pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", any(handle))
        .route("/*path", any(handle))
        .layer(middleware::map_response_with_state(state.clone(), cors_headers))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn cors_headers(State(state): State<Arc<RelayState>>, mut response: Response) -> Response {
    state.apply_cors(&mut response);
    response
}

async fn handle(State(state): State<Arc<RelayState>>, method: Method, body: Bytes) -> Response {
    let response = if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else if method == Method::POST {
        match relay_chat(&state, &body).await {
            Ok(response) => response,
            Err(failure) => failure.into_response(),
        }
    } else {
        RelayFailure::MethodNotAllowed.into_response()
    };

    tracing::info!("{} -> {}", method, response.status().as_u16());
    response
}

async fn relay_chat(
    state: &RelayState,
    body: &[u8],
) -> std::result::Result<Response, RelayFailure> {
    let mut payload: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Rejecting unreadable request body: {}", e);
        RelayFailure::Internal(e.to_string())
    })?;

    let messages = match payload.get_mut("messages").map(Value::take) {
        Some(messages @ Value::Array(_)) => messages,
        _ => {
            return Err(RelayFailure::BadRequest(
                "Invalid request: messages array is required".to_string(),
            ))
        }
    };

    let upstream_request = state.build_upstream_request(&mut payload, messages);
    tracing::debug!(
        "Forwarding {} messages upstream (model={})",
        upstream_request.messages.as_array().map_or(0, Vec::len),
        upstream_request.model
    );

    let response = state
        .client
        .post(&state.config.upstream_url)
        .bearer_auth(&state.api_key)
        .json(&upstream_request)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Upstream request failed: {}", e);
            RelayFailure::Internal(e.to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read upstream error body: {}", e);
                String::new()
            }
        };
        tracing::error!("Upstream API error {}: {}", status, body);
        return Err(RelayFailure::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        tracing::error!("Failed to read upstream response: {}", e);
        RelayFailure::Internal(e.to_string())
    })?;

    serde_json::from_slice::<Value>(&bytes).map_err(|e| {
        tracing::error!("Upstream returned invalid JSON: {}", e);
        RelayFailure::Internal(format!("Upstream returned invalid JSON: {}", e))
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        bytes,
    )
        .into_response())
}

/// Bind `config.bind` and serve the relay until Ctrl-C
///
/// # Errors
///
/// Returns an error if the state cannot be built, the address cannot be
/// bound, or the server fails
pub async fn serve(config: RelayConfig) -> Result<()> {
    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|e| RoutineError::Config(format!("Invalid relay.bind '{}': {}", config.bind, e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RoutineError::Relay(format!("Failed to bind {}: {}", addr, e)))?;

    serve_with_listener(listener, config, shutdown_signal()).await
}

/// Serve the relay on an already bound listener until `shutdown` resolves
///
/// # Errors
///
/// Returns an error if the state cannot be built or the server fails
pub async fn serve_with_listener<F>(
    listener: tokio::net::TcpListener,
    config: RelayConfig,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tracing::info!(
        "Relay forwarding to {} with default model {}",
        config.upstream_url,
        config.default_model
    );
    let state = Arc::new(RelayState::new(config)?);
    let app = router(state);

    tracing::info!("Relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RoutineError::Relay(format!("Server error: {}", e)))?;

    tracing::info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> RelayState {
        RelayState::new(RelayConfig {
            api_key: Some("sk-test".to_string()),
            ..RelayConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_state_requires_credential() {
        assert!(RelayState::new(RelayConfig::default()).is_err());
        assert!(RelayState::new(RelayConfig {
            api_key: Some(String::new()),
            ..RelayConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_state_rejects_invalid_origin() {
        let result = RelayState::new(RelayConfig {
            api_key: Some("sk-test".to_string()),
            allow_origin: "bad\norigin".to_string(),
            ..RelayConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_fill_missing_and_falsy_fields() {
        let state = state();
        let mut payload = json!({"model": "", "max_tokens": 0});
        let request = state.build_upstream_request(&mut payload, json!([]));
        assert_eq!(request.model, json!("gpt-4o"));
        assert_eq!(request.max_tokens, json!(500));
        assert_eq!(request.temperature, json!(0.7));
    }

    #[test]
    fn test_caller_values_pass_through() {
        let state = state();
        let mut payload = json!({"model": "gpt-4o-mini", "max_tokens": 64, "temperature": 0.2});
        let request = state.build_upstream_request(&mut payload, json!([{"role": "user"}]));
        assert_eq!(request.model, json!("gpt-4o-mini"));
        assert_eq!(request.max_tokens, json!(64));
        assert_eq!(request.temperature, json!(0.2));
        assert_eq!(request.messages, json!([{"role": "user"}]));
    }

    #[test]
    fn test_upstream_failure_response_shape() {
        let response = RelayFailure::Upstream {
            status: 429,
            body: "slow down".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_failure_display() {
        let failure = RelayFailure::Upstream {
            status: 401,
            body: String::new(),
        };
        assert_eq!(failure.to_string(), "Upstream API error: 401");
    }
}
