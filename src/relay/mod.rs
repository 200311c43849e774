//! Chat relay: server, client, and the wire envelope they share
//!
//! The relay keeps the upstream credential on the server side. Clients post
//! a chat payload, the relay adds the bearer token and forwards it to the
//! upstream chat-completion API, then returns the upstream answer.

pub mod client;
pub mod envelope;
pub mod server;

pub use client::{RelayCallError, RelayClient};
pub use envelope::{ChatRequest, ErrorCode, ErrorEnvelope};
pub use server::{router, serve, serve_with_listener, RelayFailure, RelayState};
