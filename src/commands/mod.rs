/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `serve`: Run the chat relay
- `products`: Browse the catalog
- `select`: Manage the persisted selection
- `chat`: Interactive routine assistant and one-shot routine generation

Handlers are small and delegate to the library components.
*/

use crate::catalog::FileCatalog;
use crate::chat::session::RequestOptions;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::error::Result;
use crate::relay::RelayClient;
use crate::selection::SledSelectionStore;
use std::time::Duration;

pub mod chat;
pub mod products;
pub mod select;
pub mod special_commands;

// Relay server command handler
pub mod serve {
    //! Relay server command handler.

    use super::*;

    /// Validate configuration and run the relay until Ctrl-C
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `bind` - Optional override for `relay.bind`
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is configured, the configuration
    /// is invalid, or the server fails
    pub async fn run_serve(mut config: Config, bind: Option<String>) -> Result<()> {
        if let Some(bind) = bind {
            tracing::debug!("Using bind override: {}", bind);
            config.relay.bind = bind;
        }

        config.validate_for_serve()?;
        crate::relay::serve(config.relay).await
    }
}

/// Catalog source configured by `catalog.path`
pub fn catalog_source(config: &Config) -> FileCatalog {
    FileCatalog::new(config.catalog.path.clone())
}

/// Open the selection store configured by `storage.path`
///
/// # Errors
///
/// Returns an error if the data directory cannot be resolved or opened
pub fn open_selection_store(config: &Config) -> Result<SledSelectionStore> {
    let path = config.storage.resolve_path()?;
    SledSelectionStore::open(path)
}

/// Relay client configured by the `client` section
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built
pub fn relay_client(config: &Config) -> Result<RelayClient> {
    RelayClient::new(
        config.client.relay_url.clone(),
        Duration::from_secs(config.client.request_timeout_seconds),
    )
}

/// Chat session using the `client` section's relay, prompt, and overrides
///
/// # Errors
///
/// Returns an error if the relay client cannot be built
pub fn chat_session(config: &Config) -> Result<ChatSession> {
    let session = ChatSession::new(relay_client(config)?, config.client.system_prompt.clone())
        .with_options(RequestOptions::from(&config.client));
    Ok(session)
}
