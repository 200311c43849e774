//! Routine Builder - product picker and routine chat assistant library
//!
//! This library provides the catalog, selection, chat, and relay components
//! behind the `routine-builder` CLI.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `catalog`: Product catalog loading, filtering, and rendering
//! - `selection`: Selection set and its persisted slot
//! - `chat`: Messages, id-tagged transcript, and the assistant session
//! - `relay`: Credential-injecting relay server, its client, and wire types
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use routine_builder::catalog::{CatalogSource, FileCatalog};
//! use routine_builder::selection::{load_selected_products, MemorySelectionStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = FileCatalog::new("data/products.json");
//!     let products = catalog.load_products().await?;
//!     let selection = load_selected_products(&MemorySelectionStore::new());
//!     println!("{} products, {} selected", products.len(), selection.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod relay;
pub mod selection;

// Re-export commonly used types
pub use catalog::{CatalogSource, FileCatalog, Product};
pub use chat::{ChatMessage, ChatSession, Role, Transcript};
pub use config::Config;
pub use error::{Result, RoutineError};
pub use relay::{RelayClient, RelayState};
pub use selection::{SelectionSet, SelectionStore};
