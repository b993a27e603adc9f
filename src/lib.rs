//! # Promptdesk
//!
//! A REST backend for prompt templates and the departments, colors,
//! completion types and categories attached to them. Usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! promptdesk = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use promptdesk::config::ServerConfig;
//! use promptdesk::server::{AppState, create_router};
//! use promptdesk::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/promptdesk.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), ServerConfig::default()));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Associations
//!
//! Links between entities are plain nullable foreign keys. Setting or
//! clearing one goes through [`reconcile`], which validates both ends
//! before writing.
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod server;
pub mod store;
pub mod types;
