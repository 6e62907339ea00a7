//! A small HTTP file manager in the spirit of embedded web servers.
//!
//! One blocking listener serves one connection at a time. Every page is
//! plain HTML generated on the fly; files are streamed in fixed-size
//! chunks so memory stays bounded no matter how large the file.
//!
//! # Features
//!
//! - Browse, delete, rename, move, and upload files under one root
//! - Directory creation and recursive destination listing for moves
//! - Static file serving with extension-based content types
//! - JSON configuration bootstrapped with defaults on first start
//!
//! # Example
//!
//! ```ignore
//! use shelf::{Config, Server, ServerContext};
//! use shelf_store::LocalStore;
//!
//! let config = Config::default();
//! let store = LocalStore::open(&config.root_dir)?;
//! let ctx = ServerContext::new(store).with_read_timeout(config.read_timeout());
//! let mut server = Server::bind(config.bind_addr.as_str(), ctx)?;
//! server.run();
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod templates;

pub use config::{Config, ConfigError};
pub use context::{DEFAULT_READ_TIMEOUT, ServerContext};
pub use handlers::handle_request;
pub use routes::{Action, route};
pub use server::Server;
