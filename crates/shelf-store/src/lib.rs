//! Filesystem storage for the shelf file manager.
//!
//! All access goes through the [`FileStore`] trait so the HTTP layer
//! never touches `std::fs` directly. Paths are virtual, rooted at the
//! store root, and sanitized against traversal on every operation.
//!
//! # Example
//!
//! ```ignore
//! use shelf_store::{FileStore, LocalStore};
//!
//! let store = LocalStore::open("./files")?;
//! for entry in store.list("/") {
//!     println!("{} dir={}", entry.name, entry.is_dir);
//! }
//! ```

#![deny(unsafe_code)]

pub mod path;
mod store;
mod walk;

pub use store::{Entry, FileStore, LocalStore};
pub use walk::all_directories;
