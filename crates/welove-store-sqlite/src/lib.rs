//! SQLite backend for the welove quote store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The single-selection flags are backed
//! by partial unique indexes, so a second active quote is rejected by the
//! database even if a caller bypasses the core selection helpers.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
