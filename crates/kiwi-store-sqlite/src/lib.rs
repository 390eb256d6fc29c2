//! SQLite backend for the kiwi database.
//!
//! [`SqliteStore`] owns the connection. Schema reset runs in its own
//! transaction; the three load passes write through a [`LoadTransaction`],
//! which implements [`kiwi_core::Catalog`] and is committed once at the end.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::TABLES;
pub use store::{LoadTransaction, SqliteStore};
