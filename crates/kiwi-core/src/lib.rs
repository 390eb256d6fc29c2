//! Core types for the kiwi database rebuild.
//!
//! This crate knows nothing about CSV or SQLite. It defines the entities and
//! natural keys, the [`Catalog`](catalog::Catalog) write abstraction that
//! storage backends implement, and the [`Loader`](load::Loader) that resolves
//! natural keys into surrogate ids across the three load passes.

pub mod catalog;
pub mod load;
pub mod model;
pub mod record;

pub use catalog::Catalog;
pub use load::{LoadReport, LoadWarning, Loader};
