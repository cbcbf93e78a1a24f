//! Entity store boundary.
//!
//! The undo/redo engine never holds slide state itself: every command reads
//! and mutates slides through an [`EntityStore`]. This module defines that
//! asynchronous boundary without making any storage assumptions, plus an
//! in-memory implementation for tests and local development.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEntityStore;
pub use r#trait::{EntityStore, EntityStoreError, SharedStore};
