//! Vocabulary store: categories, words, and per-category quiz progress
//!
//! The store is the single source of truth. Every mutator validates,
//! builds a full new snapshot, persists it entirely, then publishes it —
//! so in-memory state never diverges from durable state after a
//! successful call.

pub mod model;
pub mod store;

pub use model::{Category, Snapshot, Word, WordPatch};
pub use store::VocabStore;
