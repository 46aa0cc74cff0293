//! Durable key/value storage
//!
//! One namespaced string-keyed get/set surface, durable across restarts,
//! no transactions. The vocabulary snapshot lives under one key; the
//! enrichment cache uses one key per normalized word.

use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Namespaced string-keyed durable storage.
///
/// Production uses [`SqliteStore`]; tests use [`MemoryStore`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `namespace`/`key`, if any.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    /// Store `value` under `namespace`/`key`, replacing any previous value.
    async fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `namespace`/`key`, if any.
    async fn delete(&self, namespace: &str, key: &str) -> Result<()>;
}
