//! SQLite-backed durable key/value store

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::KeyValueStore;

/// SQLite-backed store; one row per (namespace, key) pair
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = Connection::open(&path)?;

        // WAL mode for better write behavior
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            );

            CREATE INDEX IF NOT EXISTS idx_kv_namespace ON kv(namespace);
        "#,
        )?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;

        let mut stmt =
            conn.prepare_cached("SELECT value FROM kv WHERE namespace = ?1 AND key = ?2")?;

        let value = stmt
            .query_row(params![namespace, key], |row| row.get::<_, String>(0))
            .optional()?;

        Ok(value)
    }

    async fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            r#"INSERT OR REPLACE INTO kv (namespace, key, value, updated_at)
               VALUES (?1, ?2, ?3, ?4)"#,
            params![namespace, key, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
            params![namespace, key],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.db")).await.unwrap();

        store.set("vocab", "categories", "[]").await.unwrap();
        let value = store.get("vocab", "categories").await.unwrap();
        assert_eq!(value.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.db")).await.unwrap();

        assert!(store.get("vocab", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.db")).await.unwrap();

        store.set("a", "key", "one").await.unwrap();
        store.set("b", "key", "two").await.unwrap();

        assert_eq!(store.get("a", "key").await.unwrap().as_deref(), Some("one"));
        assert_eq!(store.get("b", "key").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_set_replaces_and_delete_removes() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.db")).await.unwrap();

        store.set("vocab", "categories", "old").await.unwrap();
        store.set("vocab", "categories", "new").await.unwrap();
        assert_eq!(
            store.get("vocab", "categories").await.unwrap().as_deref(),
            Some("new")
        );

        store.delete("vocab", "categories").await.unwrap();
        assert!(store.get("vocab", "categories").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.set("vocab", "categories", "persisted").await.unwrap();
        }

        let store = SqliteStore::open(&path).await.unwrap();
        assert_eq!(
            store.get("vocab", "categories").await.unwrap().as_deref(),
            Some("persisted")
        );
    }
}
