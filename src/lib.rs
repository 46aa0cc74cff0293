//! Vocab Trainer - personal vocabulary trainer library
//!
//! A local repository of categorized English/German/Bengali word pairs
//! driving a multiple-choice quiz, with:
//! - durable SQLite-backed storage, full-snapshot writes per mutation
//! - a draw-without-replacement quiz session engine with progress tracking
//! - cached lexical enrichment (synonyms/antonyms/example) with ordered
//!   provider fallback via OpenRouter
//! - best-effort machine translation through LibreTranslate
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vocab_trainer::storage::SqliteStore;
//! use vocab_trainer::vocab::VocabStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteStore::open("vocab.db").await?);
//!     let mut vocab = VocabStore::open(store).await?;
//!     vocab.add_word(None, "house", "Haus").await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod credentials;
pub mod enrich;
pub mod error;
pub mod quiz;
pub mod storage;
pub mod translate;
pub mod vocab;

// Re-export commonly used types for convenience
pub use config::Config;
pub use enrich::{Enrichment, EnrichmentClient};
pub use error::{Error, Result};
pub use quiz::{QuizEngine, SessionState};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use vocab::{Category, VocabStore, Word, WordPatch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
