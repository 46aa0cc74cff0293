//! Lexical enrichment: synonyms, antonyms and an example sentence
//!
//! Cache-first lookup backed by the durable store, with ordered fallback
//! across remote providers. Enrichment is best-effort decoration — every
//! failure path degrades to the canonical placeholder result, nothing in
//! this module raises.

pub mod client;
pub mod reachability;
pub mod transport;
pub mod types;

pub use client::EnrichmentClient;
pub use transport::ProviderSpec;
pub use types::{Enrichment, LexEntry};
