//! Cross-component test: enrichment client against a SQLite-backed cache
//!
//! Uses a scripted transport/probe instead of mocks so the whole path —
//! provider fallback, cache writes, durable reload — runs end to end.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

use vocab_trainer::enrich::client::CACHE_NAMESPACE;
use vocab_trainer::enrich::reachability::ConnectivityProbe;
use vocab_trainer::enrich::transport::{ChatTransport, ProviderSpec, TransportError};
use vocab_trainer::enrich::{Enrichment, EnrichmentClient};
use vocab_trainer::storage::{KeyValueStore, SqliteStore};

struct AlwaysOnline;

#[async_trait]
impl ConnectivityProbe for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Fails on the first provider, answers on the second, counts calls
struct FlakyTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatTransport for FlakyTransport {
    async fn complete(
        &self,
        provider: &ProviderSpec,
        _api_key: &str,
        _prompt: &str,
    ) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if provider.name == "primary" {
            return Err(TransportError::Auth("401 unauthorized".to_string()));
        }
        Ok(concat!(
            "Here is the data:\n",
            r#"{"example": "Das Haus ist blau.", "synonyms": [{"en": "home", "de": "Heim", "bn": "গৃহ"}], "antonyms": []}"#
        )
        .to_string())
    }
}

fn providers() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec {
            name: "primary".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
        },
        ProviderSpec {
            name: "secondary".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-oss-120b:free".to_string(),
        },
    ]
}

#[tokio::test]
async fn fallback_result_is_cached_durably_and_reused_after_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("vocab.db");

    let transport = Arc::new(FlakyTransport {
        calls: AtomicUsize::new(0),
    });

    let first = {
        let store = Arc::new(SqliteStore::open(&db).await.unwrap());
        let client = EnrichmentClient::with_parts(
            store.clone(),
            providers(),
            Some("sk-test".to_string()),
            transport.clone(),
            Arc::new(AlwaysOnline),
        );

        let result = client.lookup("House").await;
        assert_eq!(result.example, "Das Haus ist blau.");
        assert_eq!(result.synonyms[0].de, "Heim");
        // Primary failed, secondary answered
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert!(store
            .get(CACHE_NAMESPACE, "house")
            .await
            .unwrap()
            .is_some());
        result
    };

    // A fresh process sees the cached entry; the network stays idle
    let store = Arc::new(SqliteStore::open(&db).await.unwrap());
    let client = EnrichmentClient::with_parts(
        store,
        providers(),
        Some("sk-test".to_string()),
        transport.clone(),
        Arc::new(AlwaysOnline),
    );
    assert_eq!(client.lookup(" house ").await, first);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_credential_never_caches_so_later_runs_retry() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("vocab.db");

    let transport = Arc::new(FlakyTransport {
        calls: AtomicUsize::new(0),
    });

    {
        let store = Arc::new(SqliteStore::open(&db).await.unwrap());
        let client = EnrichmentClient::with_parts(
            store.clone(),
            providers(),
            None,
            transport.clone(),
            Arc::new(AlwaysOnline),
        );
        assert_eq!(client.lookup("house").await, Enrichment::placeholder());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert!(store.get(CACHE_NAMESPACE, "house").await.unwrap().is_none());
    }

    // Same word, now with a credential: the fetch happens
    let store = Arc::new(SqliteStore::open(&db).await.unwrap());
    let client = EnrichmentClient::with_parts(
        store,
        providers(),
        Some("sk-test".to_string()),
        transport.clone(),
        Arc::new(AlwaysOnline),
    );
    let result = client.lookup("house").await;
    assert_eq!(result.example, "Das Haus ist blau.");
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}
