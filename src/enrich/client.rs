//! Cache-first enrichment client with ordered provider fallback
//!
//! Lookup order: durable cache, then each configured provider in
//! priority order, one HTTP call per attempt. Every attempt collapses
//! to a tagged outcome; this loop owns the policy (backoff, skip,
//! advance) while providers stay pure data. All failure paths degrade
//! to the canonical placeholder result — the client never raises.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

use super::reachability::{ConnectivityProbe, HttpProbe};
use super::transport::{ChatTransport, HttpTransport, ProviderSpec, TransportError};
use super::types::{CacheEntry, Enrichment};

/// Storage namespace for enrichment cache entries (one key per
/// normalized word; entries never expire)
pub const CACHE_NAMESPACE: &str = "synant-v2";

/// Fixed sleep after a generic rate limit, before the next provider
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5);

/// Fixed delay between network requests in a batch run
const BATCH_DELAY: Duration = Duration::from_secs(2);

/// Outcome of one provider attempt
enum Attempt {
    Success(Enrichment),
    /// Transient rate limit: sleep, then move to the next provider
    Retryable(Duration),
    /// Provider unusable without an attempt (no credential for it)
    Skip,
    /// Auth/billing, bad request, quota, timeout, transport or parse
    /// failure: move to the next provider immediately
    FatalForProvider,
}

/// Cache-backed synonym/antonym/example lookup
pub struct EnrichmentClient {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn ChatTransport>,
    probe: Arc<dyn ConnectivityProbe>,
    providers: Vec<ProviderSpec>,
    credential: Option<String>,
}

impl EnrichmentClient {
    /// Production client: HTTP transport, reachability probed against
    /// the first provider's API base
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        providers: Vec<ProviderSpec>,
        credential: Option<String>,
    ) -> Self {
        let probe_target = providers
            .first()
            .map(|p| p.base_url.clone())
            .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string());
        Self::with_parts(
            store,
            providers,
            credential,
            Arc::new(HttpTransport::new()),
            Arc::new(HttpProbe::new(probe_target)),
        )
    }

    /// Fully-injected constructor (tests swap the transport and probe)
    pub fn with_parts(
        store: Arc<dyn KeyValueStore>,
        providers: Vec<ProviderSpec>,
        credential: Option<String>,
        transport: Arc<dyn ChatTransport>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            store,
            transport,
            probe,
            providers,
            credential: credential.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Look up enrichment for one word. Never fails; every degraded
    /// path returns the canonical placeholder.
    pub async fn lookup(&self, word: &str) -> Enrichment {
        let key = normalize(word);
        if key.is_empty() {
            return Enrichment::placeholder();
        }

        if let Some(cached) = self.cached(&key).await {
            debug!(word = %key, "enrichment cache hit");
            return cached;
        }

        // Without a credential the placeholder is not cached, so later
        // calls with a credential retry the fetch.
        if self.credential.is_none() {
            debug!(word = %key, "no API credential; returning placeholder");
            return Enrichment::placeholder();
        }

        if !self.probe.is_online().await {
            debug!(word = %key, "offline; skipping remote enrichment");
            return Enrichment::placeholder();
        }

        self.fetch_and_cache(&key).await
    }

    /// Enrich a word list strictly sequentially, with a fixed delay
    /// between network requests to respect remote quotas. Cache hits
    /// skip the delay. Raising `cancel` stops scheduling further words.
    pub async fn lookup_batch(
        &self,
        words: &[String],
        cancel: &AtomicBool,
    ) -> Vec<(String, Enrichment)> {
        let mut results = Vec::with_capacity(words.len());
        let mut fetched_any = false;

        for word in words {
            if cancel.load(Ordering::SeqCst) {
                debug!("enrichment batch cancelled");
                break;
            }

            let key = normalize(word);
            if let Some(cached) = self.cached(&key).await {
                results.push((word.clone(), cached));
                continue;
            }

            if fetched_any {
                tokio::time::sleep(BATCH_DELAY).await;
            }
            fetched_any = true;
            results.push((word.clone(), self.lookup(word).await));
        }

        results
    }

    async fn cached(&self, key: &str) -> Option<Enrichment> {
        match self.store.get(CACHE_NAMESPACE, key).await {
            Ok(Some(json)) => match serde_json::from_str::<CacheEntry>(&json) {
                Ok(entry) => Some(entry.enrichment),
                Err(e) => {
                    warn!(word = %key, error = %e, "discarding unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(word = %key, error = %e, "enrichment cache read failed");
                None
            }
        }
    }

    /// Walk the provider priority list until one attempt succeeds.
    /// Success is cached unconditionally, even when fully placeholder;
    /// exhausting the list returns an uncached placeholder.
    async fn fetch_and_cache(&self, key: &str) -> Enrichment {
        for provider in &self.providers {
            match self.attempt(provider, key).await {
                Attempt::Success(enrichment) => {
                    let entry = CacheEntry::new(enrichment.clone());
                    match serde_json::to_string(&entry) {
                        Ok(json) => {
                            if let Err(e) = self.store.set(CACHE_NAMESPACE, key, &json).await {
                                warn!(word = %key, error = %e, "enrichment cache write failed");
                            }
                        }
                        Err(e) => warn!(word = %key, error = %e, "cache entry serialization failed"),
                    }
                    return enrichment;
                }
                Attempt::Retryable(delay) => {
                    warn!(provider = %provider.name, "rate limited; backing off");
                    tokio::time::sleep(delay).await;
                }
                Attempt::Skip => {
                    debug!(provider = %provider.name, "no credential; skipping provider");
                }
                Attempt::FatalForProvider => {
                    warn!(provider = %provider.name, "provider attempt failed; trying next");
                }
            }
        }

        Enrichment::placeholder()
    }

    /// One HTTP call against one provider. No same-provider retry.
    async fn attempt(&self, provider: &ProviderSpec, word: &str) -> Attempt {
        let Some(credential) = &self.credential else {
            return Attempt::Skip;
        };

        let prompt = build_prompt(word);
        match self.transport.complete(provider, credential, &prompt).await {
            Ok(content) => match extract_json_object(&content) {
                Some(value) => Attempt::Success(Enrichment::from_model_value(&value)),
                None => {
                    warn!(provider = %provider.name, "no JSON object in completion");
                    Attempt::FatalForProvider
                }
            },
            Err(TransportError::RateLimited(_)) => Attempt::Retryable(RATE_LIMIT_BACKOFF),
            Err(e) => {
                warn!(provider = %provider.name, error = %e, "enrichment request failed");
                Attempt::FatalForProvider
            }
        }
    }
}

/// Cache keys are trimmed, lowercased word text
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

fn build_prompt(word: &str) -> String {
    format!(
        "Respond ONLY with strict JSON: \
         {{\"example\": \"...\", \"synonyms\": [{{\"en\": \"...\", \"de\": \"...\", \"bn\": \"...\"}}], \"antonyms\": [...]}}.\n\
         Give up to 5 English synonyms and up to 5 antonyms for \"{word}\".\n\
         For every synonym and antonym provide:\n\
         - \"de\": single-word German translation\n\
         - \"bn\": single-word Bengali translation (Bangla script)\n\
         As \"example\" give one short German example sentence using the German translation of \"{word}\"."
    )
}

/// Find the first well-formed JSON object embedded in `text`, tolerating
/// surrounding prose and code fences.
pub fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let bytes = text.as_bytes();
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                if let Some(opened) = start {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[opened..=i];
                        if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
                            if value.is_object() {
                                return Some(value);
                            }
                        }
                        // Malformed candidate; keep scanning after it
                        start = None;
                    }
                }
            }
            _ => {}
        }
    }

    None
}
