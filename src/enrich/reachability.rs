//! Network reachability gate
//!
//! Remote enrichment attempts are skipped while offline; cache lookups
//! still proceed. The verdict is memoized briefly so a batch run does
//! not re-probe per word.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Probe timeout; a probe that cannot complete in this window counts as offline
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a probe verdict stays valid
const VERDICT_TTL: Duration = Duration::from_secs(30);

/// Connectivity signal consumed by the enrichment client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// HTTP HEAD probe against the first provider's API base
pub struct HttpProbe {
    client: reqwest::Client,
    target: String,
    verdict: Mutex<Option<(Instant, bool)>>,
}

impl HttpProbe {
    pub fn new(target: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            target: target.into(),
            verdict: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn is_online(&self) -> bool {
        let mut verdict = self.verdict.lock().await;
        if let Some((when, online)) = *verdict {
            if when.elapsed() < VERDICT_TTL {
                return online;
            }
        }

        // Any HTTP response at all proves the network path works
        let online = self.client.head(&self.target).send().await.is_ok();
        debug!(target = %self.target, online, "reachability probe");
        *verdict = Some((Instant::now(), online));
        online
    }
}
