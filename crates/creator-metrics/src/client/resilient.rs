//! The request executor behind every adapter.
//!
//! Flow for one fetch: cache check, mode decision, transport with retry and
//! backoff, transform, and synthetic fallback on any unrecoverable path. The
//! fallible core ([`ResilientClient::try_fetch`]) is kept separate from the
//! total public surface so the state machine can be inspected on its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::cache::{CacheStats, MetricCache};
use super::retry::RetryConfig;
use super::transport::{
    HttpRequest, HttpTransport, ReqwestTransport, TransportMode, build_client, prepare_request,
};
use crate::adapters::MetricsAdapter;
use crate::config::MetricsConfig;
use crate::credentials::CredentialRegistry;
use crate::error::{FetchFault, MetricsError, TransformError};
use crate::record::{MetricRecord, Provenance};

/// Why a record was synthesized instead of fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
    #[error("no real credential configured")]
    NoCredential,

    #[error("no transport URL resolvable")]
    NoRoute,

    #[error("request rejected after {attempts} attempt(s): {fault}")]
    Rejected { attempts: u32, fault: String },

    #[error("retries exhausted after {attempts} attempt(s): {last_fault}")]
    Exhausted { attempts: u32, last_fault: String },
}

impl FallbackReason {
    /// Network attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::NoCredential | Self::NoRoute => 0,
            Self::Rejected { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Where a returned record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FetchSource {
    Cache,
    Network,
    Synthetic(FallbackReason),
}

/// A successful network fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub record: MetricRecord,
    pub attempts: u32,
}

/// Full account of one `fetch` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub record: MetricRecord,
    pub source: FetchSource,
    pub attempts: u32,
    /// Backoff delays slept, in order.
    pub delays: Vec<Duration>,
}

#[derive(Debug, Default)]
struct ClientCounters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    network_attempts: AtomicU64,
    retries: AtomicU64,
    fallbacks: AtomicU64,
}

/// Point-in-time copy of the client's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub network_attempts: u64,
    pub retries: u64,
    pub fallbacks: u64,
}

/// Cache, retry and fallback around an [`HttpTransport`].
pub struct ResilientClient {
    registry: Arc<CredentialRegistry>,
    transport: Arc<dyn HttpTransport>,
    cache: MetricCache,
    retry: RetryConfig,
    mode: TransportMode,
    counters: ClientCounters,
}

impl ResilientClient {
    pub fn new(
        registry: Arc<CredentialRegistry>,
        transport: Arc<dyn HttpTransport>,
        config: &MetricsConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            cache: MetricCache::with_ttl(config.cache_ttl()),
            retry: config.retry.clone(),
            mode: config.transport.clone(),
            counters: ClientCounters::default(),
        }
    }

    /// Build a client backed by a real `reqwest` transport.
    pub fn from_config(
        registry: Arc<CredentialRegistry>,
        config: &MetricsConfig,
    ) -> Result<Self, MetricsError> {
        let client = build_client(config.request_timeout(), &config.user_agent)?;
        let transport = Arc::new(ReqwestTransport::new(client));
        Ok(Self::new(registry, transport, config))
    }

    pub fn registry(&self) -> &CredentialRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &MetricCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn mode(&self) -> &TransportMode {
        &self.mode
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
            network_attempts: self.counters.network_attempts.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
        }
    }

    /// Fetch a record with the configured retry budget. Never fails.
    pub async fn fetch(&self, adapter: &dyn MetricsAdapter, identity: &str) -> MetricRecord {
        self.fetch_report(adapter, identity, self.retry.max_retries)
            .await
            .record
    }

    /// Fetch a record with an explicit retry budget. Never fails.
    pub async fn fetch_with_retries(
        &self,
        adapter: &dyn MetricsAdapter,
        identity: &str,
        max_retries: u32,
    ) -> MetricRecord {
        self.fetch_report(adapter, identity, max_retries)
            .await
            .record
    }

    /// Fetch a record and describe how it was obtained.
    pub async fn fetch_report(
        &self,
        adapter: &dyn MetricsAdapter,
        identity: &str,
        max_retries: u32,
    ) -> FetchReport {
        let platform = adapter.platform();
        let key = adapter.cache_key(identity);

        if let Some(record) = self.cache.get(&key) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(platform = %platform, key = %key, "Cache hit");
            return FetchReport {
                record,
                source: FetchSource::Cache,
                attempts: 0,
                delays: Vec::new(),
            };
        }
        self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);

        let mut delays = Vec::new();
        let report = match self
            .try_fetch(adapter, identity, max_retries, &mut delays)
            .await
        {
            Ok(fetched) => FetchReport {
                record: fetched.record,
                source: FetchSource::Network,
                attempts: fetched.attempts,
                delays,
            },
            Err(reason) => {
                self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
                match &reason {
                    FallbackReason::NoCredential | FallbackReason::NoRoute => {
                        debug!(platform = %platform, identity, %reason, "Serving synthetic record");
                    }
                    FallbackReason::Rejected { .. } | FallbackReason::Exhausted { .. } => {
                        warn!(platform = %platform, identity, %reason, "Falling back to synthetic record");
                    }
                }
                FetchReport {
                    record: adapter.synthesize(identity),
                    attempts: reason.attempts(),
                    source: FetchSource::Synthetic(reason),
                    delays,
                }
            }
        };

        self.cache.insert(key, report.record.clone());
        report
    }

    /// The fallible core: mode decision, then attempts with backoff.
    ///
    /// Every slept delay is appended to `delays`.
    pub async fn try_fetch(
        &self,
        adapter: &dyn MetricsAdapter,
        identity: &str,
        max_retries: u32,
        delays: &mut Vec<Duration>,
    ) -> Result<Fetched, FallbackReason> {
        let platform = adapter.platform();
        let credential = self.registry.resolve(platform);
        let Some(secret) = credential.real_secret() else {
            return Err(FallbackReason::NoCredential);
        };
        let Some(outbound) = adapter.build_request(identity) else {
            return Err(FallbackReason::NoRoute);
        };
        let request = match prepare_request(&self.mode, platform, identity, &outbound, secret) {
            Ok(Some(request)) => request,
            Ok(None) => return Err(FallbackReason::NoRoute),
            Err(fault) => {
                return Err(FallbackReason::Rejected {
                    attempts: 0,
                    fault: fault.to_string(),
                });
            }
        };

        let policy = self.retry.clone().with_max_retries(max_retries);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            self.counters
                .network_attempts
                .fetch_add(1, Ordering::Relaxed);

            let fault = match self.attempt(adapter, request.clone()).await {
                Ok(record) => {
                    debug!(platform = %platform, identity, attempts, "Fetched real record");
                    return Ok(Fetched { record, attempts });
                }
                Err(fault) => fault,
            };

            if !fault.is_retryable() {
                return Err(FallbackReason::Rejected {
                    attempts,
                    fault: fault.to_string(),
                });
            }

            let retries_used = attempts - 1;
            if !policy.should_retry(retries_used) {
                return Err(FallbackReason::Exhausted {
                    attempts,
                    last_fault: fault.to_string(),
                });
            }

            let delay = policy.delay_for_attempt(attempts);
            warn!(
                platform = %platform,
                identity,
                attempt = attempts,
                max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %fault,
                "Retrying after fault"
            );
            self.counters.retries.fetch_add(1, Ordering::Relaxed);
            delays.push(delay);
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(
        &self,
        adapter: &dyn MetricsAdapter,
        request: HttpRequest,
    ) -> Result<MetricRecord, FetchFault> {
        let url = request.url.clone();
        let response = self.transport.execute(request).await?;
        if !response.status.is_success() {
            return Err(FetchFault::HttpStatus {
                status: response.status,
                url,
            });
        }

        let raw: serde_json::Value =
            serde_json::from_str(&response.body).map_err(TransformError::from)?;
        let record = adapter.transform(&raw)?;
        record.validate().map_err(TransformError::from)?;
        if record.provenance() != Provenance::Real {
            return Err(TransformError::UnexpectedShape(
                "transform produced a synthetic record".to_string(),
            )
            .into());
        }
        Ok(record)
    }
}
