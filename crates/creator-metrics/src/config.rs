use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::cache::DEFAULT_TTL;
use crate::client::retry::RetryConfig;
use crate::client::transport::{DEFAULT_USER_AGENT, TransportMode};
use crate::error::MetricsError;
use crate::platform::PlatformId;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings for the acquisition layer. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Cache lifetime measured from write time.
    pub cache_ttl_ms: u64,
    pub retry: RetryConfig,
    pub transport: TransportMode,
    /// Per-request timeout; `0` disables it.
    pub request_timeout_secs: u64,
    /// Prefix for credential environment variables, e.g. `VITE`.
    pub env_prefix: Option<String>,
    /// Replacement provider hosts, e.g. a sandbox API.
    pub endpoint_overrides: HashMap<PlatformId, String>,
    pub user_agent: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: u64::try_from(DEFAULT_TTL.as_millis()).unwrap_or(u64::MAX),
            retry: RetryConfig::default(),
            transport: TransportMode::Direct,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            env_prefix: None,
            endpoint_overrides: HashMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl MetricsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject values that would silently break every fetch.
    pub fn validate(&self) -> Result<(), MetricsError> {
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(MetricsError::Config(format!(
                "retry.backoff_multiplier must be >= 1, got {}",
                self.retry.backoff_multiplier
            )));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(MetricsError::Config(format!(
                "retry.initial_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.retry.initial_delay_ms, self.retry.max_delay_ms
            )));
        }

        if let TransportMode::Proxy { base_url } = &self.transport
            && !base_url.trim().is_empty()
        {
            check_http_url("transport.base_url", base_url)?;
        }
        for (platform, url) in &self.endpoint_overrides {
            check_http_url(&format!("endpoint_overrides.{platform}"), url)?;
        }
        Ok(())
    }
}

fn check_http_url(field: &str, value: &str) -> Result<(), MetricsError> {
    let url = Url::parse(value.trim())
        .map_err(|e| MetricsError::Config(format!("{field}: invalid URL `{value}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(MetricsError::Config(format!(
            "{field}: unsupported scheme `{scheme}`"
        ))),
    }
}
