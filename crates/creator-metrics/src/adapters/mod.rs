//! Platform adapters.
//!
//! An adapter knows one provider: how to address a creator there, what the
//! outbound request looks like, how the raw payload maps onto a canonical
//! record, and how to manufacture a plausible record when none can be fetched.
//! Orchestration (cache, retry, fallback) lives in
//! [`ResilientClient`](crate::client::ResilientClient).

pub mod brand;
pub mod social;
pub mod streaming;
pub mod synth;
pub mod utils;

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::{MetricsError, TransformError};
use crate::platform::PlatformId;
use crate::record::MetricRecord;

pub use brand::BrandDealAdapter;
pub use social::SocialAdapter;
pub use streaming::StreamingAdapter;

/// Provider request before the transport mode is applied.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    /// Resource name reported to the proxy, e.g. `users`.
    pub resource: &'static str,
    pub headers: HeaderMap,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>, resource: &'static str) -> Self {
        Self {
            url: url.into(),
            resource,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }
}

/// Identity on a platform for a creator id: `creator_{id}`.
pub fn platform_identity(platform: PlatformId, creator_id: &str) -> Result<String, MetricsError> {
    let creator_id = creator_id.trim();
    if creator_id.is_empty() {
        return Err(MetricsError::InvalidCreatorId(creator_id.to_string()));
    }

    let identity = format!("creator_{creator_id}");
    if let Some(c) = identity
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(MetricsError::InvalidIdentity {
            platform,
            identity,
            reason: format!("character {c:?} is not allowed"),
        });
    }

    Ok(identity)
}

/// One provider.
pub trait MetricsAdapter: Send + Sync {
    fn platform(&self) -> PlatformId;

    /// Derive the platform handle for a creator.
    fn identity(&self, creator_id: &str) -> Result<String, MetricsError> {
        platform_identity(self.platform(), creator_id)
    }

    /// The provider request, or `None` when the platform has no public API.
    fn build_request(&self, identity: &str) -> Option<OutboundRequest>;

    /// Map a provider payload onto a real record.
    fn transform(&self, raw: &Value) -> Result<MetricRecord, TransformError>;

    /// A plausible synthetic record, stable for a given seed.
    fn synthesize(&self, seed: &str) -> MetricRecord;

    fn cache_key(&self, identity: &str) -> String {
        format!("{}:{identity}", self.platform())
    }
}

/// The configured base URL without its trailing slash, or `default`.
pub(crate) fn base_url_or(base_url: Option<&str>, default: &str) -> String {
    base_url
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// One adapter per known platform, in [`PlatformId::ALL`] order.
pub fn default_adapters(
    overrides: &HashMap<PlatformId, String>,
) -> Vec<Arc<dyn MetricsAdapter>> {
    PlatformId::ALL
        .into_iter()
        .map(|platform| adapter_for(platform, overrides))
        .collect()
}

pub fn adapter_for(
    platform: PlatformId,
    overrides: &HashMap<PlatformId, String>,
) -> Arc<dyn MetricsAdapter> {
    let base_url = overrides.get(&platform).map(String::as_str);
    match platform {
        PlatformId::Twitter | PlatformId::Instagram | PlatformId::TikTok => {
            Arc::new(SocialAdapter::new(platform, base_url))
        }
        PlatformId::Spotify
        | PlatformId::YouTube
        | PlatformId::Twitch
        | PlatformId::AppleMusic
        | PlatformId::SoundCloud => Arc::new(StreamingAdapter::new(platform, base_url)),
        PlatformId::BrandIntel => Arc::new(BrandDealAdapter::new(base_url)),
    }
}
