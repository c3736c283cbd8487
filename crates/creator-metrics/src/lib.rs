//! Creator metrics acquisition.
//!
//! Fetches creator statistics (social followers, streaming plays, brand deals)
//! from third-party providers and merges them into one
//! [`CreatorMetricsSnapshot`]. Fetching never fails: a platform without a real
//! credential, or one whose provider keeps failing, is served a synthetic
//! record flagged with [`Provenance::Synthetic`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use creator_metrics::{CredentialRegistry, MetricsAggregator, MetricsConfig};
//!
//! # async fn run() -> Result<(), creator_metrics::MetricsError> {
//! let config = MetricsConfig::default();
//! let registry = Arc::new(CredentialRegistry::from_env(config.env_prefix.as_deref()));
//! let aggregator = MetricsAggregator::from_config(registry, &config)?;
//!
//! let snapshot = aggregator.get_creator_metrics("42").await;
//! println!("{} records", snapshot.record_count());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod aggregator;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod platform;
pub mod record;

#[cfg(test)]
mod test_utils;

pub use adapters::{MetricsAdapter, OutboundRequest, default_adapters};
pub use aggregator::MetricsAggregator;
pub use client::{
    ClientStats, FallbackReason, FetchReport, FetchSource, HttpTransport, ResilientClient,
    RetryConfig, TransportMode,
};
pub use config::MetricsConfig;
pub use credentials::{Credential, CredentialKind, CredentialRegistry, CredentialStatus};
pub use error::{FetchFault, MetricsError, RecordError, TransformError};
pub use platform::{MetricsDomain, PlatformId};
pub use record::{
    BrandDealMetric, CreatorMetricsSnapshot, MetricRecord, Provenance, SnapshotSummary,
    SocialMetric, StreamingMetric,
};
