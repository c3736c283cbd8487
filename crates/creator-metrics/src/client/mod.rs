//! Resilient request execution shared by every adapter.

pub mod cache;
pub mod resilient;
pub mod retry;
pub mod transport;

pub use cache::{CacheEntry, CacheStats, DEFAULT_TTL, MetricCache};
pub use resilient::{
    ClientStats, FallbackReason, FetchReport, FetchSource, Fetched, ResilientClient,
};
pub use retry::{DEFAULT_MAX_RETRIES, RetryConfig};
pub use transport::{
    DEFAULT_USER_AGENT, HttpRequest, HttpResponse, HttpTransport, ProxyEnvelope, ReqwestTransport,
    TransportMode, build_client, install_rustls_provider,
};
