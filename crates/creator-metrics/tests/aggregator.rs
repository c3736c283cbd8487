use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use creator_metrics::client::{HttpRequest, HttpResponse};
use creator_metrics::{
    CredentialRegistry, FallbackReason, FetchFault, FetchSource, HttpTransport, MetricRecord,
    MetricsAggregator, MetricsConfig, PlatformId, ResilientClient, adapters::adapter_for,
};
use reqwest::StatusCode;

/// Answers every request with a 500.
#[derive(Default)]
struct BrokenProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl HttpTransport for BrokenProvider {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, FetchFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "upstream unavailable".to_string(),
        })
    }
}

fn aggregator(registry: CredentialRegistry, transport: Arc<BrokenProvider>) -> MetricsAggregator {
    let config = MetricsConfig::default();
    let client = Arc::new(ResilientClient::new(Arc::new(registry), transport, &config));
    MetricsAggregator::with_default_adapters(client, &config)
}

#[tokio::test]
async fn snapshot_without_secrets_is_synthetic_and_complete() {
    let transport = Arc::new(BrokenProvider::default());
    let aggregator = aggregator(CredentialRegistry::empty(), transport.clone());

    let snapshot = aggregator.get_creator_metrics("42").await;

    assert_eq!(snapshot.social.len(), 3);
    assert_eq!(snapshot.streaming.len(), 5);
    assert!(!snapshot.brand_deals.is_empty());
    assert!(snapshot.summary().fully_synthetic());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["creatorId"], "42");
    assert!(json["social"].as_array().unwrap().iter().all(|m| m["provenance"] == "synthetic"));
}

#[tokio::test(start_paused = true)]
async fn real_secret_with_failing_provider_backs_off_then_synthesizes() {
    let transport = Arc::new(BrokenProvider::default());
    let registry = CredentialRegistry::from_secrets([(PlatformId::Spotify, "sk_live_abc123")]);
    let config = MetricsConfig::default();
    let client = ResilientClient::new(Arc::new(registry), transport.clone(), &config);
    let adapter = adapter_for(PlatformId::Spotify, &config.endpoint_overrides);

    let report = client
        .fetch_report(adapter.as_ref(), "creator_42", 3)
        .await;

    assert_eq!(
        report.delays,
        [1000, 2000, 4000].map(Duration::from_millis).to_vec()
    );
    assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
    assert!(matches!(
        report.source,
        FetchSource::Synthetic(FallbackReason::Exhausted { attempts: 4, .. })
    ));
    let MetricRecord::Streaming(metric) = report.record else {
        panic!("expected a streaming record");
    };
    assert!(metric.is_synthetic());
    assert!(metric.validate().is_ok());
}

#[tokio::test(start_paused = true)]
async fn mixed_credentials_only_touch_real_platforms() {
    let transport = Arc::new(BrokenProvider::default());
    let registry = CredentialRegistry::from_secrets([
        (PlatformId::Twitter, "mock-twitter-key"),
        (PlatformId::Twitch, "sk_live_twitch"),
    ]);
    let aggregator = aggregator(registry, transport.clone());

    let snapshot = aggregator.get_creator_metrics("42").await;

    // Only twitch hits the network: one attempt plus three retries.
    assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
    assert_eq!(snapshot.record_count(), 8 + snapshot.brand_deals.len());
    assert!(snapshot.summary().fully_synthetic());
}
