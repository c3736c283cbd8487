use std::sync::Arc;

use futures::StreamExt;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::adapters::{MetricsAdapter, default_adapters};
use crate::client::ResilientClient;
use crate::config::MetricsConfig;
use crate::credentials::CredentialRegistry;
use crate::error::MetricsError;
use crate::platform::PlatformId;
use crate::record::{CreatorMetricsSnapshot, MetricRecord};

/// Fans one creator id out to every adapter and merges what comes back.
#[derive(Clone)]
pub struct MetricsAggregator {
    client: Arc<ResilientClient>,
    adapters: Vec<Arc<dyn MetricsAdapter>>,
}

impl MetricsAggregator {
    pub fn new(client: Arc<ResilientClient>, adapters: Vec<Arc<dyn MetricsAdapter>>) -> Self {
        Self { client, adapters }
    }

    /// One adapter per known platform, honoring endpoint overrides.
    pub fn with_default_adapters(client: Arc<ResilientClient>, config: &MetricsConfig) -> Self {
        Self::new(client, default_adapters(&config.endpoint_overrides))
    }

    /// Validate `config`, build a real HTTP client and the default adapters.
    pub fn from_config(
        registry: Arc<CredentialRegistry>,
        config: &MetricsConfig,
    ) -> Result<Self, MetricsError> {
        config.validate()?;
        let client = Arc::new(ResilientClient::from_config(registry, config)?);
        Ok(Self::with_default_adapters(client, config))
    }

    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    pub fn platforms(&self) -> Vec<PlatformId> {
        self.adapters.iter().map(|a| a.platform()).collect()
    }

    /// Fetch every platform concurrently.
    ///
    /// A call that fails is logged and left out; the snapshot holds whatever
    /// succeeded, possibly nothing.
    pub async fn get_creator_metrics(&self, creator_id: &str) -> CreatorMetricsSnapshot {
        let tasks = self.adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let client = Arc::clone(&self.client);
            let creator_id = creator_id.to_string();
            tokio::spawn(async move {
                let identity = adapter.identity(&creator_id)?;
                Ok::<MetricRecord, MetricsError>(client.fetch(adapter.as_ref(), &identity).await)
            })
        });

        let outcomes = join_all(tasks).await;

        let records = outcomes
            .into_iter()
            .zip(&self.adapters)
            .filter_map(|(outcome, adapter)| {
                let platform = adapter.platform();
                match outcome {
                    Ok(Ok(record)) => Some(record),
                    Ok(Err(e)) => {
                        warn!(creator_id, platform = %platform, error = %e, "Excluding platform from snapshot");
                        None
                    }
                    Err(e) => {
                        warn!(creator_id, platform = %platform, error = %e, "Adapter task failed, excluding platform");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        debug!(
            creator_id,
            records = records.len(),
            adapters = self.adapters.len(),
            "Assembled snapshot"
        );
        CreatorMetricsSnapshot::assemble(creator_id, records)
    }

    /// Snapshots for several creators, in input order, at most `concurrency`
    /// creators in flight.
    pub async fn get_many<S: AsRef<str>>(
        &self,
        creator_ids: &[S],
        concurrency: usize,
    ) -> Vec<CreatorMetricsSnapshot> {
        futures::stream::iter(creator_ids)
            .map(|id| self.get_creator_metrics(id.as_ref()))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
