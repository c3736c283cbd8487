use std::sync::Arc;

use creator_metrics::MetricsAggregator;
use tracing::info;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::output::{OutputManager, write_output};

pub struct CommandExecutor {
    config: AppConfig,
    output: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: AppConfig) -> Self {
        let output = OutputManager::new(config.colored);
        Self { config, output }
    }

    fn aggregator(&self) -> Result<MetricsAggregator> {
        let registry = Arc::new(self.config.credential_registry());
        Ok(MetricsAggregator::from_config(registry, &self.config.metrics)?)
    }

    pub async fn fetch(
        &self,
        creator_ids: &[String],
        format: OutputFormat,
        concurrency: usize,
        show_stats: bool,
    ) -> Result<()> {
        if concurrency == 0 {
            return Err(CliError::InvalidArgument(
                "--concurrency must be at least 1".to_string(),
            ));
        }

        let aggregator = self.aggregator()?;
        info!(
            creators = creator_ids.len(),
            platforms = aggregator.platforms().len(),
            mode = aggregator.client().mode().as_str(),
            "Fetching creator metrics"
        );

        let snapshots = aggregator.get_many(creator_ids, concurrency).await;
        write_output(&self.output.format_snapshots(&snapshots, format)?)?;

        if show_stats {
            let stats = aggregator.client().stats();
            write_output(&self.output.format_stats(&stats, format)?)?;
        }
        Ok(())
    }

    pub fn platforms(&self, format: OutputFormat) -> Result<()> {
        let registry = self.config.credential_registry();
        write_output(&self.output.format_platforms(&registry.status(), format)?)
    }

    pub fn show_config(&self) -> Result<()> {
        self.config.metrics.validate()?;
        write_output(&self.config.show()?)
    }
}
