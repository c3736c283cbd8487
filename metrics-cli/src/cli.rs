use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = "cmx",
    version,
    about = "Fetch creator metrics from social, streaming and brand-deal sources",
    long_about = "Fetch creator metrics snapshots. Platforms without a real API key \
                  (set <PLATFORM>_API_KEY) are served synthetic data flagged as such."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to <config_dir>/creator-metrics/config.toml)
    #[arg(short, long, global = true, env = "CMX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Route provider calls through a proxy that holds the secrets
    #[arg(long, global = true, env = "CMX_PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Prefix for credential variables, e.g. VITE reads VITE_TWITTER_API_KEY
    #[arg(long, global = true, env = "CMX_ENV_PREFIX")]
    pub env_prefix: Option<String>,

    /// Retries after the first attempt for each provider call
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a snapshot for one or more creators
    Fetch {
        /// Creator ids
        #[arg(required = true)]
        creator_ids: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        output: OutputFormat,

        /// Creators fetched at the same time
        #[arg(long, default_value_t = 4)]
        concurrency: usize,

        /// Print client counters after the snapshots
        #[arg(long)]
        stats: bool,
    },

    /// Show which platforms have real credentials
    Platforms {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        output: OutputFormat,
    },

    /// Show configuration
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    Pretty,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact)
    }
}

impl Args {
    /// Output format of the selected command, if it has one.
    pub fn output_format(&self) -> Option<OutputFormat> {
        match &self.command {
            Commands::Fetch { output, .. } | Commands::Platforms { output } => Some(*output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_fetch_args() {
        let args = Args::try_parse_from([
            "cmx",
            "fetch",
            "42",
            "43",
            "--output",
            "json-compact",
            "--retries",
            "1",
        ])
        .unwrap();

        assert_eq!(args.retries, Some(1));
        assert_eq!(args.output_format(), Some(OutputFormat::JsonCompact));
        match args.command {
            Commands::Fetch {
                creator_ids,
                concurrency,
                ..
            } => {
                assert_eq!(creator_ids, vec!["42", "43"]);
                assert_eq!(concurrency, 4);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_requires_ids() {
        assert!(Args::try_parse_from(["cmx", "fetch"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["cmx", "-v", "-q", "platforms"]).is_err());
    }
}
