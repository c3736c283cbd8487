use std::collections::HashMap;
use std::path::{Path, PathBuf};

use creator_metrics::{CredentialRegistry, MetricsConfig, PlatformId, TransportMode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Args;
use crate::error::{CliError, Result};

const CONFIG_DIR: &str = "creator-metrics";
const CONFIG_FILE: &str = "config.toml";

/// Settings read from the config file.
///
/// ```toml
/// colored = true
///
/// [metrics]
/// cache_ttl_ms = 300000
///
/// [metrics.transport]
/// mode = "proxy"
/// base_url = "https://proxy.example.com/api"
///
/// [credentials]
/// spotify = "sk_live_..."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub colored: bool,
    pub metrics: MetricsConfig,
    /// Secrets taking precedence over the environment.
    pub credentials: HashMap<PlatformId, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            colored: true,
            metrics: MetricsConfig::default(),
            credentials: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load `path`, or the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };

        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::parse(&content).map_err(|source| CliError::ConfigParse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Command-line flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(url) = &args.proxy_url {
            self.metrics.transport = TransportMode::proxy(url.clone());
        }
        if let Some(prefix) = &args.env_prefix {
            self.metrics.env_prefix = Some(prefix.clone());
        }
        if let Some(retries) = args.retries {
            self.metrics.retry.max_retries = retries;
        }
        if args.no_color {
            self.colored = false;
        }
    }

    /// File secrets first, then `<PREFIX>_<PLATFORM>_API_KEY`, then
    /// `<PLATFORM>_API_KEY`.
    pub fn credential_registry(&self) -> CredentialRegistry {
        self.registry_with(|key| std::env::var(key).ok())
    }

    fn registry_with<F>(&self, env: F) -> CredentialRegistry
    where
        F: Fn(&str) -> Option<String>,
    {
        CredentialRegistry::from_lookup(self.metrics.env_prefix.as_deref(), |platform, key| {
            self.credentials.get(&platform).cloned().or_else(|| env(key))
        })
    }

    /// TOML rendering with secrets masked.
    pub fn show(&self) -> Result<String> {
        let mut redacted = self.clone();
        for secret in redacted.credentials.values_mut() {
            *secret = "<redacted>".to_string();
        }
        Ok(toml::to_string_pretty(&redacted)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::parse(
            r#"
colored = false

[metrics]
cache_ttl_ms = 60000
env_prefix = "VITE"

[metrics.retry]
max_retries = 2

[metrics.transport]
mode = "proxy"
base_url = "https://proxy.example.com/api"

[metrics.endpoint_overrides]
spotify = "http://localhost:9000"

[credentials]
twitter = "sk_live_file"
"#,
        )
        .unwrap();

        assert!(!config.colored);
        assert_eq!(config.metrics.cache_ttl_ms, 60_000);
        assert_eq!(config.metrics.retry.max_retries, 2);
        assert_eq!(config.metrics.retry.initial_delay_ms, 1000);
        assert_eq!(
            config.metrics.transport,
            TransportMode::proxy("https://proxy.example.com/api")
        );
        assert_eq!(
            config.metrics.endpoint_overrides[&PlatformId::Spotify],
            "http://localhost:9000"
        );
        assert_eq!(config.credentials[&PlatformId::Twitter], "sk_live_file");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(AppConfig::load(Some(&missing)).unwrap(), AppConfig::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "colored = [").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&broken)),
            Err(CliError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_args_override_file() {
        let args = Args::parse_from([
            "cmx",
            "--proxy-url",
            "https://p.example.com",
            "--retries",
            "0",
            "--no-color",
            "platforms",
        ]);
        let mut config = AppConfig::default();
        config.apply_args(&args);

        assert_eq!(
            config.metrics.transport,
            TransportMode::proxy("https://p.example.com")
        );
        assert_eq!(config.metrics.retry.max_retries, 0);
        assert!(!config.colored);
    }

    #[test]
    fn test_file_secrets_take_precedence() {
        let config = AppConfig {
            credentials: HashMap::from([(PlatformId::Twitter, "sk_live_file".to_string())]),
            ..Default::default()
        };
        let env = HashMap::from([
            ("TWITTER_API_KEY", "sk_live_env"),
            ("SPOTIFY_API_KEY", "mock-spotify"),
            ("TWITCH_API_KEY", "sk_live_twitch"),
        ]);
        let registry = config.registry_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            registry.resolve(PlatformId::Twitter).real_secret(),
            Some("sk_live_file")
        );
        assert!(!registry.is_real(PlatformId::Spotify));
        assert!(registry.is_real(PlatformId::Twitch));
    }

    #[test]
    fn test_show_redacts_secrets() {
        let config = AppConfig {
            credentials: HashMap::from([(PlatformId::Twitter, "sk_live_file".to_string())]),
            ..Default::default()
        };
        let shown = config.show().unwrap();
        assert!(!shown.contains("sk_live_file"));
        assert!(shown.contains("<redacted>"));
    }
}
