use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MetricsError;

/// Metric family a platform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsDomain {
    Social,
    Streaming,
    BrandDeals,
}

impl MetricsDomain {
    /// Path segment used when a request is routed through the proxy.
    pub fn proxy_endpoint(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Streaming => "streaming",
            Self::BrandDeals => "brand-deals",
        }
    }
}

/// Every external source the acquisition layer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformId {
    Twitter,
    Instagram,
    #[serde(rename = "tiktok")]
    TikTok,
    Spotify,
    #[serde(rename = "youtube")]
    YouTube,
    Twitch,
    AppleMusic,
    #[serde(rename = "soundcloud")]
    SoundCloud,
    BrandIntel,
}

impl PlatformId {
    pub const ALL: [PlatformId; 9] = [
        Self::Twitter,
        Self::Instagram,
        Self::TikTok,
        Self::Spotify,
        Self::YouTube,
        Self::Twitch,
        Self::AppleMusic,
        Self::SoundCloud,
        Self::BrandIntel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
            Self::Spotify => "spotify",
            Self::YouTube => "youtube",
            Self::Twitch => "twitch",
            Self::AppleMusic => "apple_music",
            Self::SoundCloud => "soundcloud",
            Self::BrandIntel => "brand_intel",
        }
    }

    pub fn domain(&self) -> MetricsDomain {
        match self {
            Self::Twitter | Self::Instagram | Self::TikTok => MetricsDomain::Social,
            Self::Spotify | Self::YouTube | Self::Twitch | Self::AppleMusic | Self::SoundCloud => {
                MetricsDomain::Streaming
            }
            Self::BrandIntel => MetricsDomain::BrandDeals,
        }
    }

    /// Upper-case stem of the platform's environment variable, e.g. `APPLE_MUSIC`.
    pub fn env_stem(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// Environment variable holding the platform secret.
    ///
    /// `prefix = Some("VITE")` yields `VITE_TWITTER_API_KEY`, `None` yields `TWITTER_API_KEY`.
    pub fn env_key(&self, prefix: Option<&str>) -> String {
        match prefix.map(str::trim).filter(|p| !p.is_empty()) {
            Some(prefix) => format!(
                "{}_{}_API_KEY",
                prefix.trim_end_matches('_').to_ascii_uppercase(),
                self.env_stem()
            ),
            None => format!("{}_API_KEY", self.env_stem()),
        }
    }

    /// Whether the platform offers a public metrics API at all.
    ///
    /// Platforms without one are always served from the synthetic generator.
    pub fn has_public_api(&self) -> bool {
        !matches!(self, Self::AppleMusic | Self::SoundCloud)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| MetricsError::UnknownPlatform(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_without_prefix() {
        assert_eq!(PlatformId::Twitter.env_key(None), "TWITTER_API_KEY");
        assert_eq!(PlatformId::AppleMusic.env_key(None), "APPLE_MUSIC_API_KEY");
        assert_eq!(PlatformId::Spotify.env_key(Some("  ")), "SPOTIFY_API_KEY");
    }

    #[test]
    fn test_env_key_with_prefix() {
        assert_eq!(
            PlatformId::Twitter.env_key(Some("vite")),
            "VITE_TWITTER_API_KEY"
        );
        assert_eq!(
            PlatformId::BrandIntel.env_key(Some("APP_")),
            "APP_BRAND_INTEL_API_KEY"
        );
    }

    #[test]
    fn test_parse_platform() {
        assert_eq!("twitter".parse::<PlatformId>().unwrap(), PlatformId::Twitter);
        assert_eq!(
            "Apple-Music".parse::<PlatformId>().unwrap(),
            PlatformId::AppleMusic
        );
        assert!("myspace".parse::<PlatformId>().is_err());
    }

    #[test]
    fn test_domains() {
        assert_eq!(PlatformId::TikTok.domain(), MetricsDomain::Social);
        assert_eq!(PlatformId::SoundCloud.domain(), MetricsDomain::Streaming);
        assert_eq!(PlatformId::BrandIntel.domain(), MetricsDomain::BrandDeals);
        assert_eq!(MetricsDomain::BrandDeals.proxy_endpoint(), "brand-deals");
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for platform in PlatformId::ALL {
            let json = serde_json::to_value(platform).unwrap();
            assert_eq!(json, platform.as_str());
        }
    }

    #[test]
    fn test_public_api_flags() {
        assert!(!PlatformId::AppleMusic.has_public_api());
        assert!(!PlatformId::SoundCloud.has_public_api());
        assert!(PlatformId::Spotify.has_public_api());
    }
}
