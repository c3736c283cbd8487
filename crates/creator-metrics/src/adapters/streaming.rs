use reqwest::header::ACCEPT;
use serde_json::Value;

use super::synth::{self, nominal_stream_seconds};
use super::utils::{derive_popularity, get_f64, get_u64, require_u64};
use super::{MetricsAdapter, OutboundRequest, base_url_or};
use crate::error::TransformError;
use crate::platform::PlatformId;
use crate::record::{MetricRecord, Provenance, StreamingMetric};

/// Spotify, YouTube, Twitch, Apple Music and SoundCloud.
///
/// Apple Music and SoundCloud have no public metrics API; they never produce
/// a request and are always served synthetically.
#[derive(Debug, Clone)]
pub struct StreamingAdapter {
    platform: PlatformId,
    base_url: String,
}

/// Canonical fields before validation.
struct Counts {
    listeners: u64,
    streams: u64,
    popularity: Option<f64>,
}

impl StreamingAdapter {
    pub fn new(platform: PlatformId, base_url: Option<&str>) -> Self {
        let default = match platform {
            PlatformId::Spotify => "https://api.spotify.com",
            PlatformId::YouTube => "https://www.googleapis.com",
            PlatformId::Twitch => "https://api.twitch.tv",
            _ => "",
        };
        Self {
            platform,
            base_url: base_url_or(base_url, default),
        }
    }

    fn spotify(raw: &Value) -> Result<Counts, TransformError> {
        let listeners = require_u64(raw, "/followers/total", "followers.total")?;
        // Spotify reports no play count for an artist; assume one play per follower.
        let streams = get_u64(raw, "/streams").unwrap_or(listeners);
        Ok(Counts {
            listeners,
            streams,
            popularity: get_f64(raw, "/popularity"),
        })
    }

    fn youtube(raw: &Value) -> Result<Counts, TransformError> {
        let items = raw
            .get("items")
            .and_then(Value::as_array)
            .ok_or(TransformError::MissingField("items"))?;
        if items.is_empty() {
            return Err(TransformError::UnexpectedShape(
                "channel lookup returned no items".to_string(),
            ));
        }

        Ok(Counts {
            listeners: require_u64(
                raw,
                "/items/0/statistics/subscriberCount",
                "subscriberCount",
            )?,
            streams: require_u64(raw, "/items/0/statistics/viewCount", "viewCount")?,
            popularity: None,
        })
    }

    fn twitch(raw: &Value) -> Result<Counts, TransformError> {
        let streams = require_u64(raw, "/data/0/view_count", "view_count")?;
        let listeners = get_u64(raw, "/data/0/follower_count").unwrap_or(0);
        Ok(Counts {
            listeners,
            streams,
            popularity: None,
        })
    }
}

impl MetricsAdapter for StreamingAdapter {
    fn platform(&self) -> PlatformId {
        self.platform
    }

    fn build_request(&self, identity: &str) -> Option<OutboundRequest> {
        let base = &self.base_url;
        let request = match self.platform {
            PlatformId::Spotify => {
                OutboundRequest::get(format!("{base}/v1/artists/{identity}"), "artists")
            }
            PlatformId::YouTube => OutboundRequest::get(
                format!("{base}/youtube/v3/channels?part=statistics&forHandle={identity}"),
                "channels",
            ),
            PlatformId::Twitch => {
                OutboundRequest::get(format!("{base}/helix/users?login={identity}"), "users")
            }
            _ => return None,
        };
        Some(request.with_header(ACCEPT, "application/json"))
    }

    fn transform(&self, raw: &Value) -> Result<MetricRecord, TransformError> {
        let counts = match self.platform {
            PlatformId::Spotify => Self::spotify(raw)?,
            PlatformId::YouTube => Self::youtube(raw)?,
            PlatformId::Twitch => Self::twitch(raw)?,
            other => {
                return Err(TransformError::UnexpectedShape(format!(
                    "{other} has no public API"
                )));
            }
        };

        let popularity = match counts.popularity {
            Some(p) => p.clamp(0.0, 100.0).round() as u8,
            None => derive_popularity(counts.listeners),
        };

        let metric = StreamingMetric::new(
            self.platform,
            counts.listeners,
            counts.streams,
            0.0,
            nominal_stream_seconds(self.platform),
            popularity,
            Provenance::Real,
        )?;
        Ok(MetricRecord::Streaming(metric))
    }

    fn synthesize(&self, seed: &str) -> MetricRecord {
        MetricRecord::Streaming(synth::streaming(self.platform, seed))
    }
}
