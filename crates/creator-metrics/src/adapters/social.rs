use reqwest::header::ACCEPT;
use serde_json::Value;

use super::synth;
use super::utils::{engagement_proxy, get_f64, get_u64, require_u64, round2};
use super::{MetricsAdapter, OutboundRequest, base_url_or};
use crate::error::TransformError;
use crate::platform::PlatformId;
use crate::record::{MetricRecord, Provenance, SocialMetric};

/// Twitter, Instagram and TikTok.
#[derive(Debug, Clone)]
pub struct SocialAdapter {
    platform: PlatformId,
    base_url: String,
}

impl SocialAdapter {
    /// `base_url` overrides the provider host.
    pub fn new(platform: PlatformId, base_url: Option<&str>) -> Self {
        let default = match platform {
            PlatformId::Twitter => "https://api.twitter.com",
            PlatformId::Instagram => "https://graph.instagram.com",
            PlatformId::TikTok => "https://open.tiktokapis.com",
            // Not a social platform: `build_request` yields nothing.
            _ => "",
        };
        Self {
            platform,
            base_url: base_url_or(base_url, default),
        }
    }

    fn transform_twitter(raw: &Value) -> Result<(u64, u64, f64), TransformError> {
        let followers = require_u64(
            raw,
            "/data/public_metrics/followers_count",
            "followers_count",
        )?;
        let tweets = require_u64(raw, "/data/public_metrics/tweet_count", "tweet_count")?;
        let likes = get_u64(raw, "/data/public_metrics/like_count").unwrap_or(0);
        let listed = get_u64(raw, "/data/public_metrics/listed_count").unwrap_or(0);

        let engagement = engagement_proxy(likes.saturating_add(listed), tweets, followers);
        Ok((followers, tweets, engagement))
    }

    fn transform_instagram(raw: &Value) -> Result<(u64, u64, f64), TransformError> {
        let followers = require_u64(raw, "/followers_count", "followers_count")?;
        let media = require_u64(raw, "/media_count", "media_count")?;

        let engagement = match get_f64(raw, "/engagement_rate") {
            Some(rate) => round2(rate.clamp(0.0, 100.0)),
            None => {
                let likes = get_u64(raw, "/like_count").unwrap_or(0);
                let comments = get_u64(raw, "/comments_count").unwrap_or(0);
                engagement_proxy(likes.saturating_add(comments), media, followers)
            }
        };
        Ok((followers, media, engagement))
    }

    fn transform_tiktok(raw: &Value) -> Result<(u64, u64, f64), TransformError> {
        let followers = require_u64(raw, "/data/user/follower_count", "follower_count")?;
        let videos = require_u64(raw, "/data/user/video_count", "video_count")?;
        let likes = get_u64(raw, "/data/user/likes_count").unwrap_or(0);

        Ok((followers, videos, engagement_proxy(likes, videos, followers)))
    }
}

impl MetricsAdapter for SocialAdapter {
    fn platform(&self) -> PlatformId {
        self.platform
    }

    fn build_request(&self, identity: &str) -> Option<OutboundRequest> {
        let base = &self.base_url;
        let request = match self.platform {
            PlatformId::Twitter => OutboundRequest::get(
                format!("{base}/2/users/by/username/{identity}?user.fields=public_metrics"),
                "users",
            ),
            PlatformId::Instagram => OutboundRequest::get(
                format!(
                    "{base}/v19.0/{identity}?fields=followers_count,media_count,like_count,comments_count"
                ),
                "profile",
            ),
            PlatformId::TikTok => OutboundRequest::get(
                format!(
                    "{base}/v2/user/info/?username={identity}&fields=follower_count,video_count,likes_count"
                ),
                "user",
            ),
            _ => return None,
        };
        Some(request.with_header(ACCEPT, "application/json"))
    }

    fn transform(&self, raw: &Value) -> Result<MetricRecord, TransformError> {
        let (followers, post_count, engagement_rate) = match self.platform {
            PlatformId::Twitter => Self::transform_twitter(raw)?,
            PlatformId::Instagram => Self::transform_instagram(raw)?,
            PlatformId::TikTok => Self::transform_tiktok(raw)?,
            other => {
                return Err(TransformError::UnexpectedShape(format!(
                    "{other} payload routed to the social adapter"
                )));
            }
        };

        // None of these providers report growth in a single snapshot.
        let metric = SocialMetric::new(
            self.platform,
            followers,
            engagement_rate,
            0.0,
            post_count,
            Provenance::Real,
        )?;
        Ok(MetricRecord::Social(metric))
    }

    fn synthesize(&self, seed: &str) -> MetricRecord {
        MetricRecord::Social(synth::social(self.platform, seed))
    }
}
