//! Synthetic record generator.
//!
//! Numbers are drawn from a generator seeded with `SHA-256(platform:seed)`, so
//! one creator always gets the same plausible figures for one platform.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use sha2::{Digest, Sha256};

use super::utils::{derive_popularity, round2};
use crate::platform::PlatformId;
use crate::record::{BrandDealMetric, Provenance, SocialMetric, StreamingMetric};

/// Brands used for synthetic deals.
const BRANDS: [&str; 10] = [
    "Nike", "Adidas", "Red Bull", "Samsung", "Spotify", "Coca-Cola", "Apple", "Puma",
    "GoPro", "Monster Energy",
];

pub const MAX_SYNTHETIC_DEALS: usize = 5;

pub(crate) fn seeded_rng(platform: PlatformId, seed: &str) -> StdRng {
    let digest = Sha256::digest(format!("{}:{seed}", platform.as_str()).as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    StdRng::from_seed(bytes)
}

fn follower_range(platform: PlatformId) -> (u64, u64) {
    match platform {
        PlatformId::Twitter => (5_000, 500_000),
        PlatformId::Instagram => (10_000, 1_000_000),
        PlatformId::TikTok => (20_000, 2_000_000),
        _ => (1_000, 100_000),
    }
}

fn listener_range(platform: PlatformId) -> (u64, u64) {
    match platform {
        PlatformId::Spotify => (10_000, 1_000_000),
        PlatformId::YouTube => (5_000, 2_000_000),
        PlatformId::Twitch => (1_000, 250_000),
        PlatformId::AppleMusic => (5_000, 500_000),
        PlatformId::SoundCloud => (1_000, 200_000),
        _ => (1_000, 100_000),
    }
}

/// Typical listening session per play, in seconds.
pub(crate) fn nominal_stream_seconds(platform: PlatformId) -> f64 {
    match platform {
        PlatformId::YouTube => 480.0,
        PlatformId::Twitch => 2_700.0,
        _ => 180.0,
    }
}

pub fn social(platform: PlatformId, seed: &str) -> SocialMetric {
    let mut rng = seeded_rng(platform, seed);
    let (low, high) = follower_range(platform);

    SocialMetric {
        platform,
        followers: rng.random_range(low..high),
        engagement_rate: round2(rng.random_range(0.5..8.0)),
        growth_pct: round2(rng.random_range(-2.0..15.0)),
        post_count: rng.random_range(50..2_000),
        provenance: Provenance::Synthetic,
    }
}

pub fn streaming(platform: PlatformId, seed: &str) -> StreamingMetric {
    let mut rng = seeded_rng(platform, seed);
    let (low, high) = listener_range(platform);
    let listeners = rng.random_range(low..high);
    let plays_per_listener = rng.random_range(5..40);
    let nominal = nominal_stream_seconds(platform);

    StreamingMetric {
        platform,
        listeners,
        streams: listeners.saturating_mul(plays_per_listener),
        growth_pct: round2(rng.random_range(-5.0..25.0)),
        avg_stream_seconds: round2(nominal * rng.random_range(0.6..1.2)),
        popularity: derive_popularity(listeners),
        provenance: Provenance::Synthetic,
    }
}

/// Between one and five deals active around `today`.
pub fn brand_deals(seed: &str, today: NaiveDate) -> Vec<BrandDealMetric> {
    let mut rng = seeded_rng(PlatformId::BrandIntel, seed);
    let count = rng.random_range(1..=MAX_SYNTHETIC_DEALS);
    let offset = rng.random_range(0..BRANDS.len());

    (0..count)
        .map(|i| {
            let started_ago = rng.random_range(0..180u64);
            let duration = rng.random_range(30..365u64);
            let start_date = today.checked_sub_days(Days::new(started_ago)).unwrap_or(today);
            let end_date = start_date
                .checked_add_days(Days::new(duration))
                .unwrap_or(start_date);

            BrandDealMetric {
                brand: BRANDS[(offset + i) % BRANDS.len()].to_string(),
                deal_value_usd: round2(rng.random_range(1_000.0..250_000.0)),
                start_date,
                end_date,
                engagement_rate: round2(rng.random_range(1.0..12.0)),
                conversion_rate: round2(rng.random_range(0.1..5.0)),
                provenance: Provenance::Synthetic,
            }
        })
        .collect()
}
