//! Canonical metric records and the per-creator snapshot.
//!
//! Every record is validated when it is built, so a snapshot can only ever
//! hold fully-formed records, real or synthetic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::RecordError;
use crate::platform::PlatformId;

/// Where a record's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Returned by the provider and transformed locally.
    Real,
    /// Manufactured by the synthetic generator.
    Synthetic,
}

impl Provenance {
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), RecordError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RecordError::NotFinite { field, value })
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), RecordError> {
    check_finite(field, value)?;
    if value < min || value > max {
        return Err(RecordError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Percentages are bounded to [0, 100].
fn check_percent(field: &'static str, value: f64) -> Result<(), RecordError> {
    check_range(field, value, 0.0, 100.0)
}

/// Growth can be negative but a creator cannot lose more than everything.
fn check_growth(field: &'static str, value: f64) -> Result<(), RecordError> {
    check_range(field, value, -100.0, f64::MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMetric {
    pub platform: PlatformId,
    pub followers: u64,
    /// Percentage in [0, 100].
    pub engagement_rate: f64,
    pub growth_pct: f64,
    pub post_count: u64,
    pub provenance: Provenance,
}

impl SocialMetric {
    pub fn new(
        platform: PlatformId,
        followers: u64,
        engagement_rate: f64,
        growth_pct: f64,
        post_count: u64,
        provenance: Provenance,
    ) -> Result<Self, RecordError> {
        let metric = Self {
            platform,
            followers,
            engagement_rate,
            growth_pct,
            post_count,
            provenance,
        };
        metric.validate()?;
        Ok(metric)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        check_percent("engagementRate", self.engagement_rate)?;
        check_growth("growthPct", self.growth_pct)
    }
}

/// Serialized with a derived `isSynthetic` flag alongside `provenance`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingMetric {
    pub platform: PlatformId,
    pub listeners: u64,
    pub streams: u64,
    pub growth_pct: f64,
    pub avg_stream_seconds: f64,
    /// Score in [0, 100].
    pub popularity: u8,
    pub provenance: Provenance,
}

impl StreamingMetric {
    pub fn new(
        platform: PlatformId,
        listeners: u64,
        streams: u64,
        growth_pct: f64,
        avg_stream_seconds: f64,
        popularity: u8,
        provenance: Provenance,
    ) -> Result<Self, RecordError> {
        let metric = Self {
            platform,
            listeners,
            streams,
            growth_pct,
            avg_stream_seconds,
            popularity,
            provenance,
        };
        metric.validate()?;
        Ok(metric)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        check_growth("growthPct", self.growth_pct)?;
        check_range("avgStreamSeconds", self.avg_stream_seconds, 0.0, f64::MAX)?;
        check_percent("popularity", f64::from(self.popularity))
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.provenance.is_synthetic()
    }
}

impl Serialize for StreamingMetric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StreamingMetric", 8)?;
        state.serialize_field("platform", &self.platform)?;
        state.serialize_field("listeners", &self.listeners)?;
        state.serialize_field("streams", &self.streams)?;
        state.serialize_field("growthPct", &self.growth_pct)?;
        state.serialize_field("avgStreamSeconds", &self.avg_stream_seconds)?;
        state.serialize_field("popularity", &self.popularity)?;
        state.serialize_field("isSynthetic", &self.is_synthetic())?;
        state.serialize_field("provenance", &self.provenance)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDealMetric {
    pub brand: String,
    #[serde(rename = "dealValueUSD")]
    pub deal_value_usd: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub engagement_rate: f64,
    pub conversion_rate: f64,
    pub provenance: Provenance,
}

impl BrandDealMetric {
    pub fn new(
        brand: impl Into<String>,
        deal_value_usd: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        engagement_rate: f64,
        conversion_rate: f64,
        provenance: Provenance,
    ) -> Result<Self, RecordError> {
        let metric = Self {
            brand: brand.into(),
            deal_value_usd,
            start_date,
            end_date,
            engagement_rate,
            conversion_rate,
            provenance,
        };
        metric.validate()?;
        Ok(metric)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.brand.trim().is_empty() {
            return Err(RecordError::EmptyBrand);
        }
        check_range("dealValueUSD", self.deal_value_usd, 0.0, f64::MAX)?;
        if self.end_date < self.start_date {
            return Err(RecordError::InvertedDates {
                start: self.start_date,
                end: self.end_date,
            });
        }
        check_percent("engagementRate", self.engagement_rate)?;
        check_percent("conversionRate", self.conversion_rate)
    }
}

/// One adapter's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MetricRecord {
    Social(SocialMetric),
    Streaming(StreamingMetric),
    /// A brand-deal source reports every active deal in one response.
    BrandDeals(Vec<BrandDealMetric>),
}

impl MetricRecord {
    pub fn validate(&self) -> Result<(), RecordError> {
        match self {
            Self::Social(m) => m.validate(),
            Self::Streaming(m) => m.validate(),
            Self::BrandDeals(deals) => deals.iter().try_for_each(BrandDealMetric::validate),
        }
    }

    /// A brand-deal list counts as synthetic as soon as one deal is.
    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Social(m) => m.provenance,
            Self::Streaming(m) => m.provenance,
            Self::BrandDeals(deals) => {
                if deals.iter().any(|d| d.provenance.is_synthetic()) {
                    Provenance::Synthetic
                } else {
                    Provenance::Real
                }
            }
        }
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.provenance().is_synthetic()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Social(_) => "social",
            Self::Streaming(_) => "streaming",
            Self::BrandDeals(_) => "brand_deals",
        }
    }
}

/// Everything known about one creator at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorMetricsSnapshot {
    pub creator_id: String,
    pub social: Vec<SocialMetric>,
    pub streaming: Vec<StreamingMetric>,
    pub brand_deals: Vec<BrandDealMetric>,
    pub fetched_at: DateTime<Utc>,
}

impl CreatorMetricsSnapshot {
    /// Assemble a snapshot from settled records, timestamped now.
    pub fn assemble(
        creator_id: impl Into<String>,
        records: impl IntoIterator<Item = MetricRecord>,
    ) -> Self {
        let mut snapshot = Self {
            creator_id: creator_id.into(),
            social: Vec::new(),
            streaming: Vec::new(),
            brand_deals: Vec::new(),
            fetched_at: Utc::now(),
        };
        for record in records {
            snapshot.push(record);
        }
        snapshot
    }

    fn push(&mut self, record: MetricRecord) {
        match record {
            MetricRecord::Social(m) => self.social.push(m),
            MetricRecord::Streaming(m) => self.streaming.push(m),
            MetricRecord::BrandDeals(deals) => self.brand_deals.extend(deals),
        }
    }

    pub fn record_count(&self) -> usize {
        self.social.len() + self.streaming.len() + self.brand_deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    pub fn summary(&self) -> SnapshotSummary {
        let provenances = self
            .social
            .iter()
            .map(|m| m.provenance)
            .chain(self.streaming.iter().map(|m| m.provenance))
            .chain(self.brand_deals.iter().map(|m| m.provenance));

        let (mut real_records, mut synthetic_records) = (0, 0);
        for provenance in provenances {
            match provenance {
                Provenance::Real => real_records += 1,
                Provenance::Synthetic => synthetic_records += 1,
            }
        }

        let avg_engagement_rate = if self.social.is_empty() {
            0.0
        } else {
            self.social.iter().map(|m| m.engagement_rate).sum::<f64>() / self.social.len() as f64
        };

        SnapshotSummary {
            total_followers: saturating_total(self.social.iter().map(|m| m.followers)),
            total_listeners: saturating_total(self.streaming.iter().map(|m| m.listeners)),
            total_streams: saturating_total(self.streaming.iter().map(|m| m.streams)),
            total_deal_value_usd: self.brand_deals.iter().map(|d| d.deal_value_usd).sum(),
            avg_engagement_rate,
            real_records,
            synthetic_records,
        }
    }
}

/// Provider counts are unbounded, so totals clamp at `u64::MAX`.
fn saturating_total(counts: impl Iterator<Item = u64>) -> u64 {
    counts.fold(0u64, u64::saturating_add)
}

/// Roll-up used for dashboard headlines and trust badges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub total_followers: u64,
    pub total_listeners: u64,
    pub total_streams: u64,
    #[serde(rename = "totalDealValueUSD")]
    pub total_deal_value_usd: f64,
    pub avg_engagement_rate: f64,
    pub real_records: usize,
    pub synthetic_records: usize,
}

impl SnapshotSummary {
    /// True when nothing in the snapshot came from a real provider.
    pub fn fully_synthetic(&self) -> bool {
        self.real_records == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_social_metric_rejects_out_of_range_engagement() {
        let err = SocialMetric::new(PlatformId::Twitter, 10, 140.0, 0.0, 1, Provenance::Real)
            .unwrap_err();
        assert!(matches!(
            err,
            RecordError::OutOfRange {
                field: "engagementRate",
                ..
            }
        ));

        let err = SocialMetric::new(PlatformId::Twitter, 10, f64::NAN, 0.0, 1, Provenance::Real)
            .unwrap_err();
        assert!(matches!(err, RecordError::NotFinite { .. }));
    }

    #[test]
    fn test_streaming_metric_rejects_popularity_over_100() {
        let err = StreamingMetric::new(
            PlatformId::Spotify,
            1,
            1,
            0.0,
            180.0,
            101,
            Provenance::Real,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::OutOfRange { field: "popularity", .. }));
    }

    #[test]
    fn test_growth_floor() {
        assert!(
            SocialMetric::new(PlatformId::Instagram, 1, 1.0, -100.0, 0, Provenance::Real).is_ok()
        );
        assert!(
            SocialMetric::new(PlatformId::Instagram, 1, 1.0, -100.5, 0, Provenance::Real).is_err()
        );
    }

    #[test]
    fn test_brand_deal_validation() {
        let err = BrandDealMetric::new(
            "Acme",
            1000.0,
            date(2024, 6, 1),
            date(2024, 5, 1),
            2.0,
            1.0,
            Provenance::Real,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::InvertedDates { .. }));

        let err = BrandDealMetric::new(
            " ",
            1000.0,
            date(2024, 5, 1),
            date(2024, 6, 1),
            2.0,
            1.0,
            Provenance::Real,
        )
        .unwrap_err();
        assert_eq!(err, RecordError::EmptyBrand);
    }

    #[test]
    fn test_brand_deals_provenance() {
        let real = BrandDealMetric::new(
            "Acme",
            1000.0,
            date(2024, 5, 1),
            date(2024, 6, 1),
            2.0,
            1.0,
            Provenance::Real,
        )
        .unwrap();
        let mut synthetic = real.clone();
        synthetic.provenance = Provenance::Synthetic;

        assert!(!MetricRecord::BrandDeals(vec![real.clone()]).is_synthetic());
        assert!(MetricRecord::BrandDeals(vec![real, synthetic]).is_synthetic());
    }

    #[test]
    fn test_snapshot_assembly_and_summary() {
        let records = vec![
            MetricRecord::Social(
                SocialMetric::new(PlatformId::Twitter, 1000, 4.0, 1.0, 10, Provenance::Real)
                    .unwrap(),
            ),
            MetricRecord::Social(
                SocialMetric::new(PlatformId::TikTok, 500, 2.0, 1.0, 10, Provenance::Synthetic)
                    .unwrap(),
            ),
            MetricRecord::Streaming(
                StreamingMetric::new(
                    PlatformId::Spotify,
                    200,
                    3000,
                    0.0,
                    180.0,
                    50,
                    Provenance::Real,
                )
                .unwrap(),
            ),
            MetricRecord::BrandDeals(vec![
                BrandDealMetric::new(
                    "Acme",
                    1500.0,
                    date(2024, 5, 1),
                    date(2024, 6, 1),
                    2.0,
                    1.0,
                    Provenance::Synthetic,
                )
                .unwrap(),
                BrandDealMetric::new(
                    "Globex",
                    500.0,
                    date(2024, 5, 1),
                    date(2024, 7, 1),
                    3.0,
                    1.5,
                    Provenance::Synthetic,
                )
                .unwrap(),
            ]),
        ];

        let snapshot = CreatorMetricsSnapshot::assemble("42", records);
        assert_eq!(snapshot.creator_id, "42");
        assert_eq!(snapshot.social.len(), 2);
        assert_eq!(snapshot.streaming.len(), 1);
        assert_eq!(snapshot.brand_deals.len(), 2);
        assert_eq!(snapshot.record_count(), 5);

        let summary = snapshot.summary();
        assert_eq!(summary.total_followers, 1500);
        assert_eq!(summary.total_listeners, 200);
        assert_eq!(summary.total_streams, 3000);
        assert_eq!(summary.total_deal_value_usd, 2000.0);
        assert_eq!(summary.avg_engagement_rate, 3.0);
        assert_eq!(summary.real_records, 2);
        assert_eq!(summary.synthetic_records, 3);
        assert!(!summary.fully_synthetic());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = CreatorMetricsSnapshot::assemble(
            "7",
            vec![MetricRecord::Streaming(
                StreamingMetric::new(
                    PlatformId::YouTube,
                    1,
                    2,
                    0.5,
                    300.0,
                    10,
                    Provenance::Synthetic,
                )
                .unwrap(),
            )],
        );
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["creatorId"], "7");
        assert_eq!(json["streaming"][0]["avgStreamSeconds"], 300.0);
        assert_eq!(json["streaming"][0]["platform"], "youtube");
        assert_eq!(json["streaming"][0]["provenance"], "synthetic");
        assert!(json["brandDeals"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_streaming_json_carries_synthetic_flag() {
        let metric =
            StreamingMetric::new(PlatformId::Spotify, 10, 20, 1.0, 180.0, 40, Provenance::Real)
                .unwrap();
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["isSynthetic"], false);
        assert_eq!(json["provenance"], "real");

        let synthetic = StreamingMetric {
            provenance: Provenance::Synthetic,
            ..metric
        };
        let json = serde_json::to_value(&synthetic).unwrap();
        assert_eq!(json["isSynthetic"], true);

        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for key in [
            "platform",
            "listeners",
            "streams",
            "growthPct",
            "avgStreamSeconds",
            "popularity",
            "isSynthetic",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }

        let back: StreamingMetric = serde_json::from_value(json).unwrap();
        assert_eq!(back, synthetic);
    }

    #[test]
    fn test_summary_totals_saturate() {
        let records = vec![
            MetricRecord::Social(
                SocialMetric::new(PlatformId::Twitter, u64::MAX, 1.0, 0.0, 1, Provenance::Real)
                    .unwrap(),
            ),
            MetricRecord::Social(
                SocialMetric::new(PlatformId::TikTok, 1, 1.0, 0.0, 1, Provenance::Real).unwrap(),
            ),
            MetricRecord::Streaming(
                StreamingMetric::new(
                    PlatformId::Spotify,
                    u64::MAX,
                    u64::MAX,
                    0.0,
                    0.0,
                    0,
                    Provenance::Real,
                )
                .unwrap(),
            ),
            MetricRecord::Streaming(
                StreamingMetric::new(PlatformId::YouTube, 5, 5, 0.0, 0.0, 0, Provenance::Real)
                    .unwrap(),
            ),
        ];

        let summary = CreatorMetricsSnapshot::assemble("big", records).summary();
        assert_eq!(summary.total_followers, u64::MAX);
        assert_eq!(summary.total_listeners, u64::MAX);
        assert_eq!(summary.total_streams, u64::MAX);
    }
}
