//! Brand-deal intelligence.
//!
//! No real source is integrated yet. The transform accepts a `deals` array in
//! the canonical shape so a source can be wired in without touching callers.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::synth;
use super::{MetricsAdapter, OutboundRequest, base_url_or};
use crate::error::TransformError;
use crate::platform::PlatformId;
use crate::record::{BrandDealMetric, MetricRecord, Provenance};

const DEFAULT_BASE_URL: &str = "https://api.brandintel.io";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeal {
    brand: String,
    #[serde(rename = "dealValueUSD")]
    deal_value_usd: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    engagement_rate: f64,
    #[serde(default)]
    conversion_rate: f64,
}

#[derive(Debug, Clone)]
pub struct BrandDealAdapter {
    base_url: String,
}

impl Default for BrandDealAdapter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl BrandDealAdapter {
    pub fn new(base_url: Option<&str>) -> Self {
        Self {
            base_url: base_url_or(base_url, DEFAULT_BASE_URL),
        }
    }
}

impl MetricsAdapter for BrandDealAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::BrandIntel
    }

    fn build_request(&self, identity: &str) -> Option<OutboundRequest> {
        Some(OutboundRequest::get(
            format!("{}/v1/creators/{identity}/deals", self.base_url),
            "deals",
        ))
    }

    fn transform(&self, raw: &Value) -> Result<MetricRecord, TransformError> {
        let deals = raw
            .get("deals")
            .ok_or(TransformError::MissingField("deals"))?;
        let deals: Vec<RawDeal> = serde_json::from_value(deals.clone())?;

        let deals = deals
            .into_iter()
            .map(|d| {
                BrandDealMetric::new(
                    d.brand,
                    d.deal_value_usd,
                    d.start_date,
                    d.end_date,
                    d.engagement_rate,
                    d.conversion_rate,
                    Provenance::Real,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MetricRecord::BrandDeals(deals))
    }

    fn synthesize(&self, seed: &str) -> MetricRecord {
        MetricRecord::BrandDeals(synth::brand_deals(seed, Utc::now().date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pass_through_transform() {
        let adapter = BrandDealAdapter::default();
        let record = adapter
            .transform(&json!({
                "deals": [{
                    "brand": "Acme",
                    "dealValueUSD": 12500.5,
                    "startDate": "2024-01-01",
                    "endDate": "2024-03-31",
                    "engagementRate": 4.2,
                    "conversionRate": 1.1
                }]
            }))
            .unwrap();

        let MetricRecord::BrandDeals(deals) = record else {
            panic!("expected brand deals");
        };
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].brand, "Acme");
        assert_eq!(deals[0].deal_value_usd, 12500.5);
        assert_eq!(deals[0].provenance, Provenance::Real);
    }

    #[test]
    fn test_transform_rejects_bad_deals() {
        let adapter = BrandDealAdapter::default();
        assert!(matches!(
            adapter.transform(&json!({})),
            Err(TransformError::MissingField("deals"))
        ));
        assert!(matches!(
            adapter.transform(&json!({"deals": [{"brand": "Acme"}]})),
            Err(TransformError::Json(_))
        ));
        assert!(matches!(
            adapter.transform(&json!({
                "deals": [{
                    "brand": "Acme",
                    "dealValueUSD": -1.0,
                    "startDate": "2024-01-01",
                    "endDate": "2024-03-31"
                }]
            })),
            Err(TransformError::Record(_))
        ));
    }

    #[test]
    fn test_synthesize_between_one_and_five_deals() {
        let adapter = BrandDealAdapter::default();
        let MetricRecord::BrandDeals(deals) = adapter.synthesize("creator_42") else {
            panic!("expected brand deals");
        };
        assert!((1..=5).contains(&deals.len()));
        assert!(deals.iter().all(|d| d.provenance.is_synthetic()));
    }

    #[test]
    fn test_request_url() {
        let request = BrandDealAdapter::new(Some("http://localhost:8080"))
            .build_request("creator_42")
            .unwrap();
        assert_eq!(request.url, "http://localhost:8080/v1/creators/creator_42/deals");
        assert_eq!(request.resource, "deals");
    }
}
