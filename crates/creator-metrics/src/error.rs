use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

use crate::platform::PlatformId;

/// Errors surfaced by adapters and the aggregator.
///
/// None of these reach a snapshot consumer: a failing adapter call is dropped
/// from the snapshot and logged instead.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("invalid creator id `{0}`")]
    InvalidCreatorId(String),

    #[error("invalid {platform} identity `{identity}`: {reason}")]
    InvalidIdentity {
        platform: PlatformId,
        identity: String,
        reason: String,
    },

    #[error("{platform} adapter failed: {reason}")]
    Adapter { platform: PlatformId, reason: String },

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// A provider payload could not be mapped onto a canonical record.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has an invalid value: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unexpected payload: {0}")]
    UnexpectedShape(String),

    #[error("invalid record: {0}")]
    Record(#[from] RecordError),
}

/// A record violates its documented domain ranges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("`{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("`{field}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("deal ends on {end} before it starts on {start}")]
    InvertedDates { start: NaiveDate, end: NaiveDate },

    #[error("brand name is empty")]
    EmptyBrand,
}

/// Failure of a single network attempt.
#[derive(Debug, Error)]
pub enum FetchFault {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchFault {
    /// Transport and transform faults are worth another attempt; a request that
    /// cannot even be built will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for FetchFault {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::HttpStatus {
                status,
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => Self::Network(err.to_string()),
        }
    }
}
