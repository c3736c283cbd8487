use serde_json::Value;

use crate::error::TransformError;

/// Read an unsigned count at a JSON pointer.
///
/// Providers disagree on whether counts are numbers or numeric strings, so
/// both are accepted. Floats are truncated.
#[inline]
pub fn get_u64(raw: &Value, pointer: &str) -> Option<u64> {
    raw.pointer(pointer).and_then(|v| {
        if let Some(n) = v.as_u64() {
            Some(n)
        } else if let Some(f) = v.as_f64() {
            (f.is_finite() && f >= 0.0).then_some(f as u64)
        } else if let Some(s) = v.as_str() {
            s.trim().parse::<u64>().ok()
        } else {
            None
        }
    })
}

#[inline]
pub fn get_f64(raw: &Value, pointer: &str) -> Option<f64> {
    raw.pointer(pointer).and_then(|v| {
        if let Some(n) = v.as_f64() {
            Some(n)
        } else if let Some(s) = v.as_str() {
            s.trim().parse::<f64>().ok()
        } else {
            None
        }
    })
    .filter(|f| f.is_finite())
}

#[inline]
pub fn get_str<'a>(raw: &'a Value, pointer: &str) -> Option<&'a str> {
    raw.pointer(pointer).and_then(Value::as_str)
}

pub fn require_u64(raw: &Value, pointer: &str, field: &'static str) -> Result<u64, TransformError> {
    match raw.pointer(pointer) {
        None | Some(Value::Null) => Err(TransformError::MissingField(field)),
        Some(_) => get_u64(raw, pointer).ok_or_else(|| TransformError::InvalidField {
            field,
            reason: "expected a non-negative integer".to_string(),
        }),
    }
}

pub fn require_f64(raw: &Value, pointer: &str, field: &'static str) -> Result<f64, TransformError> {
    match raw.pointer(pointer) {
        None | Some(Value::Null) => Err(TransformError::MissingField(field)),
        Some(_) => get_f64(raw, pointer).ok_or_else(|| TransformError::InvalidField {
            field,
            reason: "expected a finite number".to_string(),
        }),
    }
}

/// Interactions per post as a share of the audience, in percent.
///
/// Clamped to [0, 100]; zero when there is no audience.
pub fn engagement_proxy(interactions: u64, posts: u64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    let per_post = interactions as f64 / posts.max(1) as f64;
    round2((per_post / followers as f64 * 100.0).clamp(0.0, 100.0))
}

/// Log-scaled popularity score for sources that do not report one.
///
/// 10^8 listeners maps to 100.
pub fn derive_popularity(listeners: u64) -> u8 {
    let score = ((listeners as f64 + 1.0).log10() / 8.0 * 100.0).clamp(0.0, 100.0);
    score.round() as u8
}

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
