// Historian reading domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single raw observation from the historian.
///
/// `value` may be `None` even when the quality code is good: historians
/// record explicit no-value observations, and those are distinct from
/// readings removed by quality filtering. Readings for a tag are not
/// assumed to arrive in timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub tag_name: String,
    pub ts: DateTime<Utc>,
    pub quality: i32,
    pub value: Option<f64>,
}

impl RawReading {
    pub fn new(tag_name: String, ts: DateTime<Utc>, quality: i32, value: Option<f64>) -> Self {
        Self {
            tag_name,
            ts,
            quality,
            value,
        }
    }
}

/// One output row of a resample: the state of `tag_name` at grid instant
/// `ts`. `value` is `None` when no sufficiently fresh reading exists, or
/// when the freshest reading is an explicit no-value observation and the
/// query does not ignore nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledPoint {
    pub tag_name: String,
    pub ts: DateTime<Utc>,
    pub value: Option<f64>,
}

impl ResampledPoint {
    pub fn new(tag_name: String, ts: DateTime<Utc>, value: Option<f64>) -> Self {
        Self {
            tag_name,
            ts,
            value,
        }
    }
}
