// Quality code policy - which readings a query trusts
use crate::domain::reading::RawReading;

/// Quality filtering specification for a query session.
///
/// Every historian reading carries an integer quality code. A query either
/// keeps everything (`Any`), a single code (`Only`), or a set of codes
/// (`AnyOf`).
#[derive(Debug, Clone, PartialEq)]
pub enum QualityPolicy {
    Any,
    Only(i32),
    AnyOf(Vec<i32>),
}

impl QualityPolicy {
    pub fn accepts(&self, quality: i32) -> bool {
        match self {
            QualityPolicy::Any => true,
            QualityPolicy::Only(code) => quality == *code,
            QualityPolicy::AnyOf(codes) => codes.contains(&quality),
        }
    }

    /// Codes to push down to a store scan, `None` meaning no filter.
    pub fn codes(&self) -> Option<Vec<i32>> {
        match self {
            QualityPolicy::Any => None,
            QualityPolicy::Only(code) => Some(vec![*code]),
            QualityPolicy::AnyOf(codes) => Some(codes.clone()),
        }
    }
}

/// Keep only readings the policy accepts. Order-preserving.
pub fn filter_readings(readings: Vec<RawReading>, policy: &QualityPolicy) -> Vec<RawReading> {
    match policy {
        QualityPolicy::Any => readings,
        _ => readings
            .into_iter()
            .filter(|r| policy.accepts(r.quality))
            .collect(),
    }
}
