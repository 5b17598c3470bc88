// Store port for raw historian readings
use crate::domain::reading::RawReading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Predicate pushdown for a reading scan.
///
/// Both time bounds are exclusive. `tags` and `qualities` of `None` mean
/// no filter on that axis. Stores may evaluate the predicates loosely
/// (for example with inclusive bounds); the query layer re-applies them
/// exactly in-process, so returning a superset is acceptable, dropping
/// matching rows is not.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    pub tags: Option<Vec<String>>,
    pub qualities: Option<Vec<i32>>,
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl ScanFilter {
    /// Exact evaluation of the scan predicates against one reading.
    pub fn matches(&self, reading: &RawReading) -> bool {
        if let Some(tags) = &self.tags {
            if !tags.contains(&reading.tag_name) {
                return false;
            }
        }
        if let Some(qualities) = &self.qualities {
            if !qualities.contains(&reading.quality) {
                return false;
            }
        }
        reading.ts > self.after && reading.ts < self.before
    }
}

/// Read-only access to the raw historian store.
///
/// The store is the only source of I/O in the crate. Implementations are
/// expected to support a predicate-based scan and a global max-timestamp
/// aggregate; everything else (grid generation, forward-fill) happens
/// in-process.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Scan readings matching the filter. No ordering is guaranteed.
    async fn scan(&self, filter: &ScanFilter) -> anyhow::Result<Vec<RawReading>>;

    /// Maximum timestamp across the entire store, ignoring quality, value
    /// presence, tag, and any query window. `None` when the store is empty.
    async fn latest_timestamp(&self) -> anyhow::Result<Option<DateTime<Utc>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 12, min, sec).unwrap()
    }

    fn filter() -> ScanFilter {
        ScanFilter {
            tags: Some(vec!["belt_speed".to_string()]),
            qualities: Some(vec![3]),
            after: at(0, 0),
            before: at(5, 0),
        }
    }

    #[test]
    fn test_matches_requires_all_predicates() {
        let ok = RawReading::new("belt_speed".to_string(), at(1, 0), 3, Some(0.5));
        assert!(filter().matches(&ok));

        let wrong_tag = RawReading::new("Power_kW".to_string(), at(1, 0), 3, Some(0.5));
        assert!(!filter().matches(&wrong_tag));

        let wrong_quality = RawReading::new("belt_speed".to_string(), at(1, 0), 1, Some(0.5));
        assert!(!filter().matches(&wrong_quality));
    }

    #[test]
    fn test_time_bounds_are_exclusive() {
        let f = filter();
        let at_start = RawReading::new("belt_speed".to_string(), at(0, 0), 3, None);
        let at_end = RawReading::new("belt_speed".to_string(), at(5, 0), 3, None);
        let inside = RawReading::new("belt_speed".to_string(), at(0, 1), 3, None);
        assert!(!f.matches(&at_start));
        assert!(!f.matches(&at_end));
        assert!(f.matches(&inside));
    }

    #[test]
    fn test_unset_axes_do_not_filter() {
        let f = ScanFilter {
            tags: None,
            qualities: None,
            after: at(0, 0),
            before: at(5, 0),
        };
        let r = RawReading::new("anything".to_string(), at(2, 30), 99, None);
        assert!(f.matches(&r));
    }
}
