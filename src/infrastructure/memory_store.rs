// In-memory reading store for bounded batch datasets
use crate::application::reading_store::{ReadingStore, ScanFilter};
use crate::domain::reading::RawReading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A [`ReadingStore`] over a plain vector of readings.
///
/// The batch adapter: load a bounded dataset once, then run any number of
/// queries against it. Scans evaluate the filter predicates exactly, so
/// the query layer's re-check is a no-op here.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    readings: Vec<RawReading>,
}

impl MemoryStore {
    pub fn new(readings: Vec<RawReading>) -> Self {
        Self { readings }
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn scan(&self, filter: &ScanFilter) -> anyhow::Result<Vec<RawReading>> {
        Ok(self
            .readings
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn latest_timestamp(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        Ok(self.readings.iter().map(|r| r.ts).max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 12, min, 0).unwrap()
    }

    #[tokio::test]
    async fn test_scan_applies_filter() {
        let store = MemoryStore::new(vec![
            RawReading::new("a".to_string(), at(1), 3, Some(1.0)),
            RawReading::new("a".to_string(), at(2), 1, Some(2.0)),
            RawReading::new("b".to_string(), at(3), 3, None),
        ]);
        let filter = ScanFilter {
            tags: Some(vec!["a".to_string()]),
            qualities: Some(vec![3]),
            after: at(0),
            before: at(5),
        };
        let rows = store.scan(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, Some(1.0));
    }

    #[tokio::test]
    async fn test_latest_timestamp_over_all_readings() {
        let store = MemoryStore::new(vec![
            RawReading::new("a".to_string(), at(4), 1, None),
            RawReading::new("b".to_string(), at(2), 3, Some(2.0)),
        ]);
        assert_eq!(store.latest_timestamp().await.unwrap(), Some(at(4)));
        assert_eq!(
            MemoryStore::default().latest_timestamp().await.unwrap(),
            None
        );
    }
}
