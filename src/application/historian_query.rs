// Historian query orchestration - regularized series from raw readings
use crate::application::error::QueryError;
use crate::application::reading_store::{ReadingStore, ScanFilter};
use crate::application::resample;
use crate::domain::quality::{self, QualityPolicy};
use crate::domain::reading::{RawReading, ResampledPoint};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Validated, immutable parameters for one query session.
///
/// `ff_timeout` doubles as the lookback: raw readings up to that far
/// before a query's start still participate in forward-fill. `tags` of
/// `None` means every tag present in the store's window.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub sample_freq: Duration,
    pub ff_timeout: Duration,
    pub keep_quality: QualityPolicy,
    pub ignore_nulls: bool,
    pub tags: Option<Vec<String>>,
}

impl QuerySpec {
    /// Builds a spec, validating eagerly: non-positive durations and an
    /// empty quality set are configuration errors, not per-call failures.
    pub fn new(
        sample_freq: Duration,
        ff_timeout: Duration,
        keep_quality: QualityPolicy,
        ignore_nulls: bool,
    ) -> Result<Self, QueryError> {
        if sample_freq <= Duration::zero() {
            return Err(QueryError::InvalidConfig(
                "sample_freq must be positive".to_string(),
            ));
        }
        if ff_timeout <= Duration::zero() {
            return Err(QueryError::InvalidConfig(
                "ff_timeout must be positive".to_string(),
            ));
        }
        if let QualityPolicy::AnyOf(codes) = &keep_quality {
            if codes.is_empty() {
                return Err(QueryError::InvalidConfig(
                    "keep_quality set must not be empty".to_string(),
                ));
            }
        }
        Ok(Self {
            sample_freq,
            ff_timeout,
            keep_quality,
            ignore_nulls,
            tags: None,
        })
    }

    /// Restrict the query to an explicit tag set.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// Query facade over a raw reading store.
///
/// Construction takes the store handle and a validated [`QuerySpec`];
/// every operation is a one-shot, side-effect-free computation over a
/// bounded window, so calls may be retried freely. Tags are independent
/// partitions: the per-tag fill work shares no mutable state and could be
/// fanned out across workers, it runs sequentially here in sorted tag
/// order.
pub struct HistorianQuery {
    store: Arc<dyn ReadingStore>,
    spec: QuerySpec,
}

impl HistorianQuery {
    pub fn new(store: Arc<dyn ReadingStore>, spec: QuerySpec) -> Self {
        Self { store, spec }
    }

    /// Quality-filtered raw readings in the lookback-extended window
    /// `(start - ff_timeout, end)`, exclusive on both sides.
    ///
    /// Rows are grouped per tag in scan order; no cross-tag ordering is
    /// guaranteed.
    pub async fn get_raw_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawReading>, QueryError> {
        self.check_range(start, end)?;

        let filter = ScanFilter {
            tags: self.spec.tags.clone(),
            qualities: self.spec.keep_quality.codes(),
            after: start - self.spec.ff_timeout,
            before: end,
        };
        let rows = self.store.scan(&filter).await?;

        // The scan pushdown may be loose; re-apply the exact predicates.
        let rows = quality::filter_readings(rows, &self.spec.keep_quality);
        let rows = resample::extract_window(rows, start, end, self.spec.ff_timeout);
        tracing::debug!(
            "raw query kept {} readings in ({}, {})",
            rows.len(),
            start - self.spec.ff_timeout,
            end
        );
        Ok(rows)
    }

    /// One row per (tag, grid instant) for the grid `start + k*sample_freq`
    /// while `< end`, filled by bounded last-observation-carried-forward.
    /// Output is ordered by tag, then timestamp.
    pub async fn resample(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ResampledPoint>, QueryError> {
        self.check_range(start, end)?;

        let raw = self.get_raw_data(start, end).await?;
        let grid = resample::sample_grid(start, end, self.spec.sample_freq);

        let mut by_tag: BTreeMap<String, Vec<RawReading>> = BTreeMap::new();
        for reading in raw {
            by_tag
                .entry(reading.tag_name.clone())
                .or_default()
                .push(reading);
        }

        let mut out = Vec::with_capacity(by_tag.len() * grid.len());
        for (tag_name, readings) in by_tag {
            let candidates: Vec<RawReading> = if self.spec.ignore_nulls {
                // No-value readings become invisible: the previous
                // value-bearing reading is the fill source.
                readings.into_iter().filter(|r| r.value.is_some()).collect()
            } else {
                readings
            };
            resample::log_resample_ratio(&tag_name, candidates.len(), grid.len());
            out.extend(resample::forward_fill(
                &tag_name,
                candidates,
                &grid,
                self.spec.ff_timeout,
            ));
        }
        Ok(out)
    }

    /// Maximum timestamp across the whole store, as canonical text
    /// (`%Y-%m-%d %H:%M:%S%.f`, UTC) for stable string comparison.
    ///
    /// Ignores the quality policy, null policy, tag set, and any window.
    pub async fn get_latest_ts(&self) -> Result<String, QueryError> {
        let latest = self
            .store
            .latest_timestamp()
            .await?
            .ok_or(QueryError::EmptyStore)?;
        Ok(latest.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }

    fn check_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), QueryError> {
        if start >= end {
            return Err(QueryError::InvalidRange { start, end });
        }
        Ok(())
    }
}
