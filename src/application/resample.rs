// Grid generation, window extraction, and bounded forward-fill
//
// Everything here is a pure function over owned rows and slices. Each
// tag's candidate set and grid are independent read-only inputs, so
// callers may fan tags out across workers without locking; within one
// tag the fill cursor advances monotonically and must stay sequential.
use crate::domain::reading::{RawReading, ResampledPoint};
use chrono::{DateTime, Duration, Utc};

/// Target instants `start + k*freq` for `k = 0, 1, ...` while `< end`.
///
/// Finite, with exactly `floor((end - start) / freq)` elements, and a pure
/// function of its inputs: callers can regenerate the grid at will instead
/// of holding a cursor. Callers guarantee `freq > 0`; the spec constructor
/// enforces it.
pub fn sample_grid(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    freq: Duration,
) -> Vec<DateTime<Utc>> {
    debug_assert!(freq > Duration::zero());
    let mut grid = Vec::new();
    let mut t = start;
    while t < end {
        grid.push(t);
        t += freq;
    }
    grid
}

/// Keep readings with `start - lookback < ts < end`, both bounds strictly
/// exclusive.
///
/// `lookback` equals the forward-fill timeout: a reading exactly at
/// `start - lookback` would already be stale at the first grid point, and
/// anything older can never fill any point in `[start, end)`.
pub fn extract_window(
    readings: Vec<RawReading>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    lookback: Duration,
) -> Vec<RawReading> {
    let floor = start - lookback;
    readings
        .into_iter()
        .filter(|r| r.ts > floor && r.ts < end)
        .collect()
}

/// Last-observation-carried-forward for one tag.
///
/// `candidates` must already be quality-filtered, windowed, and, when the
/// query ignores nulls, stripped of no-value readings. They need not be
/// sorted: the sort here is stable, so readings sharing a timestamp keep
/// input order and the cursor settles on the last of them (latest in
/// input order wins the tie).
///
/// For each grid instant `t`, the cursor advances over candidates with
/// `ts <= t` and the newest one fills `t` while strictly fresher than
/// `ff_timeout`. A staleness of exactly `ff_timeout` is already stale.
/// Both sequences are ascending, so the whole scan is O(n + m).
pub fn forward_fill(
    tag_name: &str,
    mut candidates: Vec<RawReading>,
    grid: &[DateTime<Utc>],
    ff_timeout: Duration,
) -> Vec<ResampledPoint> {
    candidates.sort_by_key(|r| r.ts);

    let mut out = Vec::with_capacity(grid.len());
    let mut cursor = 0;
    let mut last: Option<usize> = None;
    for &t in grid {
        while cursor < candidates.len() && candidates[cursor].ts <= t {
            last = Some(cursor);
            cursor += 1;
        }
        let value = last.and_then(|i| {
            let r = &candidates[i];
            if t - r.ts < ff_timeout { r.value } else { None }
        });
        out.push(ResampledPoint::new(tag_name.to_string(), t, value));
    }
    out
}

/// Advisory diagnostic about the sampling ratio for one tag: flags grids
/// much denser (upsampling) or much sparser (downsampling) than the
/// observed readings. Log-only, never an error.
pub(crate) fn log_resample_ratio(tag_name: &str, candidates: usize, grid_len: usize) {
    if candidates == 0 || grid_len == 0 {
        return;
    }
    let ratio = grid_len as f64 / candidates as f64;
    if ratio >= 2.0 {
        tracing::warn!(
            "upsampling {}: {} grid points from {} readings",
            tag_name,
            grid_len,
            candidates
        );
    } else if ratio <= 0.5 {
        tracing::warn!(
            "downsampling {}: {} grid points from {} readings",
            tag_name,
            grid_len,
            candidates
        );
    }
}
