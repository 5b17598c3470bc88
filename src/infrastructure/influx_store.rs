// InfluxQL-backed reading store over the HTTP query API
use crate::application::reading_store::{ReadingStore, ScanFilter};
use crate::domain::reading::RawReading;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// A [`ReadingStore`] backed by an InfluxDB historian measurement.
///
/// One series per tag (`GROUP BY "tag_name"`), with `value` and `quality`
/// as fields. A row with a JSON-null `value` column is an explicit
/// no-value reading; a missing `time` or `quality` column is a malformed
/// store and a hard error.
#[derive(Debug, Clone)]
pub struct InfluxStore {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    tags: Option<HashMap<String, String>>,
}

impl InfluxStore {
    pub fn new(
        host: String,
        token: String,
        database: String,
        retention_policy: String,
        measurement: String,
    ) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            measurement,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    fn scan_query(&self, filter: &ScanFilter) -> String {
        let mut clauses = vec![
            format!(
                "time > '{}'",
                filter.after.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
            format!(
                "time < '{}'",
                filter.before.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
        ];
        if let Some(tags) = &filter.tags {
            let alternatives: Vec<String> = tags
                .iter()
                .map(|t| format!("\"tag_name\" = '{}'", t))
                .collect();
            clauses.push(format!("({})", alternatives.join(" OR ")));
        }
        if let Some(qualities) = &filter.qualities {
            let alternatives: Vec<String> = qualities
                .iter()
                .map(|q| format!("\"quality\" = {}", q))
                .collect();
            clauses.push(format!("({})", alternatives.join(" OR ")));
        }
        format!(
            "SELECT value, quality FROM {} WHERE {} GROUP BY \"tag_name\"",
            self.measurement,
            clauses.join(" AND ")
        )
    }

    /// Decode scan series into readings. Every series must carry its tag
    /// and the `time`/`quality` columns; value-less rows decode to `None`.
    fn readings_from_response(response: InfluxQLResponse) -> Result<Vec<RawReading>> {
        let mut readings = Vec::new();
        let Some(result) = response.results.into_iter().next() else {
            return Ok(readings);
        };

        for series in result.series.unwrap_or_default() {
            let tag_name = series
                .tags
                .as_ref()
                .and_then(|t| t.get("tag_name"))
                .context("scan series is missing the tag_name tag")?
                .clone();
            let time_idx = series
                .columns
                .iter()
                .position(|c| c == "time")
                .context("scan series is missing the time column")?;
            let value_idx = series
                .columns
                .iter()
                .position(|c| c == "value")
                .context("scan series is missing the value column")?;
            let quality_idx = series
                .columns
                .iter()
                .position(|c| c == "quality")
                .context("scan series is missing the quality column")?;

            for row in &series.values {
                let time_str = row
                    .get(time_idx)
                    .and_then(|v| v.as_str())
                    .with_context(|| format!("malformed time in series for {}", tag_name))?;
                let ts = DateTime::parse_from_rfc3339(time_str)
                    .with_context(|| format!("unparseable timestamp {}", time_str))?
                    .with_timezone(&Utc);
                let quality = row
                    .get(quality_idx)
                    .and_then(|v| v.as_i64())
                    .with_context(|| format!("malformed quality in series for {}", tag_name))?
                    as i32;
                let value = match row.get(value_idx) {
                    Some(v) if v.is_null() => None,
                    Some(v) => Some(
                        v.as_f64()
                            .with_context(|| format!("non-numeric value in series for {}", tag_name))?,
                    ),
                    None => None,
                };
                readings.push(RawReading::new(tag_name.clone(), ts, quality, value));
            }
        }

        Ok(readings)
    }
}

#[async_trait]
impl ReadingStore for InfluxStore {
    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<RawReading>> {
        let query = self.scan_query(filter);
        tracing::debug!("Executing reading scan: {}", query);
        let response = self.execute_query(&query).await?;
        Self::readings_from_response(response)
    }

    async fn latest_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        let query = format!(
            "SELECT value, quality FROM {} ORDER BY time DESC LIMIT 1",
            self.measurement
        );
        let response = self.execute_query(&query).await?;

        let Some(result) = response.results.into_iter().next() else {
            return Ok(None);
        };
        let Some(series) = result.series.and_then(|s| s.into_iter().next()) else {
            return Ok(None);
        };
        let time_idx = series
            .columns
            .iter()
            .position(|c| c == "time")
            .context("latest-timestamp series is missing the time column")?;
        let Some(row) = series.values.first() else {
            return Ok(None);
        };
        let time_str = row
            .get(time_idx)
            .and_then(|v| v.as_str())
            .context("malformed time in latest-timestamp row")?;
        let ts = DateTime::parse_from_rfc3339(time_str)
            .with_context(|| format!("unparseable timestamp {}", time_str))?
            .with_timezone(&Utc);
        Ok(Some(ts))
    }
}
