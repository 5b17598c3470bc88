use crate::application::error::QueryError;
use crate::application::historian_query::QuerySpec;
use crate::domain::quality::QualityPolicy;
use chrono::Duration;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct HistorianConfig {
    pub query: QuerySettings,
    #[serde(default)]
    pub influx: Option<InfluxSettings>,
}

/// Query parameters as written in the configuration file. Durations are
/// humanized strings ("5 seconds", "1 minute"); `keep_quality` accepts a
/// single code or a list and defaults to no filtering.
#[derive(Debug, Deserialize, Clone)]
pub struct QuerySettings {
    pub sample_freq: String,
    pub ff_timeout: String,
    #[serde(default)]
    pub keep_quality: Option<KeepQualitySetting>,
    #[serde(default)]
    pub ignore_nulls: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum KeepQualitySetting {
    Single(i32),
    Set(Vec<i32>),
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    pub measurement: String,
}

pub fn load_config() -> anyhow::Result<HistorianConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/historian"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

impl QuerySettings {
    /// Convert file settings into a validated [`QuerySpec`]. Any problem
    /// here is a configuration error and fails the whole session.
    pub fn to_spec(&self) -> Result<QuerySpec, QueryError> {
        let sample_freq = parse_duration(&self.sample_freq)?;
        let ff_timeout = parse_duration(&self.ff_timeout)?;
        let keep_quality = match &self.keep_quality {
            None => QualityPolicy::Any,
            Some(KeepQualitySetting::Single(code)) => QualityPolicy::Only(*code),
            Some(KeepQualitySetting::Set(codes)) => QualityPolicy::AnyOf(codes.clone()),
        };

        let spec = QuerySpec::new(sample_freq, ff_timeout, keep_quality, self.ignore_nulls)?;
        Ok(match &self.tags {
            Some(tags) => spec.with_tags(tags.clone()),
            None => spec,
        })
    }
}

/// Parse a humanized duration like "5 seconds", "1 minute" or "2 hours".
pub fn parse_duration(text: &str) -> Result<Duration, QueryError> {
    let invalid = || QueryError::InvalidConfig(format!("unparseable duration: {:?}", text));

    let mut parts = text.split_whitespace();
    let count: i64 = parts
        .next()
        .and_then(|c| c.parse().ok())
        .ok_or_else(invalid)?;
    let unit = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    match unit {
        "millisecond" | "milliseconds" | "ms" => Ok(Duration::milliseconds(count)),
        "second" | "seconds" | "sec" | "s" => Ok(Duration::seconds(count)),
        "minute" | "minutes" | "min" | "m" => Ok(Duration::minutes(count)),
        "hour" | "hours" | "h" => Ok(Duration::hours(count)),
        "day" | "days" | "d" => Ok(Duration::days(count)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("5 seconds").unwrap(), Duration::seconds(5));
        assert_eq!(parse_duration("1 minute").unwrap(), Duration::minutes(1));
        assert_eq!(parse_duration("2 hours").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("10 min").unwrap(), Duration::minutes(10));
        assert_eq!(parse_duration("250 ms").unwrap(), Duration::milliseconds(250));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("five minutes").is_err());
        assert!(parse_duration("5 fortnights").is_err());
        assert!(parse_duration("5 minutes ago").is_err());
        assert!(parse_duration("5").is_err());
    }

    #[test]
    fn test_to_spec_maps_quality_settings() {
        let settings = QuerySettings {
            sample_freq: "1 minute".to_string(),
            ff_timeout: "5 minutes".to_string(),
            keep_quality: Some(KeepQualitySetting::Single(3)),
            ignore_nulls: true,
            tags: Some(vec!["Power_kW".to_string()]),
        };
        let spec = settings.to_spec().unwrap();
        assert_eq!(spec.sample_freq, Duration::minutes(1));
        assert_eq!(spec.ff_timeout, Duration::minutes(5));
        assert_eq!(spec.keep_quality, QualityPolicy::Only(3));
        assert!(spec.ignore_nulls);
        assert_eq!(spec.tags, Some(vec!["Power_kW".to_string()]));
    }

    #[test]
    fn test_to_spec_defaults_to_no_quality_filter() {
        let settings = QuerySettings {
            sample_freq: "5 seconds".to_string(),
            ff_timeout: "1 minute".to_string(),
            keep_quality: None,
            ignore_nulls: false,
            tags: None,
        };
        let spec = settings.to_spec().unwrap();
        assert_eq!(spec.keep_quality, QualityPolicy::Any);
        assert_eq!(spec.tags, None);
    }

    #[test]
    fn test_to_spec_surfaces_bad_durations_eagerly() {
        let settings = QuerySettings {
            sample_freq: "0 seconds".to_string(),
            ff_timeout: "5 minutes".to_string(),
            keep_quality: None,
            ignore_nulls: false,
            tags: None,
        };
        assert!(matches!(
            settings.to_spec(),
            Err(QueryError::InvalidConfig(_))
        ));
    }
}
