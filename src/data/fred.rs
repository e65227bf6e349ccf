//! FRED integration for the federal funds series.
//!
//! Two endpoints are supported:
//! - the JSON observations API when `FRED_API_KEY` is available
//! - the public `fredgraph.csv` download otherwise

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::data::{RateSource, RawFetch};
use crate::domain::{
    RangeSeries, RateInputs, RawSeries, SERIES_EFFECTIVE, SERIES_TARGET, SERIES_TARGET_LOWER,
    SERIES_TARGET_UPPER,
};
use crate::error::FetchError;

const API_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const GRAPH_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";
const OBS_LIMIT: usize = 100_000;
const USER_AGENT: &str = concat!("fedfunds/", env!("CARGO_PKG_VERSION"));

/// Which FRED endpoint to query.
#[derive(Clone)]
pub enum FredEndpoint {
    Api { api_key: String },
    Graph,
}

impl std::fmt::Debug for FredEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FredEndpoint::Api { .. } => f.write_str("Api { api_key: <redacted> }"),
            FredEndpoint::Graph => f.write_str("Graph"),
        }
    }
}

pub struct FredClient {
    client: Client,
    endpoint: FredEndpoint,
}

impl FredClient {
    /// Use the JSON API when `FRED_API_KEY` is set (environment or `.env`),
    /// the public CSV download otherwise.
    pub fn from_env() -> Result<Self, FetchError> {
        dotenvy::dotenv().ok();
        let endpoint = match std::env::var("FRED_API_KEY") {
            Ok(key) if !key.trim().is_empty() => FredEndpoint::Api {
                api_key: key.trim().to_string(),
            },
            _ => FredEndpoint::Graph,
        };
        Self::new(endpoint)
    }

    pub fn new(endpoint: FredEndpoint) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Request {
                series: "*".to_string(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, endpoint })
    }

    /// Fetch the full history of one series, up to `end` when given.
    pub fn fetch_series(&self, series_id: &str, end: Option<NaiveDate>) -> Result<RawSeries, FetchError> {
        debug!(series = series_id, endpoint = ?self.endpoint, "requesting FRED series");
        let series = match &self.endpoint {
            FredEndpoint::Api { api_key } => {
                let body = self.get_api(series_id, api_key, end)?;
                let parsed: ObservationsResponse =
                    serde_json::from_str(&body).map_err(|e| FetchError::Parse {
                        series: series_id.to_string(),
                        message: e.to_string(),
                    })?;
                parse_observations(series_id, parsed)?
            }
            FredEndpoint::Graph => {
                let body = self.get_graph(series_id, end)?;
                parse_graph_csv(series_id, &body)?
            }
        };
        info!(series = series_id, observations = series.len(), "fetched FRED series");
        Ok(series)
    }

    fn get_api(&self, series_id: &str, api_key: &str, end: Option<NaiveDate>) -> Result<String, FetchError> {
        let mut req = self.client.get(API_URL).query(&[
            ("series_id", series_id),
            ("api_key", api_key),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("limit", OBS_LIMIT.to_string().as_str()),
        ]);
        if let Some(date) = end {
            req = req.query(&[("observation_end", &date.to_string())]);
        }
        send(series_id, req)
    }

    fn get_graph(&self, series_id: &str, end: Option<NaiveDate>) -> Result<String, FetchError> {
        let mut req = self.client.get(GRAPH_URL).query(&[("id", series_id)]);
        if let Some(date) = end {
            req = req.query(&[("coed", &date.to_string())]);
        }
        send(series_id, req)
    }
}

fn send(series_id: &str, req: reqwest::blocking::RequestBuilder) -> Result<String, FetchError> {
    let resp = req.send().map_err(|e| FetchError::Request {
        series: series_id.to_string(),
        message: e.to_string(),
    })?;

    if !resp.status().is_success() {
        return Err(FetchError::Status {
            series: series_id.to_string(),
            status: resp.status().as_u16(),
        });
    }

    resp.text().map_err(|e| FetchError::Request {
        series: series_id.to_string(),
        message: format!("failed to read response body: {e}"),
    })
}

impl RateSource for FredClient {
    fn fetch(&self, end: Option<NaiveDate>) -> Result<RawFetch, FetchError> {
        let effective = self.fetch_series(SERIES_EFFECTIVE, end)?;
        let target_point = self.fetch_series(SERIES_TARGET, end)?;
        let lower = self.fetch_series(SERIES_TARGET_LOWER, end)?;
        let upper = self.fetch_series(SERIES_TARGET_UPPER, end)?;

        Ok(RawFetch::new(RateInputs {
            effective,
            target_point,
            target_range: RangeSeries::from_bounds(&lower, &upper),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(series_id: &str, body: ObservationsResponse) -> Result<RawSeries, FetchError> {
    let mut out = Vec::with_capacity(body.observations.len());
    for obs in body.observations {
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        out.push((parse_date(series_id, &obs.date)?, value));
    }
    Ok(RawSeries::from_observations(series_id, out))
}

/// Parse a `fredgraph.csv` body: a header row then `date,value` rows.
fn parse_graph_csv(series_id: &str, body: &str) -> Result<RawSeries, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::Parse {
            series: series_id.to_string(),
            message: format!("failed to read CSV header: {e}"),
        })?
        .clone();
    if headers.len() < 2 {
        return Err(FetchError::Parse {
            series: series_id.to_string(),
            message: format!("expected date and value columns, got '{}'", headers.iter().collect::<Vec<_>>().join(",")),
        });
    }

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FetchError::Parse {
            series: series_id.to_string(),
            message: e.to_string(),
        })?;
        let (Some(date), Some(value)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let Some(value) = parse_value(value) else {
            continue;
        };
        out.push((parse_date(series_id, date)?, value));
    }
    Ok(RawSeries::from_observations(series_id, out))
}

fn parse_date(series_id: &str, raw: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| FetchError::Parse {
        series: series_id.to_string(),
        message: format!("invalid date '{raw}': {e}"),
    })
}

/// FRED marks missing observations with `.`.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_value_skips_missing_markers() {
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value(" 5.33 "), Some(5.33));
    }

    #[test]
    fn parses_api_observations() {
        let body = r#"{
            "realtime_start": "2024-01-01",
            "observations": [
                {"realtime_start": "2024-01-01", "date": "2008-12-16", "value": "0.00"},
                {"realtime_start": "2024-01-01", "date": "2008-12-15", "value": "."},
                {"realtime_start": "2024-01-01", "date": "2008-12-17", "value": "0.00"}
            ]
        }"#;
        let parsed: ObservationsResponse = serde_json::from_str(body).unwrap();
        let series = parse_observations("DFEDTARL", parsed).unwrap();
        assert_eq!(series.id(), "DFEDTARL");
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date(2008, 12, 16)));
    }

    #[test]
    fn parses_graph_csv_with_either_header() {
        let modern = "observation_date,DFF\n2024-05-01,5.33\n2024-05-02,.\n2024-05-03,5.33\n";
        let series = parse_graph_csv("DFF", modern).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_date(), Some(date(2024, 5, 3)));

        let legacy = "DATE,DFF\n1954-07-01,1.13\n";
        let series = parse_graph_csv("DFF", legacy).unwrap();
        assert_eq!(series.points()[0].value, 1.13);
    }

    #[test]
    fn graph_csv_with_bad_date_is_parse_error() {
        let body = "DATE,DFF\n07/01/1954,1.13\n";
        let err = parse_graph_csv("DFF", body).unwrap_err();
        assert!(matches!(err, FetchError::Parse { ref series, .. } if series == "DFF"));
    }

    #[test]
    fn api_key_is_not_printed() {
        let endpoint = FredEndpoint::Api {
            api_key: "abc123".to_string(),
        };
        assert!(!format!("{endpoint:?}").contains("abc123"));
    }
}
