//! Yahoo Finance v8 chart API data adapter.

use crate::domain::error::AutotradeError;
use crate::domain::ohlcv::{normalize, OhlcvBar};
use crate::domain::period::Period;
use crate::ports::data_port::DataPort;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; autotrade)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, AutotradeError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, AutotradeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AutotradeError::Fetch {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chart_url(&self, symbol: &str, period: Period) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, symbol, period
        )
    }
}

impl DataPort for YahooAdapter {
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, AutotradeError> {
        let url = self.chart_url(symbol, period);
        info!(%url, "fetching chart data");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AutotradeError::Fetch {
                reason: format!("request to {} failed: {}", url, e),
            })?;
        let status = response.status();
        let body = response.text().map_err(|e| AutotradeError::Fetch {
            reason: format!("failed to read response body: {}", e),
        })?;

        // unknown symbols come back as 404 with a chart.error payload
        match parse_chart(&body, symbol, period) {
            Err(AutotradeError::Fetch { reason }) if !status.is_success() => {
                Err(AutotradeError::Fetch {
                    reason: format!("HTTP {}: {}", status, reason),
                })
            }
            other => other,
        }
    }
}

/// Decode a chart response body into bars, skipping rows with any null field.
fn parse_chart(body: &str, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, AutotradeError> {
    let unavailable = || AutotradeError::DataUnavailable {
        symbol: symbol.to_string(),
        period: period.to_string(),
    };

    let response: ChartResponse = serde_json::from_str(body).map_err(|e| AutotradeError::Fetch {
        reason: format!("failed to decode chart response: {}", e),
    })?;

    if let Some(error) = response.chart.error {
        warn!(symbol, code = %error.code, description = %error.description, "chart API error");
        return Err(unavailable());
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(unavailable)?;
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(data.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        let row = (|| {
            Some(OhlcvBar {
                symbol: symbol.to_string(),
                date: DateTime::from_timestamp(ts, 0)?.date_naive(),
                open: field(&quote.open)?,
                high: field(&quote.high)?,
                low: field(&quote.low)?,
                close: field(&quote.close)?,
                volume: quote.volume.get(i).copied().flatten()?,
            })
        })();
        match row {
            Some(bar) => bars.push(bar),
            None => skipped += 1,
        }
    }

    debug!(symbol, rows = bars.len(), skipped, "decoded chart rows");
    if bars.is_empty() {
        return Err(unavailable());
    }
    Ok(normalize(bars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL"},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open": [187.15, 184.22, null],
                        "high": [188.44, 185.88, 184.26],
                        "low": [183.89, 183.43, 181.5],
                        "close": [185.64, 184.25, 181.91],
                        "volume": [82488700, 58414500, 71983600]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_rows_and_skips_nulls() {
        let bars = parse_chart(SAMPLE, "AAPL", Period::Years(2)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 185.64);
        assert_eq!(bars[1].volume, 58414500);
        assert!(bars.iter().all(|b| b.symbol == "AAPL"));
    }

    #[test]
    fn api_error_is_unavailable() {
        let body = r#"{"chart": {"result": null, "error": {
            "code": "Not Found",
            "description": "No data found, symbol may be delisted"
        }}}"#;
        let err = parse_chart(body, "ZZZZ", Period::Years(2)).unwrap_err();
        assert!(matches!(err, AutotradeError::DataUnavailable { symbol, .. } if symbol == "ZZZZ"));
    }

    #[test]
    fn empty_result_is_unavailable() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(
            parse_chart(body, "X", Period::Days(5)),
            Err(AutotradeError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn malformed_body_is_fetch_error() {
        assert!(matches!(
            parse_chart("<html>rate limited</html>", "X", Period::Max),
            Err(AutotradeError::Fetch { .. })
        ));
    }

    #[test]
    fn url_carries_range_and_interval() {
        let adapter = YahooAdapter::with_base_url("http://localhost:9/").unwrap();
        assert_eq!(
            adapter.chart_url("MSFT", Period::Months(6)),
            "http://localhost:9/v8/finance/chart/MSFT?range=6mo&interval=1d"
        );
    }

    #[test]
    fn unreachable_host_is_fetch_error() {
        let adapter = YahooAdapter::with_base_url("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            adapter.fetch_bars("AAPL", Period::Days(5)),
            Err(AutotradeError::Fetch { .. })
        ));
    }

    #[test]
    #[ignore = "requires network access"]
    fn fetches_live_data() {
        let adapter = YahooAdapter::new().unwrap();
        let bars = adapter.fetch_bars("AAPL", Period::Months(1)).unwrap();
        assert!(!bars.is_empty());
    }
}
