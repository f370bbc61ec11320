use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http::{HttpClient, HttpRequest};
use crate::{PriceSeries, Sample};

use super::{FetchError, ProviderKind, SeriesRequest, SeriesSource};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Chart-envelope provider: one result object carrying an ordered
/// `timestamp` array and an index-aligned `close` array where gaps are
/// explicit nulls, possibly in the final position.
#[derive(Clone)]
pub struct ChartSource {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl ChartSource {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    /// Point the adapter at a different endpoint (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, req: &SeriesRequest) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}d&interval={}&includePrePost=false",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(req.symbol.as_str()),
            req.range_days,
            req.interval.as_query(),
        )
    }

    async fn fetch_series(&self, req: &SeriesRequest) -> Result<PriceSeries, FetchError> {
        let url = self.request_url(req);
        tracing::debug!(%url, "fetching chart series");

        let response = self
            .http
            .execute(HttpRequest::get(&url).with_timeout_ms(REQUEST_TIMEOUT_MS))
            .await
            .map_err(|e| FetchError::transport(req.describe(), e.message()))?;

        if !response.is_success() {
            return Err(FetchError::upstream(req.describe(), response.status));
        }

        let envelope: ChartEnvelope = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::malformed(req.describe(), e.to_string()))?;

        normalize(req, envelope)
    }
}

impl SeriesSource for ChartSource {
    fn id(&self) -> ProviderKind {
        ProviderKind::Chart
    }

    fn fetch<'a>(
        &'a self,
        req: &'a SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch_series(req))
    }
}

fn normalize(req: &SeriesRequest, envelope: ChartEnvelope) -> Result<PriceSeries, FetchError> {
    let result = envelope
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        });

    let Some(result) = result else {
        let detail = match envelope.chart.error {
            Some(error) => format!(
                "provider error: {}",
                error
                    .description
                    .or(error.code)
                    .unwrap_or_else(|| String::from("unknown"))
            ),
            None => String::from("missing chart result"),
        };
        return Err(FetchError::malformed(req.describe(), detail));
    };

    let timestamps = result
        .timestamp
        .ok_or_else(|| FetchError::malformed(req.describe(), "missing timestamp array"))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|quote| quote.close)
        .ok_or_else(|| FetchError::malformed(req.describe(), "missing close array"))?;

    if timestamps.len() != closes.len() {
        return Err(FetchError::malformed(
            req.describe(),
            format!(
                "timestamp/close length mismatch: {} vs {}",
                timestamps.len(),
                closes.len()
            ),
        ));
    }

    if timestamps.is_empty() {
        return Err(FetchError::empty(req.describe()));
    }

    let samples = timestamps
        .into_iter()
        .zip(closes)
        .map(|(ts, close)| Sample::new(ts, close))
        .collect();

    PriceSeries::new(req.symbol.clone(), samples)
        .map_err(|e| FetchError::malformed(req.describe(), e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartErrorNode>,
}

#[derive(Debug, Deserialize)]
struct ChartErrorNode {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: IndicatorsNode,
}

#[derive(Debug, Deserialize)]
struct IndicatorsNode {
    #[serde(default)]
    quote: Vec<QuoteNode>,
}

#[derive(Debug, Deserialize)]
struct QuoteNode {
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::NoopHttpClient;
    use crate::{Interval, Symbol};

    fn request() -> SeriesRequest {
        SeriesRequest::new(
            Symbol::parse("NK=F").expect("valid"),
            2,
            Interval::FiveMinutes,
        )
        .expect("valid request")
    }

    #[test]
    fn builds_url_with_symbol_range_and_interval() {
        let source = ChartSource::new(Arc::new(NoopHttpClient))
            .with_base_url("https://example.test/");
        let url = source.request_url(&request());

        assert_eq!(
            url,
            "https://example.test/v8/finance/chart/NK%3DF?range=2d&interval=5m&includePrePost=false"
        );
    }

    #[test]
    fn normalizes_gaps_anywhere_including_last_position() {
        let envelope: ChartEnvelope = serde_json::from_value(serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [100, 200, 300],
                    "indicators": { "quote": [{ "close": [null, 50320.5, null] }] }
                }],
                "error": null
            }
        }))
        .expect("valid envelope");

        let series = normalize(&request(), envelope).expect("must normalize");
        assert_eq!(series.len(), 3);
        assert_eq!(series.samples()[0].close, None);
        assert_eq!(series.samples()[1].close, Some(50320.5));
        assert_eq!(series.samples()[2].close, None);
    }

    #[test]
    fn length_mismatch_is_malformed() {
        let envelope: ChartEnvelope = serde_json::from_value(serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [100, 200],
                    "indicators": { "quote": [{ "close": [1.0] }] }
                }]
            }
        }))
        .expect("valid envelope");

        let err = normalize(&request(), envelope).expect_err("must fail");
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn zero_samples_is_empty_series() {
        let envelope: ChartEnvelope = serde_json::from_value(serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [],
                    "indicators": { "quote": [{ "close": [] }] }
                }]
            }
        }))
        .expect("valid envelope");

        let err = normalize(&request(), envelope).expect_err("must fail");
        assert!(matches!(err, FetchError::EmptySeries { .. }));
    }
}
