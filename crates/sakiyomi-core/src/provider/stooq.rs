use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use time::{Date, Month, Time, UtcOffset};

use crate::http::{HttpClient, HttpRequest};
use crate::{PriceSeries, Sample};

use super::{FetchError, ProviderKind, SeriesRequest, SeriesSource};

const DEFAULT_BASE_URL: &str = "https://stooq.com";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Daily-CSV provider (`Date,Open,High,Low,Close,Volume` rows).
///
/// Rows carry no time of day, so each one is stamped at a fixed local
/// close time of its civil day in the configured offset; window
/// selection then treats a day-row as that session's close. Gap markers
/// (`-`, `N/D`, empty) become absent prices like the chart provider's
/// nulls.
#[derive(Clone)]
pub struct StooqSource {
    http: Arc<dyn HttpClient>,
    base_url: String,
    offset: UtcOffset,
    row_time: Time,
}

impl StooqSource {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base_url: String::from(DEFAULT_BASE_URL),
            offset: UtcOffset::from_hms(9, 0, 0).expect("+09:00 is a valid offset"),
            row_time: Time::from_hms(15, 0, 0).expect("15:00 is a valid time"),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Offset used to anchor dated rows to epoch seconds.
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    fn request_url(&self, req: &SeriesRequest) -> String {
        // Stooq serves daily granularity; finer intervals are not
        // available on this endpoint.
        format!(
            "{}/q/d/l/?s={}&i=d",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&req.symbol.as_str().to_ascii_lowercase()),
        )
    }

    async fn fetch_series(&self, req: &SeriesRequest) -> Result<PriceSeries, FetchError> {
        let url = self.request_url(req);
        tracing::debug!(%url, "fetching stooq daily csv");

        let response = self
            .http
            .execute(HttpRequest::get(&url).with_timeout_ms(REQUEST_TIMEOUT_MS))
            .await
            .map_err(|e| FetchError::transport(req.describe(), e.message()))?;

        if !response.is_success() {
            return Err(FetchError::upstream(req.describe(), response.status));
        }

        self.parse_csv(req, &response.body)
    }

    fn parse_csv(&self, req: &SeriesRequest, body: &str) -> Result<PriceSeries, FetchError> {
        let mut lines = body.trim().lines();

        let Some(header) = lines.next() else {
            return Err(FetchError::empty(req.describe()));
        };
        if header.trim() == "No data" {
            return Err(FetchError::empty(req.describe()));
        }

        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let date_idx = column_index(&columns, "Date")
            .ok_or_else(|| FetchError::malformed(req.describe(), "header has no Date column"))?;
        let close_idx = column_index(&columns, "Close")
            .ok_or_else(|| FetchError::malformed(req.describe(), "header has no Close column"))?;

        let mut samples = Vec::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != columns.len() {
                return Err(FetchError::malformed(
                    req.describe(),
                    format!("row has {} fields, expected {}", fields.len(), columns.len()),
                ));
            }

            let ts = self.row_timestamp(fields[date_idx]).ok_or_else(|| {
                FetchError::malformed(
                    req.describe(),
                    format!("unparseable date '{}'", fields[date_idx]),
                )
            })?;
            let close = parse_close(fields[close_idx]).map_err(|raw| {
                FetchError::malformed(req.describe(), format!("unparseable close '{raw}'"))
            })?;

            samples.push(Sample::new(ts, close));
        }

        if samples.is_empty() {
            return Err(FetchError::empty(req.describe()));
        }

        // The endpoint returns full history; keep only the requested tail.
        let keep = req.range_days as usize;
        if samples.len() > keep {
            samples.drain(..samples.len() - keep);
        }

        PriceSeries::new(req.symbol.clone(), samples)
            .map_err(|e| FetchError::malformed(req.describe(), e.to_string()))
    }

    fn row_timestamp(&self, raw: &str) -> Option<i64> {
        let mut parts = raw.split('-');
        let year: i32 = parts.next()?.parse().ok()?;
        let month: u8 = parts.next()?.parse().ok()?;
        let day: u8 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }

        let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
        Some(
            date.with_time(self.row_time)
                .assume_offset(self.offset)
                .unix_timestamp(),
        )
    }
}

impl SeriesSource for StooqSource {
    fn id(&self) -> ProviderKind {
        ProviderKind::Stooq
    }

    fn fetch<'a>(
        &'a self,
        req: &'a SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch_series(req))
    }
}

fn column_index(columns: &[&str], name: &str) -> Option<usize> {
    columns.iter().position(|column| *column == name)
}

/// `Ok(None)` is a gap row; `Err` carries the raw field back for context.
fn parse_close(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() || raw == "-" || raw.eq_ignore_ascii_case("n/d") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(raw.to_owned()),
    }
}
