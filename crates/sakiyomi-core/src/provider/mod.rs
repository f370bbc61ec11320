//! Quote provider adapters.
//!
//! Each provider implements [`SeriesSource`] and normalizes its own
//! response shape into one [`PriceSeries`]. Adapters never retry and
//! never cache; one request per run.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::{Interval, PriceSeries, Symbol, ValidationError};

mod chart;
mod stooq;

pub use chart::ChartSource;
pub use stooq::StooqSource;

/// Known provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Chart,
    Stooq,
}

impl ProviderKind {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "chart" => Ok(Self::Chart),
            "stooq" => Ok(Self::Stooq),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Stooq => "stooq",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One series fetch: symbol, lookback and sampling granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub symbol: Symbol,
    pub range_days: u32,
    pub interval: Interval,
}

impl SeriesRequest {
    pub fn new(symbol: Symbol, range_days: u32, interval: Interval) -> Result<Self, FetchError> {
        if range_days == 0 {
            return Err(FetchError::InvalidRequest {
                detail: String::from("range must cover at least one day"),
            });
        }
        Ok(Self {
            symbol,
            range_days,
            interval,
        })
    }

    /// Context string attached to every fetch error for diagnosability.
    pub fn describe(&self) -> String {
        format!("{} ({}d/{})", self.symbol, self.range_days, self.interval)
    }
}

/// Structured fetch failures, each carrying the request context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid series request: {detail}")]
    InvalidRequest { detail: String },

    #[error("transport failure fetching {context}: {message}")]
    Transport { context: String, message: String },

    #[error("upstream returned status {status} for {context}")]
    Upstream { context: String, status: u16 },

    #[error("malformed response for {context}: {detail}")]
    MalformedResponse { context: String, detail: String },

    #[error("empty series for {context}")]
    EmptySeries { context: String },
}

impl FetchError {
    pub fn transport(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn upstream(context: impl Into<String>, status: u16) -> Self {
        Self::Upstream {
            context: context.into(),
            status,
        }
    }

    pub fn malformed(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn empty(context: impl Into<String>) -> Self {
        Self::EmptySeries {
            context: context.into(),
        }
    }
}

/// Provider adapter contract.
pub trait SeriesSource: Send + Sync {
    fn id(&self) -> ProviderKind;

    /// Fetch and normalize one series.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the transport fails, the upstream
    /// reports a non-success status, the payload is not series-shaped,
    /// or the normalized series holds zero samples.
    fn fetch<'a>(
        &'a self,
        req: &'a SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>>;
}
