use thiserror::Error;

/// Validation and contract errors exposed by `sakiyomi-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid interval '{value}', expected one of 5m, 1h, 1d")]
    InvalidInterval { value: String },
    #[error("invalid provider '{value}', expected one of chart, stooq")]
    InvalidProvider { value: String },

    #[error("series timestamps must be strictly increasing at index {index}")]
    NonMonotonicSeries { index: usize },
    #[error("series price at index {index} must be finite")]
    NonFinitePrice { index: usize },

    #[error("session window start {start} must not exceed end {end}")]
    InvalidWindow { start: i64, end: i64 },
    #[error("utc offset of {hours} hours is outside [-12, +14]")]
    InvalidOffset { hours: i8 },

    #[error("forecast price must be finite and non-negative: {value}")]
    InvalidForecastPrice { value: f64 },

    #[error("credentials identifier cannot be empty")]
    EmptyIdentifier,
    #[error("credentials secret cannot be empty")]
    EmptySecret,
}
