use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// One (timestamp, close-or-gap) point in a provider series.
///
/// `close` is `None` where the provider reported an explicit gap marker.
/// Gaps may appear anywhere, including the final position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unix epoch seconds.
    pub ts: i64,
    pub close: Option<f64>,
}

impl Sample {
    pub const fn new(ts: i64, close: Option<f64>) -> Self {
        Self { ts, close }
    }

    pub const fn gap(ts: i64) -> Self {
        Self { ts, close: None }
    }
}

/// Ordered price series for one symbol, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    samples: Vec<Sample>,
}

impl PriceSeries {
    /// Build a series, enforcing strictly increasing timestamps and
    /// finite present prices.
    pub fn new(symbol: Symbol, samples: Vec<Sample>) -> Result<Self, ValidationError> {
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].ts <= pair[0].ts {
                return Err(ValidationError::NonMonotonicSeries { index: index + 1 });
            }
        }
        for (index, sample) in samples.iter().enumerate() {
            if let Some(price) = sample.close {
                if !price.is_finite() {
                    return Err(ValidationError::NonFinitePrice { index });
                }
            }
        }

        Ok(Self { symbol, samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Latest sample with a present price, scanning from the end.
    pub fn last_present(&self) -> Option<ResolvedPrice> {
        self.samples.iter().rev().find_map(|sample| {
            sample.close.map(|price| ResolvedPrice {
                price,
                ts: sample.ts,
            })
        })
    }
}

/// The single sample selected for submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub price: f64,
    pub ts: i64,
}
