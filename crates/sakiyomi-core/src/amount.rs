//! Two-part forecast amount formatting.
//!
//! Pure arithmetic only; no I/O anywhere in this module so every branch
//! can be swept exhaustively in tests.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::ValidationError;

/// Decimal halves such as 1999.995 store just below the boundary in
/// binary; nudge the scaled value before rounding half away from zero.
const BOUNDARY_NUDGE: f64 = 1e-7;

/// Major/minor split of a rounded price, minor always in `[0, 99]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastAmount {
    pub major: u64,
    pub minor: u8,
}

impl ForecastAmount {
    /// Round to two decimals (half away from zero) and split into
    /// major/minor parts, carrying `minor == 100` into the major units.
    pub fn from_price(price: f64) -> Result<Self, ValidationError> {
        if !price.is_finite() || price < 0.0 {
            return Err(ValidationError::InvalidForecastPrice { value: price });
        }

        let rounded = (price * 100.0 + BOUNDARY_NUDGE).round() / 100.0;
        let whole = rounded.floor();
        let minor_raw = ((rounded - whole) * 100.0).round() as i64;

        let mut major = whole as u64;
        let minor = if minor_raw >= 100 {
            major += 1;
            0
        } else if minor_raw < 0 {
            0
        } else {
            minor_raw as u8
        };

        Ok(Self { major, minor })
    }

    /// Minor part as the two-digit zero-padded string the form expects.
    pub fn minor_padded(&self) -> String {
        format!("{:02}", self.minor)
    }

    pub fn reconstruct(&self) -> f64 {
        self.major as f64 + f64::from(self.minor) / 100.0
    }
}

impl Display for ForecastAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

/// Snap a price to the nearest multiple of `unit` (e.g. 10-yen steps).
/// A zero unit disables snapping.
pub fn round_to_unit(price: f64, unit: u32) -> f64 {
    if unit == 0 {
        return price;
    }
    let unit = f64::from(unit);
    (price / unit).round() * unit
}
