//! Session-window construction and in-window price selection.
//!
//! The window is anchored to a fixed daily boundary pair expressed in a
//! single fixed UTC offset: it opens at the prior civil day's session
//! start and closes at the current civil day's overnight session end.
//! No timezone-database lookup happens anywhere in here, which keeps the
//! arithmetic fully deterministic for synthetic "now" values in tests.

use thiserror::Error;
use time::macros::time;
use time::{OffsetDateTime, Time, UtcOffset};

use crate::{PriceSeries, ResolvedPrice, ValidationError};

/// Inclusive epoch-second range used to pick a session-final price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SessionWindow {
    pub start: i64,
    pub end: i64,
}

impl SessionWindow {
    pub fn new(start: i64, end: i64) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Raised when a series holds no present price at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("series has no sample with a present price")]
pub struct NoValidPrice;

/// Computes session windows relative to a fixed civil offset.
///
/// Defaults describe the Osaka index-futures schedule: the day session
/// opens 08:45 local and the overnight session closes 06:00 local the
/// next civil day. Both boundary times and the offset are parameters so
/// tests can construct synthetic windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    pub offset: UtcOffset,
    /// Session start on the prior civil day.
    pub session_start: Time,
    /// Session end on the current civil day.
    pub session_end: Time,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            offset: UtcOffset::from_hms(9, 0, 0).expect("+09:00 is a valid offset"),
            session_start: time!(8:45),
            session_end: time!(6:00),
        }
    }
}

impl SessionClock {
    pub fn with_offset_hours(hours: i8) -> Result<Self, ValidationError> {
        // Civil offsets in actual use; `UtcOffset` itself accepts more.
        if !(-12..=14).contains(&hours) {
            return Err(ValidationError::InvalidOffset { hours });
        }
        let offset = UtcOffset::from_hms(hours, 0, 0)
            .map_err(|_| ValidationError::InvalidOffset { hours })?;
        Ok(Self {
            offset,
            ..Self::default()
        })
    }

    /// Window for the run happening at `now`.
    pub fn window_at(&self, now: OffsetDateTime) -> SessionWindow {
        let local = now.to_offset(self.offset);
        let today = local.date();
        let prior = today.previous_day().unwrap_or(today);

        let start = prior
            .with_time(self.session_start)
            .assume_offset(self.offset)
            .unix_timestamp();
        let end = today
            .with_time(self.session_end)
            .assume_offset(self.offset)
            .unix_timestamp();

        SessionWindow { start, end }
    }
}

/// Select the authoritative price for a window.
///
/// Last present-price sample inside the inclusive window wins; when the
/// window holds nothing usable, the latest present-price sample of the
/// whole series is the fallback. Only an all-gap series fails.
pub fn select_in_window(
    series: &PriceSeries,
    window: &SessionWindow,
) -> Result<ResolvedPrice, NoValidPrice> {
    let mut chosen = None;
    for sample in series.samples() {
        if !window.contains(sample.ts) {
            continue;
        }
        if let Some(price) = sample.close {
            chosen = Some(ResolvedPrice {
                price,
                ts: sample.ts,
            });
        }
    }

    if let Some(found) = chosen {
        return Ok(found);
    }

    tracing::debug!(
        start = window.start,
        end = window.end,
        "no usable sample inside window, falling back to series tail"
    );
    series.last_present().ok_or(NoValidPrice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sample, Symbol};
    use time::macros::datetime;

    fn series(samples: Vec<Sample>) -> PriceSeries {
        PriceSeries::new(Symbol::parse("NK=F").expect("valid"), samples).expect("valid series")
    }

    #[test]
    fn picks_last_present_sample_inside_window() {
        let s = series(vec![
            Sample::new(100, Some(1.0)),
            Sample::new(200, Some(2.0)),
            Sample::gap(300),
            Sample::new(400, Some(4.0)),
        ]);
        let window = SessionWindow::new(100, 300).expect("valid window");

        let resolved = select_in_window(&s, &window).expect("must resolve");
        assert_eq!(resolved.ts, 200);
        assert_eq!(resolved.price, 2.0);
    }

    #[test]
    fn falls_back_to_series_tail_when_window_is_empty() {
        let s = series(vec![Sample::new(100, Some(1.0)), Sample::gap(200)]);
        let window = SessionWindow::new(500, 600).expect("valid window");

        let resolved = select_in_window(&s, &window).expect("must resolve");
        assert_eq!(resolved.ts, 100);
    }

    #[test]
    fn all_gap_series_has_no_valid_price() {
        let s = series(vec![Sample::gap(100), Sample::gap(200)]);
        let window = SessionWindow::new(0, 1_000).expect("valid window");

        assert_eq!(select_in_window(&s, &window), Err(NoValidPrice));
    }

    #[test]
    fn window_spans_prior_day_open_to_current_day_close() {
        let clock = SessionClock::default();
        // 10:00 JST on 2026-08-07.
        let now = datetime!(2026-08-07 01:00 UTC);

        let window = clock.window_at(now);
        assert_eq!(
            window.start,
            datetime!(2026-08-06 08:45 +9).unix_timestamp()
        );
        assert_eq!(window.end, datetime!(2026-08-07 06:00 +9).unix_timestamp());
    }

    #[test]
    fn offset_is_a_parameter_not_a_constant() {
        let clock = SessionClock::with_offset_hours(0).expect("valid offset");
        let now = datetime!(2026-08-07 10:00 UTC);

        let window = clock.window_at(now);
        assert_eq!(
            window.start,
            datetime!(2026-08-06 08:45 UTC).unix_timestamp()
        );
        assert_eq!(window.end, datetime!(2026-08-07 06:00 UTC).unix_timestamp());
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        let err = SessionClock::with_offset_hours(20).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidOffset { hours: 20 }));
    }
}
