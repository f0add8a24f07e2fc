//! Trade-day resolution over a holiday calendar.

use chrono::{Datelike, NaiveDate, Weekday};
use swing_core::HolidayCalendar;
use tracing::warn;

/// Longest run of consecutive non-trading days walked back over.
const MAX_WALK_BACK: usize = 14;

/// Whether `date` is a weekend or holiday. Lookup failures count as trading
/// days: missing a holiday exit is preferable to a spurious one.
pub fn is_non_trading_day(calendar: &dyn HolidayCalendar, date: NaiveDate) -> bool {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return true;
    }
    match calendar.is_holiday_or_weekend(date) {
        Ok(closed) => closed,
        Err(e) => {
            warn!(%date, error = %e, "Holiday lookup failed, treating day as a trading day");
            false
        }
    }
}

/// The session a calendar day belongs to: `date` itself when it is a
/// trading day, otherwise the nearest trading day before it.
pub fn trade_day(calendar: &dyn HolidayCalendar, date: NaiveDate) -> NaiveDate {
    let mut day = date;
    for _ in 0..MAX_WALK_BACK {
        if !is_non_trading_day(calendar, day) {
            return day;
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    warn!(%date, "No trading day found within {} days, using the date itself", MAX_WALK_BACK);
    date
}
