//! Exchange holiday calendar.

use crate::error::CalendarError;
use chrono::NaiveDate;

/// Trait for non-trading day lookups.
pub trait HolidayCalendar: Send + Sync {
    /// Whether `date` is a weekend or an exchange holiday.
    fn is_holiday_or_weekend(&self, date: NaiveDate) -> Result<bool, CalendarError>;
}
