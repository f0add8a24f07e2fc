//! Holiday calendar over a fixed list of dates.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use swing_core::{CalendarError, HolidayCalendar};

/// Exchange holidays known up front, plus weekends.
#[derive(Debug, Clone, Default)]
pub struct FixedHolidayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl FixedHolidayCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Parse one `YYYY-MM-DD` date per line; blank lines and `#` comments
    /// are skipped.
    pub fn parse(text: &str) -> Result<Self, CalendarError> {
        let holidays = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                NaiveDate::parse_from_str(line, "%Y-%m-%d")
                    .map_err(|e| CalendarError::Unavailable(format!("bad holiday '{line}': {e}")))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { holidays })
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }
}

impl HolidayCalendar for FixedHolidayCalendar {
    fn is_holiday_or_weekend(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        Ok(weekend || self.holidays.contains(&date))
    }
}
