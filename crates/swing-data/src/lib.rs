//! Data access for swing monitoring.

mod cache;
mod calendar;
mod csv_source;

pub use cache::{CacheKey, CachedBarSource, HistoryCache};
pub use calendar::FixedHolidayCalendar;
pub use csv_source::CsvBarSource;

use chrono_tz::Tz;
use swing_core::{Bar, DataError};

/// Load every bar of a CSV file, interpreting naive timestamps in `tz`.
pub async fn load_csv(path: &str, tz: Tz) -> Result<Vec<Bar>, DataError> {
    CsvBarSource::new(path, tz)?.load_all().await
}
