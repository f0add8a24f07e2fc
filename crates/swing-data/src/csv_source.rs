//! CSV bar source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use swing_core::traits::BarSource;
use swing_core::{validate_bars, Bar, DataError, Timeframe};
use tracing::debug;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Symbol", default)]
    symbol: Option<String>,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// Columns every file must carry, each with the header spellings accepted.
const REQUIRED_COLUMNS: [(&str, &[&str]); 5] = [
    ("date", &["date", "timestamp"]),
    ("open", &["open"]),
    ("high", &["high"]),
    ("low", &["low"]),
    ("close", &["close"]),
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Bars recorded in a CSV file.
///
/// The file holds one timeframe. An optional `symbol` column lets one file
/// carry several underlyings.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    path: PathBuf,
    tz: Tz,
}

impl CsvBarSource {
    /// `tz` is the exchange timezone naive timestamps are recorded in.
    pub fn new(path: impl AsRef<Path>, tz: Tz) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::Source(format!("{} not found", path.display())));
        }
        Ok(Self {
            path: path.to_path_buf(),
            tz,
        })
    }

    /// Every bar in the file, sorted and validated.
    pub async fn load_all(&self) -> Result<Vec<Bar>, DataError> {
        let bars = self.read(None).await?;
        validate_bars(&bars)?;
        Ok(bars)
    }

    async fn read(&self, symbol: Option<&str>) -> Result<Vec<Bar>, DataError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DataError::Source(format!("{}: {}", self.path.display(), e)))?;
        self.parse(&bytes, symbol)
    }

    fn parse(&self, bytes: &[u8], symbol: Option<&str>) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| DataError::ParseError(e.to_string()))?;
        for (field, names) in REQUIRED_COLUMNS {
            if !headers
                .iter()
                .any(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
            {
                return Err(DataError::MissingField(field.to_string()));
            }
        }

        let mut bars = Vec::new();
        let mut seen_symbol = false;

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            if let (Some(want), Some(have)) = (symbol, record.symbol.as_deref()) {
                if !have.eq_ignore_ascii_case(want) {
                    continue;
                }
            }
            seen_symbol = true;

            bars.push(Bar::new(
                parse_timestamp(&record.date, &self.tz)?,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        if let (Some(want), false) = (symbol, seen_symbol) {
            return Err(DataError::SymbolNotFound(want.to_string()));
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

#[async_trait]
impl BarSource for CsvBarSource {
    async fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let (from_ms, to_ms) = (from.timestamp_millis(), to.timestamp_millis());
        let bars: Vec<Bar> = self
            .read(Some(symbol))
            .await?
            .into_iter()
            .filter(|b| (from_ms..=to_ms).contains(&b.timestamp))
            .collect();

        debug!(symbol, %timeframe, count = bars.len(), "Loaded bars from CSV");
        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        validate_bars(&bars)?;
        Ok(bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse a timestamp cell to Unix milliseconds.
///
/// Numbers are Unix seconds, or milliseconds when larger than 10^10. Offset
/// timestamps are taken as given; naive ones are local to `tz`.
fn parse_timestamp(raw: &str, tz: &Tz) -> Result<i64, DataError> {
    if let Ok(ts) = raw.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .ok_or_else(|| DataError::ParseError(format!("Could not parse timestamp: {raw}")))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| DataError::ParseError(format!("{raw} does not exist in {tz}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const IST: Tz = chrono_tz::Asia::Kolkata;

    fn temp_csv(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "swing-data-{}-{}.csv",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_timestamp() {
        // 09:15 IST is 03:45 UTC
        let ms = parse_timestamp("2024-01-15 09:15:00", &IST).unwrap();
        assert_eq!(ms, utc(3, 45).timestamp_millis());
        assert_eq!(parse_timestamp("2024-01-15 09:15", &IST).unwrap(), ms);
        assert_eq!(parse_timestamp("2024-01-15T09:15:00+05:30", &IST).unwrap(), ms);
        assert_eq!(parse_timestamp("1705312800", &IST).unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800000", &IST).unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("2024-01-15", &IST).is_ok());
        assert!(parse_timestamp("yesterday", &IST).is_err());
    }

    #[tokio::test]
    async fn test_load_sorts_and_validates() {
        let path = temp_csv(
            "load",
            "timestamp,open,high,low,close,volume\n\
             2024-01-15 09:20,101,103,100,102,10\n\
             2024-01-15 09:15,100,102,99,101,20\n",
        );
        let source = CsvBarSource::new(&path, IST).unwrap();
        let bars = source.load_all().await.unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 101.0);
        assert_eq!(bars[1].close, 102.0);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_get_bars_filters_symbol_and_range() {
        let path = temp_csv(
            "range",
            "date,symbol,open,high,low,close\n\
             2024-01-15 09:15,NIFTY,100,102,99,101\n\
             2024-01-15 09:20,NIFTY,101,103,100,102\n\
             2024-01-15 09:25,NIFTY,102,104,101,103\n\
             2024-01-15 09:15,BANKNIFTY,400,402,399,401\n",
        );
        let source = CsvBarSource::new(&path, IST).unwrap();

        let bars = source
            .get_bars("NIFTY", Timeframe::Minute5, utc(3, 50), utc(4, 0))
            .await
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 102.0);

        let missing = source
            .get_bars("FINNIFTY", Timeframe::Minute5, utc(3, 0), utc(4, 0))
            .await;
        assert_eq!(missing.unwrap_err(), DataError::SymbolNotFound("FINNIFTY".into()));

        let empty = source
            .get_bars("NIFTY", Timeframe::Minute5, utc(5, 0), utc(6, 0))
            .await;
        assert_eq!(empty.unwrap_err(), DataError::NoDataAvailable);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_invalid_bar_rejected() {
        let path = temp_csv(
            "invalid",
            "timestamp,open,high,low,close\n2024-01-15 09:15,100,97,98,100\n",
        );
        let source = CsvBarSource::new(&path, IST).unwrap();
        assert!(matches!(
            source.load_all().await,
            Err(DataError::InvalidBar { index: 0, .. })
        ));
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_missing_column_named() {
        let path = temp_csv(
            "nolow",
            "timestamp,open,high,close\n2024-01-15 09:15,100,101,100\n",
        );
        let source = CsvBarSource::new(&path, IST).unwrap();
        match source.load_all().await {
            Err(DataError::MissingField(field)) => assert_eq!(field, "low"),
            other => panic!("expected missing low column, got {other:?}"),
        }
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        assert!(CsvBarSource::new("/nonexistent/bars.csv", IST).is_err());
    }
}
