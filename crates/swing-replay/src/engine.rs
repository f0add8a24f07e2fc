//! Replay engine.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use swing_core::{validate_bars, Bar, ExitDecision, PositionContext, SwingError};
use swing_exit::{ExitEngine, TickContext};
use tracing::{debug, info};

use crate::report::{ReplayReport, TrailPoint};

/// Replays one position against recorded bars.
#[derive(Debug)]
pub struct ReplayEngine {
    engine: ExitEngine,
    tz: Tz,
}

impl ReplayEngine {
    /// `tz` is the exchange timezone ticks are evaluated in.
    pub fn new(engine: ExitEngine, tz: Tz) -> Self {
        Self { engine, tz }
    }

    /// Tick at every stop-bar close after `start` until the first exit.
    ///
    /// Each tick sees only bars that opened before it; the last close is
    /// the tick's price. Ticks the engine rejects are counted and skipped.
    pub fn run(
        &self,
        position: PositionContext,
        stop_bars: &[Bar],
        entry_bars: &[Bar],
        start: DateTime<Utc>,
    ) -> Result<ReplayReport, SwingError> {
        validate_bars(stop_bars)?;
        if !entry_bars.is_empty() {
            validate_bars(entry_bars)?;
        }

        let interval = self.engine.config().stop_timeframe.duration();
        let mut report = ReplayReport::new(&position);
        let mut position = position;

        for (k, bar) in stop_bars.iter().enumerate() {
            let close_time = bar.datetime() + interval;
            if close_time <= start {
                continue;
            }
            let now = close_time.with_timezone(&self.tz);
            let now_ms = close_time.timestamp_millis();
            let entry_end = entry_bars.partition_point(|b| b.timestamp < now_ms);

            let tick = TickContext {
                position: &position,
                stop_bars: &stop_bars[..=k],
                entry_bars: &entry_bars[..entry_end],
                last_price: bar.close,
                now,
            };
            report.ticks += 1;
            report.last_price = Some(bar.close);

            let outcome = match self.engine.evaluate(&tick) {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!(%now, error = %e, "Replay tick skipped");
                    report.skipped_ticks += 1;
                    continue;
                }
            };

            for update in outcome.stop_updates {
                position.apply(&update);
                report.stop_trail.push(TrailPoint {
                    timestamp: now_ms,
                    update,
                });
            }

            if outcome.decision.should_exit {
                info!(%now, reason = ?outcome.decision.reason, "Replay exit");
                report.finish(&position, outcome.decision, Some(now_ms));
                return Ok(report);
            }
        }

        report.finish(&position, ExitDecision::hold(), None);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::sync::Arc;
    use swing_core::{CalendarError, Direction, ExitReason, HolidayCalendar, StopRule};
    use swing_exit::ExitConfig;
    use swing_structure::PivotConfig;
    use uuid::Uuid;

    struct NoHolidays;

    impl HolidayCalendar for NoHolidays {
        fn is_holiday_or_weekend(&self, _date: NaiveDate) -> Result<bool, CalendarError> {
            Ok(false)
        }
    }

    const IST: Tz = chrono_tz::Asia::Kolkata;

    fn open() -> DateTime<Tz> {
        IST.with_ymd_and_hms(2024, 1, 3, 9, 15, 0).unwrap()
    }

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let mut prev = closes[0];
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let ts = (open() + Duration::minutes(5 * i as i64)).timestamp_millis();
                let bar = Bar::new(ts, prev, prev.max(c) + 0.5, prev.min(c) - 0.5, c, 0.0);
                prev = c;
                bar
            })
            .collect()
    }

    fn position(stop: f64) -> PositionContext {
        PositionContext {
            id: Uuid::new_v4(),
            symbol: "NIFTY".to_string(),
            direction: Direction::Up,
            entry_price: 100.0,
            entry_swing_high: None,
            entry_swing_low: None,
            stop_level: stop,
            target_level: Some(110.0),
            entry_rsi: None,
            expiry_date: None,
            carry_forward_enabled: false,
            entry_trade_day: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            stop_updated_on: None,
        }
    }

    fn replay() -> ReplayEngine {
        let config = ExitConfig {
            stop_pivot: PivotConfig::new(2, 2).unwrap(),
            ..Default::default()
        };
        ReplayEngine::new(ExitEngine::new(config, Arc::new(NoHolidays)).unwrap(), IST)
    }

    #[test]
    fn test_trailing_stop_then_stoploss() {
        // Swing low at the 97 bar, then two closes falling below it
        let closes = [100.0, 99.0, 97.0, 99.0, 101.0, 103.0, 104.0, 96.0, 95.0, 99.0];
        let data = bars(&closes);
        let report = replay()
            .run(position(90.0), &data, &data, open().with_timezone(&Utc))
            .unwrap();

        assert_eq!(report.stop_trail.len(), 1);
        assert_eq!(report.stop_trail[0].update.rule, StopRule::SwingTightening);
        assert_eq!(report.final_stop, 96.5);

        assert_eq!(report.decision.reason, Some(ExitReason::Stoploss));
        assert_eq!(report.decision.exit_price, Some(95.0));
        assert_eq!(report.pnl_points, Some(-5.0));
        // The first tick has a single closed bar and is skipped
        assert_eq!(report.skipped_ticks, 1);
        assert_eq!(report.ticks, 9);
        assert!(!report.open_at_end);
    }

    #[test]
    fn test_target() {
        let data = bars(&[100.0, 104.0, 108.0, 111.0, 112.0]);
        let report = replay()
            .run(position(90.0), &data, &data, open().with_timezone(&Utc))
            .unwrap();
        assert_eq!(report.decision.reason, Some(ExitReason::Target));
        assert_eq!(report.decision.exit_price, Some(111.0));
        assert_eq!(report.ticks, 4);
    }

    #[test]
    fn test_still_open_at_end() {
        let data = bars(&[100.0, 101.0, 102.0, 103.0]);
        let report = replay()
            .run(position(90.0), &data, &data, open().with_timezone(&Utc))
            .unwrap();
        assert!(report.open_at_end);
        assert!(!report.decision.should_exit);
        assert_eq!(report.pnl_points, Some(3.0));
        assert!(report.summary().contains("OPEN"));
    }

    #[test]
    fn test_start_skips_earlier_bars() {
        let data = bars(&[100.0, 95.0, 90.0, 101.0, 102.0]);
        // Entered after the 90 close, so the earlier breach is not replayed
        let start = (open() + Duration::minutes(15)).with_timezone(&Utc);
        let report = replay().run(position(92.0), &data, &data, start).unwrap();
        assert!(report.open_at_end);
        assert_eq!(report.ticks, 2);
    }

    #[test]
    fn test_report_json() {
        let data = bars(&[100.0, 104.0, 108.0, 111.0]);
        let report = replay()
            .run(position(90.0), &data, &data, open().with_timezone(&Utc))
            .unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"TARGET\""));
    }
}
