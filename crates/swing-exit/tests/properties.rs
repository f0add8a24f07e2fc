//! Property tests for the exit cascade.
//!
//! 1. Ratchet: within a session, stops only tighten
//! 2. Idempotence: replaying a tick after applying its updates changes nothing

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use proptest::prelude::*;
use std::sync::Arc;
use swing_core::{
    Bar, CalendarError, Direction, HolidayCalendar, PositionContext, Timeframe,
};
use swing_exit::{ExitConfig, ExitEngine, TickContext};
use swing_structure::PivotConfig;
use uuid::Uuid;

struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_holiday_or_weekend(&self, _date: NaiveDate) -> Result<bool, CalendarError> {
        Ok(false)
    }
}

fn session_open() -> DateTime<Tz> {
    chrono_tz::Asia::Kolkata
        .with_ymd_and_hms(2024, 1, 3, 9, 15, 0)
        .unwrap()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_session_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-4i32..=4, 0u8..3, 0u8..3), 10..70).prop_map(|steps| {
        let open_ts = session_open();
        let mut close = 22_000.0;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (step, up, down))| {
                let open = close;
                close += step as f64 * 5.0;
                let ts = (open_ts + Duration::minutes(5 * i as i64)).timestamp_millis();
                Bar::new(
                    ts,
                    open,
                    open.max(close) + up as f64 * 2.5,
                    open.min(close) - down as f64 * 2.5,
                    close,
                    0.0,
                )
            })
            .collect()
    })
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Up), Just(Direction::Down)]
}

fn engine(left: usize, right: usize) -> ExitEngine {
    let config = ExitConfig {
        stop_timeframe: Timeframe::Minute5,
        entry_timeframe: Timeframe::Minute5,
        stop_pivot: PivotConfig::new(left, right).unwrap(),
        ..Default::default()
    };
    ExitEngine::new(config, Arc::new(NoHolidays)).unwrap()
}

fn position(direction: Direction, bars: &[Bar], offset: f64) -> PositionContext {
    let entry = bars[0].close;
    let stop = match direction {
        Direction::Up => entry - offset,
        Direction::Down => entry + offset,
    };
    PositionContext {
        id: Uuid::new_v4(),
        symbol: "NIFTY".to_string(),
        direction,
        entry_price: entry,
        entry_swing_high: None,
        entry_swing_low: None,
        stop_level: stop,
        target_level: None,
        entry_rsi: None,
        expiry_date: None,
        carry_forward_enabled: false,
        entry_trade_day: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        stop_updated_on: None,
    }
}

fn tick_at<'a>(position: &'a PositionContext, bars: &'a [Bar], k: usize) -> TickContext<'a> {
    // One second after bar k - 1 closes
    let now = session_open() + Duration::minutes(5 * k as i64) + Duration::seconds(1);
    TickContext {
        position,
        stop_bars: &bars[..k],
        entry_bars: &bars[..k],
        last_price: bars[k - 1].close,
        now,
    }
}

// ── 1. Ratchet ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn stop_never_loosens_within_session(
        bars in arb_session_bars(),
        direction in arb_direction(),
        offset in 50.0..400.0_f64,
        left in 1usize..=3,
        right in 1usize..=3,
    ) {
        let engine = engine(left, right);
        let mut pos = position(direction, &bars, offset);

        for k in 2..=bars.len() {
            let out = engine.evaluate(&tick_at(&pos, &bars, k)).unwrap();
            for update in &out.stop_updates {
                prop_assert_eq!(update.previous, pos.stop_level);
                prop_assert!(direction.is_tighter(update.new_stop, pos.stop_level));
                pos.apply(update);
            }
            if out.decision.should_exit {
                break;
            }
        }
    }
}

// ── 2. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn repeated_tick_is_stable(
        bars in arb_session_bars(),
        direction in arb_direction(),
        offset in 50.0..400.0_f64,
    ) {
        let engine = engine(2, 2);
        let pos = position(direction, &bars, offset);
        let k = bars.len();

        let first = engine.evaluate(&tick_at(&pos, &bars, k)).unwrap();
        let second = engine.evaluate(&tick_at(&pos, &bars, k)).unwrap();
        prop_assert_eq!(&first, &second);

        let mut applied = pos.clone();
        for update in &first.stop_updates {
            applied.apply(update);
        }
        let after = engine.evaluate(&tick_at(&applied, &bars, k)).unwrap();
        prop_assert!(after.stop_updates.is_empty());
    }
}
