//! The per-tick exit cascade.
//!
//! Rules run in a fixed order and the first exit wins:
//!
//! 1. next-session stop recalibration (stop update only)
//! 2. two-bar stop confirmation
//! 3. target
//! 4. swing tightening (stop update only)
//! 5. two-bar stop confirmation after the session's first bar
//! 6. holiday-eve exit
//! 7. RSI exit
//! 8. expiry-day exit
//!
//! Stop updates are returned ahead of the decision, and every rule after an
//! update sees the updated stop.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use swing_core::traits::Indicator;
use swing_core::{
    validate_bars, Bar, DataError, Direction, ExitDecision, ExitReason, HolidayCalendar,
    PositionContext, StopRule, StopUpdate, SwingError, TickOutcome,
};
use swing_indicators::Rsi;
use swing_structure::{PivotKind, SwingAnalyzer};
use tracing::{debug, info};

use crate::calendar::{is_non_trading_day, trade_day};
use crate::config::ExitConfig;

/// Inputs of one monitoring tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Position as currently stored
    pub position: &'a PositionContext,
    /// Recent bars of the underlying on the stop timeframe, oldest first
    pub stop_bars: &'a [Bar],
    /// Recent bars of the underlying on the entry timeframe, oldest first
    pub entry_bars: &'a [Bar],
    /// Latest traded price of the underlying
    pub last_price: f64,
    /// Current exchange time
    pub now: DateTime<Tz>,
}

/// Today's session boundaries, as seen from one tick.
#[derive(Debug, Clone, Copy)]
struct Session {
    trade_day: NaiveDate,
    /// Open time of the first bar, if it exists on the local clock
    first_open: Option<DateTime<Utc>>,
    first_close: Option<DateTime<Utc>>,
}

/// Running state of one cascade evaluation.
struct Cascade<'a> {
    position: &'a PositionContext,
    stop: f64,
    updates: Vec<StopUpdate>,
    trade_day: NaiveDate,
}

impl Cascade<'_> {
    fn update_stop(&mut self, new_stop: f64, rule: StopRule) {
        if new_stop == self.stop {
            return;
        }
        info!(
            position = %self.position.id,
            symbol = %self.position.symbol,
            previous = self.stop,
            new_stop,
            ?rule,
            "Stop updated"
        );
        self.updates.push(StopUpdate {
            position_id: self.position.id,
            previous: self.stop,
            new_stop,
            rule,
            trade_day: self.trade_day,
        });
        self.stop = new_stop;
    }

    fn exit(self, reason: ExitReason, price: f64) -> TickOutcome {
        info!(
            position = %self.position.id,
            symbol = %self.position.symbol,
            direction = %self.position.direction,
            %reason,
            price,
            stop = self.stop,
            "Exit triggered"
        );
        TickOutcome {
            stop_updates: self.updates,
            decision: ExitDecision::exit(reason, price),
        }
    }

    fn hold(self) -> TickOutcome {
        TickOutcome {
            stop_updates: self.updates,
            decision: ExitDecision::hold(),
        }
    }
}

/// Exit engine shared by all position monitors.
///
/// Holds configuration only; every input of a tick is passed to
/// [`ExitEngine::evaluate`].
pub struct ExitEngine {
    config: ExitConfig,
    analyzer: SwingAnalyzer,
    rsi: Rsi,
    calendar: Arc<dyn HolidayCalendar>,
}

impl std::fmt::Debug for ExitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExitEngine {
    pub fn new(config: ExitConfig, calendar: Arc<dyn HolidayCalendar>) -> Result<Self, SwingError> {
        config.validate()?;
        let analyzer = SwingAnalyzer::new(config.stop_pivot)?;
        let rsi = Rsi::with_smoothing(config.rsi_exit.period, config.rsi_exit.smoothing)?;
        Ok(Self {
            config,
            analyzer,
            rsi,
            calendar,
        })
    }

    pub fn config(&self) -> &ExitConfig {
        &self.config
    }

    /// Evaluate one tick.
    ///
    /// Malformed input is an error and the tick should be skipped; no exit
    /// is implied by an error.
    pub fn evaluate(&self, tick: &TickContext<'_>) -> Result<TickOutcome, SwingError> {
        let position = tick.position;
        if !tick.last_price.is_finite() {
            return Err(DataError::InvalidPrice(tick.last_price).into());
        }
        validate_bars(tick.stop_bars)?;
        if !tick.entry_bars.is_empty() {
            validate_bars(tick.entry_bars)?;
        }

        let now_utc = tick.now.with_timezone(&Utc);
        let closed = closed_prefix(tick.stop_bars, self.config.stop_timeframe.duration(), now_utc);
        if closed.len() < 2 {
            return Err(DataError::InsufficientBars {
                required: 2,
                available: closed.len(),
            }
            .into());
        }

        let session = self.session(&tick.now);
        let carried = self.config.carry_forward.enabled
            && position.carry_forward_enabled
            && position.entry_trade_day < session.trade_day;

        let mut cascade = Cascade {
            position,
            stop: position.stop_level,
            updates: Vec::new(),
            trade_day: session.trade_day,
        };

        // 1. Next-session recalibration, only while no update has touched the
        // stop this session
        let untouched_today = position
            .stop_updated_on
            .map_or(true, |day| day < session.trade_day);
        if carried && untouched_today {
            if let Some(new_stop) = self.recalibrated_stop(&cascade, closed, &session, now_utc) {
                cascade.update_stop(new_stop, StopRule::NextDayRecalibration);
            }
        }

        // 2. Two-bar stop confirmation
        if let Some(cur) = stop_confirmed(position.direction, cascade.stop, closed) {
            return Ok(cascade.exit(ExitReason::Stoploss, cur.close));
        }

        // 3. Target
        if let Some(target) = position.target_level {
            let reached = match position.direction {
                Direction::Up => tick.last_price >= target,
                Direction::Down => tick.last_price <= target,
            };
            if reached {
                return Ok(cascade.exit(ExitReason::Target, tick.last_price));
            }
        }

        // 4. Swing tightening
        if let Some(extreme) = self.swing_extreme(position.direction, closed)? {
            let tightened = position.direction.tighter(cascade.stop, extreme);
            cascade.update_stop(tightened, StopRule::SwingTightening);
        }

        // 5. Stop confirmation after today's first bar
        if carried {
            if let Some(first_close) = session.first_close {
                let start = closed.partition_point(|b| b.datetime() < first_close);
                let after_first = &closed[start..];
                if let Some(cur) = stop_confirmed(position.direction, cascade.stop, after_first) {
                    return Ok(cascade.exit(ExitReason::Stoploss, cur.close));
                }
            }
        }

        // 6. Holiday eve
        if self.holiday_ahead(&tick.now) {
            return Ok(cascade.exit(ExitReason::Holiday, tick.last_price));
        }

        // 7. RSI target
        if self.rsi_target_reached(position, tick.entry_bars, now_utc) {
            return Ok(cascade.exit(ExitReason::RsiTarget, tick.last_price));
        }

        // 8. Expiry day
        if self.expiry_reached(position, &tick.now) {
            return Ok(cascade.exit(ExitReason::Expiry, tick.last_price));
        }

        Ok(cascade.hold())
    }

    fn session(&self, now: &DateTime<Tz>) -> Session {
        let today = now.date_naive();
        let trade_day = trade_day(self.calendar.as_ref(), today);
        let local_open = today.and_time(self.config.first_candle_time.as_naive());
        let first_open = now
            .timezone()
            .from_local_datetime(&local_open)
            .earliest()
            .map(|t| t.with_timezone(&Utc));
        let first_close = first_open.map(|t| t + self.config.stop_timeframe.duration());

        Session {
            trade_day,
            first_open,
            first_close,
        }
    }

    /// Stop reset to today's first bar when the session opened beyond the
    /// stop.
    fn recalibrated_stop(
        &self,
        cascade: &Cascade<'_>,
        closed: &[Bar],
        session: &Session,
        now: DateTime<Utc>,
    ) -> Option<f64> {
        let (first_open, first_close) = (session.first_open?, session.first_close?);
        if now < first_close {
            debug!(position = %cascade.position.id, "First bar of the session not closed yet");
            return None;
        }
        let first = closed.iter().find(|b| b.datetime() >= first_open)?;

        match cascade.position.direction {
            Direction::Up if first.open < cascade.stop => Some(first.low),
            Direction::Down if first.open > cascade.stop => Some(first.high),
            _ => None,
        }
    }

    /// Latest confirmed swing low (UP) or high (DOWN) of the closed bars.
    fn swing_extreme(&self, direction: Direction, closed: &[Bar]) -> Result<Option<f64>, SwingError> {
        let required = self.analyzer.config().min_bars();
        if closed.len() < required {
            debug!(
                available = closed.len(),
                required, "Not enough closed bars to tighten the stop"
            );
            return Ok(None);
        }

        let analysis = self.analyzer.analyze(closed)?;
        let kind = match direction {
            Direction::Up => PivotKind::Low,
            Direction::Down => PivotKind::High,
        };
        Ok(analysis.latest_pivot(kind).map(|p| p.pivot.price))
    }

    fn holiday_ahead(&self, now: &DateTime<Tz>) -> bool {
        let cfg = &self.config.holiday_exit;
        if !cfg.enabled || !cfg.exit_time.is_reached_by(now.time()) {
            return false;
        }

        let today = now.date_naive();
        (1..=i64::from(cfg.exit_before_days) + 1).any(|offset| {
            let day = today + Duration::days(offset);
            let closed = is_non_trading_day(self.calendar.as_ref(), day);
            if closed {
                debug!(%day, "Non-trading day ahead");
            }
            closed
        })
    }

    fn rsi_target_reached(
        &self,
        position: &PositionContext,
        entry_bars: &[Bar],
        now: DateTime<Utc>,
    ) -> bool {
        let cfg = &self.config.rsi_exit;
        if !cfg.enabled {
            return false;
        }

        let ignored = match position.direction {
            Direction::Up => position.entry_rsi.is_some_and(|r| r >= cfg.ce_ignore_above),
            Direction::Down => position.entry_rsi.is_some_and(|r| r <= cfg.pe_ignore_below),
        };
        if ignored {
            debug!(
                position = %position.id,
                entry_rsi = ?position.entry_rsi,
                "RSI exit ignored for a position entered overextended"
            );
            return false;
        }

        let closed = closed_prefix(entry_bars, self.config.entry_timeframe.duration(), now);
        let closes: Vec<f64> = closed.iter().map(|b| b.close).collect();
        let rsi = match self.rsi.latest(&closes) {
            Ok(rsi) => rsi,
            Err(e) => {
                debug!(position = %position.id, error = %e, "RSI unavailable");
                return false;
            }
        };

        match position.direction {
            Direction::Up => rsi >= cfg.ce_target_level,
            Direction::Down => rsi <= cfg.pe_target_level,
        }
    }

    fn expiry_reached(&self, position: &PositionContext, now: &DateTime<Tz>) -> bool {
        let cfg = &self.config.expiry_exit;
        let Some(expiry) = position.expiry_date else {
            return false;
        };
        let exit_day = expiry - Duration::days(i64::from(cfg.days_before_expiry));
        cfg.enabled && now.date_naive() == exit_day && cfg.expiry_exit_time.is_reached_by(now.time())
    }
}

/// Bars that have closed by `now`. Timestamps ascend, so they form a prefix.
fn closed_prefix(bars: &[Bar], interval: Duration, now: DateTime<Utc>) -> &[Bar] {
    let end = bars.partition_point(|b| b.datetime() + interval <= now);
    &bars[..end]
}

/// Returns the confirming bar when the last two bars both close beyond the
/// stop side, the second further than the first.
fn stop_confirmed(direction: Direction, stop: f64, bars: &[Bar]) -> Option<&Bar> {
    let [.., prev, cur] = bars else {
        return None;
    };
    let breached = match direction {
        Direction::Up => prev.close < stop && cur.close < prev.close,
        Direction::Down => prev.close > stop && cur.close > prev.close,
    };
    breached.then_some(cur)
}
