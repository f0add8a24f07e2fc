//! Swing breakout entries.
//!
//! Enters UP when the close clears the last higher high plus a buffer and
//! DOWN when it breaks the last lower low minus the buffer. The last
//! `confirmation_candles` closes must hold beyond the level, and an
//! overstretched RSI skips the entry.

use serde::{Deserialize, Serialize};
use swing_core::{
    traits::{Indicator, Strategy, StrategyConfig, StrategyState},
    Bar, BarSeries, Direction, EntrySignal, StrategyError,
};
use swing_indicators::{Rsi, Smoothing};
use swing_structure::{PivotConfig, PivotKind, SwingAnalysis, SwingAnalyzer};
use tracing::{debug, info, warn};

use crate::levels::{LevelCalculator, LevelConfig};

/// Configuration for the swing breakout strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    /// Pivot window on the entry timeframe
    pub pivot: PivotConfig,
    /// Distance beyond the swing level the close must reach
    pub entry_buffer: f64,
    /// Closes that must hold beyond the level, counting the trigger bar
    pub confirmation_candles: usize,
    pub allow_up: bool,
    pub allow_down: bool,
    pub rsi_period: usize,
    pub rsi_smoothing: Smoothing,
    /// UP entries are skipped at or above this RSI
    pub rsi_ignore_above: f64,
    /// DOWN entries are skipped at or below this RSI
    pub rsi_ignore_below: f64,
    pub levels: LevelConfig,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            pivot: PivotConfig::default(),
            entry_buffer: 0.0,
            confirmation_candles: 1,
            allow_up: true,
            allow_down: true,
            rsi_period: 14,
            rsi_smoothing: Smoothing::Sma,
            rsi_ignore_above: 80.0,
            rsi_ignore_below: 20.0,
            levels: LevelConfig::default(),
        }
    }
}

impl StrategyConfig for BreakoutConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        self.pivot
            .validate()
            .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        if self.entry_buffer < 0.0 || !self.entry_buffer.is_finite() {
            return Err(StrategyError::InvalidConfig(
                "entry_buffer must be a non-negative number".into(),
            ));
        }
        if self.rsi_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 1".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.rsi_ignore_above)
            || !(0.0..=100.0).contains(&self.rsi_ignore_below)
            || self.rsi_ignore_below >= self.rsi_ignore_above
        {
            return Err(StrategyError::InvalidConfig(
                "RSI ignore levels must satisfy 0 <= below < above <= 100".into(),
            ));
        }
        if !self.allow_up && !self.allow_down {
            return Err(StrategyError::InvalidConfig(
                "At least one direction must be allowed".into(),
            ));
        }
        Ok(())
    }
}

/// Swing breakout entry strategy for one symbol.
pub struct SwingBreakoutStrategy {
    config: BreakoutConfig,
    analyzer: SwingAnalyzer,
    rsi: Rsi,
    levels: LevelCalculator,
    in_position: bool,
    bars_processed: usize,
    signals_generated: usize,
    last_hh: Option<f64>,
    last_ll: Option<f64>,
    last_rsi: Option<f64>,
}

impl SwingBreakoutStrategy {
    pub fn new(config: BreakoutConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let analyzer = SwingAnalyzer::new(config.pivot)
            .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        let rsi = Rsi::with_smoothing(config.rsi_period, config.rsi_smoothing)
            .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        let levels = LevelCalculator::new(config.levels)?;

        Ok(Self {
            config,
            analyzer,
            rsi,
            levels,
            in_position: false,
            bars_processed: 0,
            signals_generated: 0,
            last_hh: None,
            last_ll: None,
            last_rsi: None,
        })
    }

    pub fn config(&self) -> &BreakoutConfig {
        &self.config
    }

    pub fn level_calculator(&self) -> &LevelCalculator {
        &self.levels
    }

    /// Look for an entry on the last bar of `entry_bars`, confirming with the
    /// closes of `confirm_bars`.
    pub fn evaluate(
        &mut self,
        symbol: &str,
        entry_bars: &[Bar],
        confirm_bars: &[Bar],
    ) -> Option<EntrySignal> {
        if entry_bars.len() < self.warmup_period() {
            return None;
        }
        let analysis = match self.analyzer.analyze(entry_bars) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(symbol, error = %e, "Swing analysis failed");
                return None;
            }
        };
        let points = analysis.last_swing_points();
        self.last_hh = points.hh.map(|p| p.price);
        self.last_ll = points.ll.map(|p| p.price);

        let closes: Vec<f64> = entry_bars.iter().map(|b| b.close).collect();
        self.last_rsi = self.rsi.latest(&closes).ok();

        if self.in_position {
            debug!(symbol, "Position already open, skipping entry");
            return None;
        }

        let close = entry_bars.last()?.close;
        let (direction, level) = self.breakout(close)?;

        if !self.confirmed(direction, level, confirm_bars) {
            info!(
                symbol,
                %direction,
                level,
                candles = self.config.confirmation_candles,
                "Breakout not confirmed"
            );
            return None;
        }

        if let Some(rsi) = self.last_rsi {
            let stretched = match direction {
                Direction::Up => rsi >= self.config.rsi_ignore_above,
                Direction::Down => rsi <= self.config.rsi_ignore_below,
            };
            if stretched {
                info!(symbol, %direction, rsi, "RSI stretched, ignoring breakout");
                return None;
            }
        }

        let signal = self.build_signal(symbol, direction, level, entry_bars, &analysis)?;
        self.in_position = true;
        self.signals_generated += 1;
        info!(
            symbol,
            %direction,
            price = signal.price,
            stop = signal.stop_level,
            target = ?signal.target_level,
            rsi = ?signal.rsi,
            "Entry signal"
        );
        Some(signal)
    }

    /// Direction and level of a breakout by `close`, if any.
    fn breakout(&self, close: f64) -> Option<(Direction, f64)> {
        let buffer = self.config.entry_buffer;
        if self.config.allow_up {
            if let Some(level) = self.last_hh.map(|hh| hh + buffer) {
                if close > level {
                    return Some((Direction::Up, level));
                }
            }
        }
        if self.config.allow_down {
            if let Some(level) = self.last_ll.map(|ll| ll - buffer) {
                if close < level {
                    return Some((Direction::Down, level));
                }
            }
        }
        None
    }

    fn confirmed(&self, direction: Direction, level: f64, bars: &[Bar]) -> bool {
        let n = self.config.confirmation_candles;
        if n == 0 {
            return true;
        }
        if bars.len() < n {
            return false;
        }
        bars[bars.len() - n..].iter().all(|b| match direction {
            Direction::Up => b.close > level,
            Direction::Down => b.close < level,
        })
    }

    fn build_signal(
        &self,
        symbol: &str,
        direction: Direction,
        level: f64,
        bars: &[Bar],
        analysis: &SwingAnalysis,
    ) -> Option<EntrySignal> {
        let last = bars.last()?;
        let swing_high = analysis.latest_pivot(PivotKind::High).map(|p| p.pivot.price);
        let swing_low = analysis.latest_pivot(PivotKind::Low).map(|p| p.pivot.price);
        let extreme = match direction {
            Direction::Up => swing_low,
            Direction::Down => swing_high,
        };

        let levels = match self.levels.calculate(direction, last.close, bars, extreme) {
            Ok(levels) => levels,
            Err(e) => {
                warn!(symbol, error = %e, "Could not place entry levels");
                return None;
            }
        };

        Some(EntrySignal {
            symbol: symbol.to_string(),
            direction,
            timestamp: last.timestamp,
            price: last.close,
            breakout_level: level,
            rsi: self.last_rsi,
            swing_high,
            swing_low,
            stop_level: levels.stop,
            target_level: levels.target,
        })
    }
}

impl Strategy for SwingBreakoutStrategy {
    fn name(&self) -> &str {
        "Swing Breakout"
    }

    fn on_bar(&mut self, series: &BarSeries) -> Option<EntrySignal> {
        self.bars_processed += 1;
        self.evaluate(&series.symbol, series.bars(), series.bars())
    }

    fn on_exit(&mut self) {
        self.in_position = false;
    }

    fn reset(&mut self) {
        self.in_position = false;
        self.bars_processed = 0;
        self.signals_generated = 0;
        self.last_hh = None;
        self.last_ll = None;
        self.last_rsi = None;
    }

    fn state(&self) -> StrategyState {
        let mut indicators = std::collections::HashMap::new();
        if let Some(hh) = self.last_hh {
            indicators.insert("last_hh".to_string(), hh);
        }
        if let Some(ll) = self.last_ll {
            indicators.insert("last_ll".to_string(), ll);
        }
        if let Some(rsi) = self.last_rsi {
            indicators.insert("rsi".to_string(), rsi);
        }

        StrategyState {
            name: self.name().to_string(),
            is_warmed_up: self.bars_processed >= self.warmup_period(),
            bars_processed: self.bars_processed,
            signals_generated: self.signals_generated,
            in_position: self.in_position,
            indicators,
        }
    }

    fn warmup_period(&self) -> usize {
        self.config.pivot.min_bars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{StopMethod, TargetMethod};
    use rust_decimal_macros::dec;
    use swing_core::Timeframe;

    const RISING: [f64; 25] = [
        100.0, 102.0, 105.0, 103.0, 101.0, 99.0, 101.0, 104.0, 108.0, 106.0, 104.0, 102.0, 104.0,
        106.0, 109.0, 107.0, 105.0, 103.0, 105.0, 107.0, 110.0, 108.0, 106.0, 109.0, 112.0,
    ];

    fn path(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 300_000, c, c + 0.5, c - 0.5, c, 0.0))
            .collect()
    }

    fn config() -> BreakoutConfig {
        BreakoutConfig {
            pivot: PivotConfig::new(2, 2).unwrap(),
            levels: LevelConfig {
                target: TargetMethod::FixedPoints { points: dec!(10) },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn strategy(config: BreakoutConfig) -> SwingBreakoutStrategy {
        SwingBreakoutStrategy::new(config).unwrap()
    }

    #[test]
    fn test_up_breakout() {
        let bars = path(&RISING);
        let mut s = strategy(config());

        let signal = s.evaluate("NIFTY", &bars, &bars).unwrap();
        assert_eq!(signal.direction, Direction::Up);
        assert_eq!(signal.price, 112.0);
        // Last HH is the bar-20 high
        assert_eq!(signal.breakout_level, 110.5);
        // Last swing low 105.5 minus the 2.5 buffer
        assert_eq!(signal.stop_level, 103.0);
        assert_eq!(signal.target_level, Some(122.0));
        assert!((signal.rsi.unwrap() - 62.5).abs() < 1e-9);
        assert_eq!(signal.swing_low, Some(105.5));
    }

    #[test]
    fn test_down_breakout() {
        let mirrored: Vec<f64> = RISING.iter().map(|c| 200.0 - c).collect();
        let bars = path(&mirrored);
        let mut s = strategy(config());

        let signal = s.evaluate("NIFTY", &bars, &bars).unwrap();
        assert_eq!(signal.direction, Direction::Down);
        assert_eq!(signal.breakout_level, 89.5);
        assert_eq!(signal.stop_level, 97.0);
        assert_eq!(signal.target_level, Some(78.0));
    }

    #[test]
    fn test_confirmation_required() {
        let bars = path(&RISING);
        let mut s = strategy(BreakoutConfig {
            confirmation_candles: 2,
            ..config()
        });
        // Close 109 before the trigger bar is below 110.5
        assert!(s.evaluate("NIFTY", &bars, &bars).is_none());
    }

    #[test]
    fn test_rsi_gate() {
        let bars = path(&RISING);
        let mut s = strategy(BreakoutConfig {
            rsi_ignore_above: 60.0,
            ..config()
        });
        assert!(s.evaluate("NIFTY", &bars, &bars).is_none());
        assert!(s.state().indicators.contains_key("rsi"));
    }

    #[test]
    fn test_one_signal_per_position() {
        let series = BarSeries::from_bars("NIFTY", Timeframe::Minute5, path(&RISING)).unwrap();
        let mut s = strategy(config());

        assert!(s.on_bar(&series).is_some());
        assert!(s.on_bar(&series).is_none());
        assert!(s.state().in_position);

        s.on_exit();
        assert!(s.on_bar(&series).is_some());
        assert_eq!(s.state().signals_generated, 2);
    }

    #[test]
    fn test_direction_filter() {
        let bars = path(&RISING);
        let mut s = strategy(BreakoutConfig {
            allow_up: false,
            ..config()
        });
        assert!(s.evaluate("NIFTY", &bars, &bars).is_none());
    }

    #[test]
    fn test_warmup() {
        let bars = path(&RISING[..4]);
        let mut s = strategy(config());
        assert_eq!(s.warmup_period(), 5);
        assert!(s.evaluate("NIFTY", &bars, &bars).is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(BreakoutConfig::default().validate().is_ok());
        let bad = BreakoutConfig {
            rsi_ignore_below: 90.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let none = BreakoutConfig {
            allow_up: false,
            allow_down: false,
            ..Default::default()
        };
        assert!(none.validate().is_err());
        let stop = BreakoutConfig {
            levels: LevelConfig {
                stop: StopMethod::FixedPercent { percent: dec!(1) },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(SwingBreakoutStrategy::new(stop).is_ok());
    }
}
