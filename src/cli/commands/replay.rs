//! Exit replay command.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use swing_config::AppConfig;
use swing_core::{Bar, BarSeries, Direction, EntrySignal, Indicator, Strategy};
use swing_data::FixedHolidayCalendar;
use swing_exit::{trade_day, ExitEngine};
use swing_indicators::Rsi;
use swing_replay::ReplayEngine;
use swing_strategies::{LevelCalculator, SwingBreakoutStrategy};
use swing_structure::{PivotKind, SwingAnalyzer};
use tracing::info;

use super::{load, load_bars};
use crate::cli::{OutputFormat, ReplayArgs};

pub async fn run(args: ReplayArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let bars = load_bars(&args.data, args.symbol.as_deref(), &config).await?;
    let symbol = args
        .symbol
        .clone()
        .unwrap_or_else(|| config.market.symbol.clone());

    let (index, signal) = match args.entry_index {
        Some(index) => {
            let direction: Direction = args
                .direction
                .as_deref()
                .context("--direction is required with --entry-index")?
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            (index, entry_at(&config, &symbol, &bars, index, direction)?)
        }
        None => first_breakout(&config, &symbol, &bars)?,
    };
    info!(
        index,
        direction = %signal.direction,
        price = signal.price,
        stop = signal.stop_level,
        target = ?signal.target_level,
        "Replaying position"
    );

    let calendar = Arc::new(FixedHolidayCalendar::new(config.market.holidays.clone()));
    let tz = config.market.timezone;
    let entry_time = signal.datetime() + config.exit.stop_timeframe.duration();
    let entry_day = trade_day(calendar.as_ref(), entry_time.with_timezone(&tz).date_naive());
    let position = signal.into_position(entry_day, args.expiry, config.exit.carry_forward.enabled);

    let engine = ExitEngine::new(config.exit_config(), calendar)?;
    let report = ReplayEngine::new(engine, tz).run(position, &bars, &bars, entry_time)?;

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)?;
        info!("Report saved to {:?}", save_path);
    }

    Ok(())
}

/// Entry at the close of bar `index` with levels from the entry settings.
fn entry_at(
    config: &AppConfig,
    symbol: &str,
    bars: &[Bar],
    index: usize,
    direction: Direction,
) -> Result<EntrySignal> {
    let history = bars
        .get(..=index)
        .with_context(|| format!("--entry-index {} is beyond the {} bars loaded", index, bars.len()))?;
    let entry = &history[history.len() - 1];

    let analysis = SwingAnalyzer::new(config.entry.pivot)?.analyze(history).ok();
    let latest = |kind| {
        analysis
            .as_ref()
            .and_then(|a| a.latest_pivot(kind))
            .map(|p| p.pivot.price)
    };
    let (swing_high, swing_low) = (latest(PivotKind::High), latest(PivotKind::Low));
    let extreme = match direction {
        Direction::Up => swing_low,
        Direction::Down => swing_high,
    };

    let levels = LevelCalculator::new(config.entry.levels)?
        .calculate(direction, entry.close, history, extreme)?;
    let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
    let rsi = Rsi::with_smoothing(config.entry.rsi_period, config.entry.rsi_smoothing)?
        .latest(&closes)
        .ok();

    Ok(EntrySignal {
        symbol: symbol.to_string(),
        direction,
        timestamp: entry.timestamp,
        price: entry.close,
        breakout_level: entry.close,
        rsi,
        swing_high,
        swing_low,
        stop_level: levels.stop,
        target_level: levels.target,
    })
}

/// First breakout signal found by walking the bars forward.
fn first_breakout(config: &AppConfig, symbol: &str, bars: &[Bar]) -> Result<(usize, EntrySignal)> {
    let mut strategy = SwingBreakoutStrategy::new(config.entry.clone())?;
    let mut series = BarSeries::new(symbol, config.exit.stop_timeframe);

    for (index, bar) in bars.iter().enumerate() {
        series.push(*bar)?;
        if let Some(signal) = strategy.on_bar(&series) {
            return Ok((index, signal));
        }
    }
    anyhow::bail!("No breakout signal in {} bars; pass --entry-index and --direction", bars.len())
}
