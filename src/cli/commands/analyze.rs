//! Swing analysis command.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use swing_structure::{LabeledPivot, PivotConfig, SwingAnalyzer, SwingPoints, TrendState};
use tracing::info;

use super::{load, load_bars};
use crate::cli::{AnalyzeArgs, OutputFormat};

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    bars: usize,
    confirmed_through: Option<usize>,
    pivots: &'a [LabeledPivot],
    swing_points: SwingPoints,
    trend: TrendState,
}

pub async fn run(args: AnalyzeArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let bars = load_bars(&args.data, args.symbol.as_deref(), &config).await?;

    let pivot = PivotConfig::new(
        args.left_bars.unwrap_or(config.pivot.left_bars),
        args.right_bars.unwrap_or(config.pivot.right_bars),
    )?;
    info!(
        bars = bars.len(),
        left = pivot.left_bars,
        right = pivot.right_bars,
        "Analysing swing structure"
    );
    let analysis = SwingAnalyzer::new(pivot)?.analyze(&bars)?;

    if let OutputFormat::Json = args.output {
        let output = AnalyzeOutput {
            bars: bars.len(),
            confirmed_through: analysis.confirmed_through(),
            pivots: analysis.pivots(),
            swing_points: analysis.last_swing_points(),
            trend: analysis.final_trend(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let tz = config.market.timezone;
    let time = |ts: i64| {
        chrono::DateTime::from_timestamp_millis(ts)
            .map(|t| t.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| ts.to_string())
    };

    println!("{:>6}  {:<16}  {:<4}  {:>10}  {:<8}  {:>10}  {:>10}  {:<5}",
        "INDEX", "TIME", "KIND", "PRICE", "LABELS", "SUPPORT", "RESIST", "TREND");
    for (i, bar) in analysis.bars().iter().enumerate() {
        if bar.pivot.is_none() && !args.all_bars {
            continue;
        }
        let (kind, price, labels) = match &bar.pivot {
            Some(p) => (
                format!("{:?}", p.pivot.kind),
                format!("{:.2}", p.pivot.price),
                p.labels.names().join(","),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let level = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_default();
        println!("{:>6}  {:<16}  {:<4}  {:>10}  {:<8}  {:>10}  {:>10}  {:<5}",
            i,
            time(bar.timestamp),
            kind,
            price,
            labels,
            level(bar.trend.support),
            level(bar.trend.resistance),
            bar.trend.trend,
        );
    }

    let trend = analysis.final_trend();
    let points = analysis.last_swing_points();
    println!();
    println!("Bars: {}  confirmed through: {:?}", bars.len(), analysis.confirmed_through());
    println!("Trend: {}  support: {:?}  resistance: {:?}", trend.trend, trend.support, trend.resistance);
    for (name, point) in [("HH", points.hh), ("LH", points.lh), ("HL", points.hl), ("LL", points.ll)] {
        if let Some(p) = point {
            println!("Last {}: {:.2} at {} (bar {})", name, p.price, time(p.timestamp), p.index);
        }
    }

    Ok(())
}
