//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "swingwatch")]
#[command(author, version, about = "Swing structure analysis and exit monitoring")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "SWINGWATCH_CONFIG")]
    pub config: PathBuf,

    /// Log level; defaults to the configured level
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print confirmed pivots, swing labels and trend for a bar file
    Analyze(AnalyzeArgs),
    /// Replay exits for one position over a bar file
    Replay(ReplayArgs),
    /// Monitor stored positions against a bar file until interrupted
    Monitor(MonitorArgs),
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Data file (CSV)
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol to read when the file holds several
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Bars before a pivot; overrides [pivot]
    #[arg(long)]
    pub left_bars: Option<usize>,

    /// Bars after a pivot; overrides [pivot]
    #[arg(long)]
    pub right_bars: Option<usize>,

    /// Print every bar, not only pivots
    #[arg(long)]
    pub all_bars: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct ReplayArgs {
    /// Data file (CSV) on the stop timeframe
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol to read when the file holds several
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Position direction (up/long/ce or down/short/pe); needed with --entry-index
    #[arg(short, long)]
    pub direction: Option<String>,

    /// Bar whose close is the entry; without it the first breakout signal is used
    #[arg(short, long)]
    pub entry_index: Option<usize>,

    /// Contract expiry (YYYY-MM-DD)
    #[arg(long)]
    pub expiry: Option<chrono::NaiveDate>,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the report as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct MonitorArgs {
    /// Data file (CSV) serving bars for every symbol
    #[arg(long)]
    pub data: PathBuf,

    /// Open positions as a JSON array
    #[arg(long)]
    pub positions: PathBuf,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub print: bool,
}
