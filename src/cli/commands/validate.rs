//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use swing_config::load_config;

use crate::cli::ValidateArgs;

pub async fn run(args: ValidateArgs, config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Market: {} ({})", config.market.symbol, config.market.timezone);
            println!("First candle: {}", config.market.first_candle_time);
            println!(
                "Stop timeframe: {}  pivot {}/{}",
                config.exit.stop_timeframe,
                config.exit.stop_pivot.left_bars,
                config.exit.stop_pivot.right_bars
            );
            println!("Carry forward: {}", config.exit.carry_forward.enabled);
            println!("Holiday exit: {}", config.exit.holiday_exit.enabled);
            println!("Expiry exit: {}", config.exit.expiry_exit.enabled);
            println!("RSI exit: {}", config.exit.rsi_exit.enabled);

            if args.print {
                println!();
                println!("{}", config.to_toml()?);
            }
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
