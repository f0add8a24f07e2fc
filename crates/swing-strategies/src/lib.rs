//! Entry side of the swing system.
//!
//! - [`SwingBreakoutStrategy`]: swing breakout entries with an RSI gate
//! - [`LevelCalculator`]: initial stop and target, rounded to the tick size

mod breakout;
mod levels;

pub use breakout::{BreakoutConfig, SwingBreakoutStrategy};
pub use levels::{LevelCalculator, LevelConfig, Levels, StopMethod, TargetMethod};
