//! Pivot window configuration.

use serde::{Deserialize, Serialize};
use swing_core::ConfigError;

/// Look-back and look-ahead of the pivot window, in bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotConfig {
    /// Bars before the pivot that it must dominate
    pub left_bars: usize,
    /// Bars after the pivot that it must dominate; also the confirmation lag
    pub right_bars: usize,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            left_bars: 3,
            right_bars: 3,
        }
    }
}

impl PivotConfig {
    pub fn new(left_bars: usize, right_bars: usize) -> Result<Self, ConfigError> {
        let config = Self {
            left_bars,
            right_bars,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.left_bars == 0 {
            return Err(ConfigError::InvalidWindow("left_bars must be at least 1".into()));
        }
        if self.right_bars == 0 {
            return Err(ConfigError::InvalidWindow("right_bars must be at least 1".into()));
        }
        Ok(())
    }

    /// Width of the full window.
    pub fn window(&self) -> usize {
        self.left_bars + self.right_bars + 1
    }

    /// Fewest bars that can produce a single pivot.
    pub fn min_bars(&self) -> usize {
        self.window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window() {
        let config = PivotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window(), 7);
    }

    #[test]
    fn test_zero_sides_rejected() {
        assert!(matches!(
            PivotConfig::new(0, 2),
            Err(ConfigError::InvalidWindow(_))
        ));
        assert!(PivotConfig::new(2, 0).is_err());
        assert!(PivotConfig::new(1, 1).is_ok());
    }
}
