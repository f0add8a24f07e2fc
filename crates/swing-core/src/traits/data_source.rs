//! Historical bar access.

use crate::error::DataError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of recorded bars for a symbol.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Bars opening within `[from, to]`, oldest first.
    async fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}
