//! Position persistence.

use crate::error::StoreError;
use crate::types::{ExitReason, PositionContext, StopUpdate};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for the store that owns open positions.
///
/// The exit engine never writes here directly; the monitor applies its
/// stop updates and exit decisions in order.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Fetch an open position.
    async fn get_position(&self, id: Uuid) -> Result<PositionContext, StoreError>;

    /// Persist a stop update from the exit engine.
    ///
    /// Implementations must store the full result of
    /// [`PositionContext::apply`]: the new stop and the session it was set
    /// in. Dropping the session lets next-session recalibration run again
    /// over a stop tightened earlier that day.
    async fn apply_stop_update(&self, update: &StopUpdate) -> Result<(), StoreError>;

    /// Close a position.
    async fn record_exit(&self, id: Uuid, reason: ExitReason, price: f64)
        -> Result<(), StoreError>;

    /// All positions that have not been closed.
    async fn open_positions(&self) -> Result<Vec<PositionContext>, StoreError>;
}
