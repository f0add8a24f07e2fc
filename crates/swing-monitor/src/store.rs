//! In-memory position store.

use async_trait::async_trait;
use std::collections::HashMap;
use swing_core::{ExitReason, PositionContext, PositionStore, StopUpdate, StoreError};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Record {
    position: PositionContext,
    exit: Option<(ExitReason, f64)>,
}

/// [`PositionStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryPositionStore {
    records: RwLock<HashMap<Uuid, Record>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an open position.
    pub async fn insert(&self, position: PositionContext) {
        self.records.write().await.insert(
            position.id,
            Record {
                position,
                exit: None,
            },
        );
    }

    /// Exit reason and price of a closed position.
    pub async fn exit_of(&self, id: Uuid) -> Option<(ExitReason, f64)> {
        self.records.read().await.get(&id).and_then(|r| r.exit)
    }

    async fn with_open<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Record) -> T,
    ) -> Result<T, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::PositionNotFound(id.to_string()))?;
        if record.exit.is_some() {
            return Err(StoreError::AlreadyClosed(id.to_string()));
        }
        Ok(f(record))
    }
}

#[async_trait]
impl PositionStore for MemoryPositionStore {
    async fn get_position(&self, id: Uuid) -> Result<PositionContext, StoreError> {
        self.with_open(id, |r| r.position.clone()).await
    }

    async fn apply_stop_update(&self, update: &StopUpdate) -> Result<(), StoreError> {
        self.with_open(update.position_id, |r| r.position.apply(update))
            .await
    }

    async fn record_exit(
        &self,
        id: Uuid,
        reason: ExitReason,
        price: f64,
    ) -> Result<(), StoreError> {
        self.with_open(id, |r| r.exit = Some((reason, price))).await
    }

    async fn open_positions(&self) -> Result<Vec<PositionContext>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.exit.is_none())
            .map(|r| r.position.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use swing_core::{Direction, StopRule};

    fn position() -> PositionContext {
        PositionContext {
            id: Uuid::new_v4(),
            symbol: "NIFTY".to_string(),
            direction: Direction::Up,
            entry_price: 22000.0,
            entry_swing_high: None,
            entry_swing_low: Some(21900.0),
            stop_level: 21900.0,
            target_level: None,
            entry_rsi: None,
            expiry_date: None,
            carry_forward_enabled: true,
            entry_trade_day: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            stop_updated_on: None,
        }
    }

    #[tokio::test]
    async fn test_stop_update_records_session() {
        let store = MemoryPositionStore::new();
        let pos = position();
        store.insert(pos.clone()).await;

        let day = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        store
            .apply_stop_update(&StopUpdate {
                position_id: pos.id,
                previous: 21900.0,
                new_stop: 21850.0,
                rule: StopRule::NextDayRecalibration,
                trade_day: day,
            })
            .await
            .unwrap();

        let stored = store.get_position(pos.id).await.unwrap();
        assert_eq!(stored.stop_level, 21850.0);
        assert_eq!(stored.stop_updated_on, Some(day));
    }

    #[tokio::test]
    async fn test_tightening_records_session() {
        let store = MemoryPositionStore::new();
        let pos = position();
        store.insert(pos.clone()).await;

        let day = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        store
            .apply_stop_update(&StopUpdate {
                position_id: pos.id,
                previous: 21900.0,
                new_stop: 21960.0,
                rule: StopRule::SwingTightening,
                trade_day: day,
            })
            .await
            .unwrap();

        let stored = store.get_position(pos.id).await.unwrap();
        assert_eq!(stored.stop_level, 21960.0);
        assert_eq!(stored.stop_updated_on, Some(day));
    }

    #[tokio::test]
    async fn test_exit_closes_position() {
        let store = MemoryPositionStore::new();
        let pos = position();
        store.insert(pos.clone()).await;
        assert_eq!(store.open_positions().await.unwrap().len(), 1);

        store.record_exit(pos.id, ExitReason::Target, 22100.0).await.unwrap();
        assert_eq!(store.exit_of(pos.id).await, Some((ExitReason::Target, 22100.0)));
        assert!(store.open_positions().await.unwrap().is_empty());

        assert_eq!(
            store.get_position(pos.id).await.unwrap_err(),
            StoreError::AlreadyClosed(pos.id.to_string())
        );
        assert!(store.record_exit(pos.id, ExitReason::Stoploss, 0.0).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_position() {
        let store = MemoryPositionStore::new();
        let update = StopUpdate {
            position_id: Uuid::new_v4(),
            previous: 0.0,
            new_stop: 1.0,
            rule: StopRule::SwingTightening,
            trade_day: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        };
        assert!(matches!(
            store.apply_stop_update(&update).await,
            Err(StoreError::PositionNotFound(_))
        ));
    }
}
