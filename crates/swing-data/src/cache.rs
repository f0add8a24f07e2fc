//! Bar history caching.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use swing_core::traits::BarSource;
use swing_core::{Bar, DataError, Timeframe};
use tokio::sync::Mutex;
use tracing::debug;

/// Cache key: one symbol and timeframe on one trading day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub day: NaiveDate,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, day: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            day,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    bars: Vec<Bar>,
    /// Start of the fetched range
    from: DateTime<Utc>,
    fetched_at: DateTime<Utc>,
}

/// Fetched bar histories with age-based eviction.
///
/// Entries older than the TTL are never returned. When full, inserting a
/// new key drops the oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryCache {
    entries: HashMap<CacheKey, Entry>,
    ttl: Duration,
    max_entries: usize,
}

impl HistoryCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Bars cached for `key`, if fetched within the TTL before `now`.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&[Bar]> {
        self.fresh(key, now).map(|e| e.bars.as_slice())
    }

    fn fresh(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&Entry> {
        self.entries
            .get(key)
            .filter(|e| now - e.fetched_at < self.ttl)
    }

    /// Store bars fetched from `from` onward at `now`.
    pub fn put(&mut self, key: CacheKey, bars: Vec<Bar>, from: DateTime<Utc>, now: DateTime<Utc>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.fetched_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            Entry {
                bars,
                from,
                fetched_at: now,
            },
        );
    }

    /// Drop expired entries; returns how many were removed.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| now - e.fetched_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// [`BarSource`] that serves repeated requests from a [`HistoryCache`].
///
/// Requests for the same symbol, timeframe and exchange day within the TTL
/// share one fetch, provided the cached range starts no later than the
/// requested one.
pub struct CachedBarSource<S> {
    inner: S,
    tz: Tz,
    cache: Mutex<HistoryCache>,
}

impl<S: BarSource> CachedBarSource<S> {
    pub fn new(inner: S, tz: Tz, cache: HistoryCache) -> Self {
        Self {
            inner,
            tz,
            cache: Mutex::new(cache),
        }
    }

    pub async fn evict_expired(&self) -> usize {
        self.cache.lock().await.evict_expired(Utc::now())
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let key = CacheKey::new(symbol, timeframe, to.with_timezone(&self.tz).date_naive());
        let (from_ms, to_ms) = (from.timestamp_millis(), to.timestamp_millis());

        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.fresh(&key, now).filter(|e| e.from <= from) {
                let bars: Vec<Bar> = entry
                    .bars
                    .iter()
                    .filter(|b| (from_ms..=to_ms).contains(&b.timestamp))
                    .copied()
                    .collect();
                if !bars.is_empty() {
                    debug!(symbol, %timeframe, "Bar cache hit");
                    return Ok(bars);
                }
            }
        }

        let bars = self.inner.get_bars(symbol, timeframe, from, to).await?;
        self.cache.lock().await.put(key, bars.clone(), from, now);
        Ok(bars)
    }
}

#[async_trait]
impl<S: BarSource> BarSource for CachedBarSource<S> {
    async fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        self.fetch(symbol, timeframe, from, to, Utc::now()).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
