use crate::core::clock::Clock;
use crate::core::rates::{RateError, RateSource, RateTable};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

struct CachedRates {
    table: Arc<RateTable>,
    cached_at: DateTime<Utc>,
}

/// Time-bounded cache in front of a [`RateSource`].
///
/// The check-and-refresh sequence runs under one lock, so at most one fetch
/// is in flight and callers arriving meanwhile wait for its result. The
/// fetch runs on its own task: if the caller that triggered it goes away,
/// the fetch still completes and fills the cache for everyone else.
#[derive(Clone)]
pub struct RateCache {
    source: Arc<dyn RateSource>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    slot: Arc<Mutex<Option<CachedRates>>>,
}

impl RateCache {
    pub fn new(source: Arc<dyn RateSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    fn is_fresh(&self, cached: &CachedRates) -> bool {
        self.clock.now() - cached.cached_at < self.ttl
    }

    /// Returns the cached table, fetching a new one when the cache is cold
    /// or the cached copy is at least `ttl` old. A failed fetch leaves the
    /// previous entry in place.
    pub async fn get_rates(&self) -> Result<Arc<RateTable>, RateError> {
        let mut slot = Arc::clone(&self.slot).lock_owned().await;
        if let Some(cached) = slot.as_ref()
            && self.is_fresh(cached)
        {
            debug!("Rate cache HIT (as of {})", cached.table.as_of);
            return Ok(Arc::clone(&cached.table));
        }
        debug!("Rate cache MISS, refreshing");

        let source = Arc::clone(&self.source);
        let clock = Arc::clone(&self.clock);
        let refresh = tokio::spawn(async move {
            let table = Arc::new(source.fetch().await?);
            *slot = Some(CachedRates {
                table: Arc::clone(&table),
                cached_at: clock.now(),
            });
            debug!("Rate cache PUT ({} rates)", table.len());
            Ok::<_, RateError>(table)
        });

        refresh.await.map_err(|e| {
            RateError::UpstreamUnavailable(format!("Rate refresh task failed: {e}"))
        })?
    }

    /// Current cached table, regardless of age, without fetching.
    pub async fn cached(&self) -> Option<Arc<RateTable>> {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|cached| Arc::clone(&cached.table))
    }

    /// Drops the cached table so the next read fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
        debug!("Rate cache CLEAR");
    }
}
