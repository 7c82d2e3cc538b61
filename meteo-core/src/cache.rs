use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::assemble::DataAssembler;
use crate::catalog::ForecastModel;
use crate::model::ForecastBundle;

/// Time source for freshness checks, injectable so TTL transitions can be
/// tested without wall-clock waits.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry {
    bundle: ForecastBundle,
    fetched_at: DateTime<Utc>,
}

/// Memoizes assembled dataset pairs per model with a fixed TTL. Entries
/// are replaced wholesale; a half-assembled bundle is never observable.
pub struct ForecastCache {
    assembler: DataAssembler,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    // The lock is held across a refresh, so concurrent gets for a stale
    // key run exactly one assembly cycle.
    entries: Mutex<HashMap<ForecastModel, CacheEntry>>,
}

impl ForecastCache {
    pub fn new(assembler: DataAssembler, ttl: Duration) -> Self {
        Self::with_clock(assembler, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(assembler: DataAssembler, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            assembler,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached bundle for this model while it is fresh; otherwise
    /// assemble a new one, store it and return it.
    pub async fn get(&self, model: ForecastModel) -> ForecastBundle {
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get(&model) {
            if self.clock.now() - entry.fetched_at < self.ttl {
                return entry.bundle.clone();
            }
        }

        debug!(model = %model, "cache miss, assembling datasets");
        let bundle = self.assembler.assemble(model).await;
        entries.insert(
            model,
            CacheEntry { bundle: bundle.clone(), fetched_at: self.clock.now() },
        );
        bundle
    }

    /// Drop every entry regardless of freshness; the next `get` re-fetches.
    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }
}
