//! Time-boxed cache over a [`DataSource`]

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::Appointment;
use crate::source::DataSource;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// One successful fetch and when it happened
#[derive(Debug, Clone)]
pub struct CachedDataset {
    pub data: Arc<Vec<Appointment>>,
    pub fetched_at: Instant,
}

impl CachedDataset {
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

pub struct DatasetCache<S> {
    source: S,
    ttl: Duration,
    cached: RwLock<Option<CachedDataset>>,
}

impl<S: DataSource> DatasetCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: RwLock::new(None),
        }
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    pub async fn get(&self) -> Result<Arc<Vec<Appointment>>> {
        self.get_at(Instant::now()).await
    }

    /// Return the cached table if still valid at `now`, refetching otherwise.
    /// Failed fetches are not cached.
    pub async fn get_at(&self, now: Instant) -> Result<Arc<Vec<Appointment>>> {
        {
            let cache = self.cached.read().await;
            if let Some(entry) = cache.as_ref() {
                if entry.is_fresh(now, self.ttl) {
                    return Ok(entry.data.clone());
                }
            }
        }

        let mut cache = self.cached.write().await;
        // another request may have refreshed while we waited for the lock
        if let Some(entry) = cache.as_ref() {
            if entry.is_fresh(now, self.ttl) {
                return Ok(entry.data.clone());
            }
        }

        match self.source.fetch().await {
            Ok(records) => {
                info!(
                    "Loaded {} appointments from {}",
                    records.len(),
                    self.source.describe()
                );
                let data = Arc::new(records);
                *cache = Some(CachedDataset {
                    data: data.clone(),
                    fetched_at: now,
                });
                Ok(data)
            }
            Err(e) => {
                warn!("Fetch from {} failed: {:#}", self.source.describe(), e);
                Err(e)
            }
        }
    }

    #[cfg(test)]
    async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}
