//! Per-date weather cache
//!
//! Only successful lookups are stored, so a provider failure is retried by
//! the next request for the same date. Entries expire after a TTL and the
//! map is bounded; the oldest entry is evicted when it is full.

use super::{async_trait, WeatherProvider};
use crate::error::PredictionResult;
use crate::models::GeoPoint;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default lifetime of a cached answer (3 hours)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Default maximum number of cached (date, location) pairs
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

/// Configuration for the weather cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an answer is served before the provider is asked again
    pub ttl: Duration,
    /// Maximum number of entries held at once
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedCode {
    code: String,
    fetched_at: Instant,
}

/// Wraps a provider and memoizes its answers by (date, location)
pub struct CachedWeatherProvider {
    inner: Arc<dyn WeatherProvider>,
    entries: DashMap<(NaiveDate, String), CachedCode>,
    config: CacheConfig,
    hits: AtomicU64,
}

impl CachedWeatherProvider {
    pub fn new(inner: Arc<dyn WeatherProvider>) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    pub fn with_config(inner: Arc<dyn WeatherProvider>, config: CacheConfig) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    fn is_fresh(&self, entry: &CachedCode) -> bool {
        entry.fetched_at.elapsed() < self.config.ttl
    }

    /// Drop expired entries, then the oldest ones until there is room for one more
    fn make_room(&self) {
        self.entries.retain(|_, entry| entry.fetched_at.elapsed() < self.config.ttl);

        while !self.entries.is_empty() && self.entries.len() >= self.config.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().fetched_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for CachedWeatherProvider {
    async fn daily_condition(&self, date: NaiveDate, location: GeoPoint) -> PredictionResult<String> {
        let key = (date, location.to_string());

        let cached = self
            .entries
            .get(&key)
            .filter(|entry| self.is_fresh(entry.value()))
            .map(|entry| entry.value().code.clone());
        if let Some(code) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(date = %date, code = %code, "Weather cache hit");
            return Ok(code);
        }

        let code = self.inner.daily_condition(date, location).await?;
        if self.config.max_entries > 0 {
            self.make_room();
            self.entries.insert(
                key,
                CachedCode {
                    code: code.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(code)
    }
}
