//! Session-scoped lookup caches (CEP → UF, CNPJ → UF).
//!
//! Keys are normalized to digits before every read and write. Both positive and
//! negative ("not found" or failed) outcomes are stored; negative entries expire
//! sooner so a transient failure is eventually retried. Capacity is bounded.

use crate::config::Config;
use crate::models::digits_only;
use crate::uf::Uf;
use moka::future::Cache;
use moka::Expiry;
use std::future::Future;
use std::time::{Duration, Instant};

/// Cached value: `Some(uf)` for a hit, `None` for a negative result.
pub type CachedUf = Option<Uf>;

/// Gives positive and negative entries different lifetimes.
struct LookupExpiry {
    positive_ttl: Duration,
    negative_ttl: Duration,
}

impl LookupExpiry {
    fn ttl_for(&self, value: &CachedUf) -> Duration {
        if value.is_some() {
            self.positive_ttl
        } else {
            self.negative_ttl
        }
    }
}

impl Expiry<String, CachedUf> for LookupExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUf,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.ttl_for(value))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUf,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(self.ttl_for(value))
    }
}

#[derive(Clone)]
pub struct LookupCache {
    name: &'static str,
    inner: Cache<String, CachedUf>,
}

impl LookupCache {
    pub fn new(
        name: &'static str,
        max_capacity: u64,
        positive_ttl: Duration,
        negative_ttl: Duration,
    ) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(LookupExpiry {
                positive_ttl,
                negative_ttl,
            })
            .build();
        Self { name, inner }
    }

    pub fn from_config(name: &'static str, config: &Config) -> Self {
        Self::new(
            name,
            config.cache_max_capacity,
            config.cache_ttl,
            config.cache_negative_ttl,
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `None` when absent, `Some(None)` for a cached negative result.
    pub async fn get(&self, key: &str) -> Option<CachedUf> {
        self.inner.get(&digits_only(key)).await
    }

    pub async fn set(&self, key: &str, value: CachedUf) {
        self.inner.insert(digits_only(key), value).await;
    }

    /// Returns the cached value or runs `lookup` and caches its outcome.
    ///
    /// Concurrent callers asking for the same missing key share a single `lookup`.
    pub async fn get_or_lookup<F>(&self, key: &str, lookup: F) -> CachedUf
    where
        F: Future<Output = CachedUf>,
    {
        let key = digits_only(key);
        if let Some(cached) = self.inner.get(&key).await {
            tracing::debug!("{} cache hit for {}: {:?}", self.name, key, cached);
            return cached;
        }
        self.inner.get_with(key, lookup).await
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(&digits_only(key)).await;
    }

    pub fn invalidate_all(&self) {
        tracing::info!("{} cache invalidated", self.name);
        self.inner.invalidate_all();
    }
}
