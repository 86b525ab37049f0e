// src/jwks/cache.rs

use super::JwksProvider;
use crate::error::NilaJoseError;
use crate::jwk::JwkSet;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// The cache store collaborator used by [`CachedJwksProvider`].
///
/// Implementations must be safe under concurrent access: multiple
/// verification calls may race to populate the same cache key.
#[async_trait]
pub trait JwksCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<JwkSet>, NilaJoseError>;

    async fn set(&self, key: &str, jwks: JwkSet, ttl: Duration) -> Result<(), NilaJoseError>;

    async fn delete(&self, key: &str) -> Result<(), NilaJoseError>;
}

#[derive(Clone)]
struct CachedEntry {
    jwks: JwkSet,
    ttl: Duration,
}

struct PerEntryExpiry;

impl moka::Expiry<String, CachedEntry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// The default in-process [`JwksCache`] backed by a moka future cache.
pub struct MokaJwksCache {
    cache: moka::future::Cache<String, CachedEntry>,
}

impl MokaJwksCache {
    pub fn new() -> Self {
        Self {
            // A verifier rarely talks to more than a handful of endpoints.
            cache: moka::future::Cache::builder()
                .max_capacity(16)
                .expire_after(PerEntryExpiry)
                .build(),
        }
    }
}

impl Default for MokaJwksCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JwksCache for MokaJwksCache {
    async fn get(&self, key: &str) -> Result<Option<JwkSet>, NilaJoseError> {
        Ok(self.cache.get(key).await.map(|entry| entry.jwks))
    }

    async fn set(&self, key: &str, jwks: JwkSet, ttl: Duration) -> Result<(), NilaJoseError> {
        self.cache
            .insert(key.to_string(), CachedEntry { jwks, ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), NilaJoseError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

/// Wraps another provider with a read-through cache.
///
/// `get_jwks` returns the cached set when present and delegates to the
/// wrapped provider otherwise, writing the result back with the configured
/// TTL. `reload` deletes the cache entry so the next `get_jwks` refetches.
pub struct CachedJwksProvider {
    provider: Arc<dyn JwksProvider>,
    cache: Arc<dyn JwksCache>,
    cache_key: String,
    ttl: Duration,
}

impl CachedJwksProvider {
    pub fn new(
        provider: Arc<dyn JwksProvider>,
        cache: Arc<dyn JwksCache>,
        cache_key: String,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            cache_key,
            ttl,
        }
    }
}

#[async_trait]
impl JwksProvider for CachedJwksProvider {
    async fn get_jwks(&self) -> Result<JwkSet, NilaJoseError> {
        if let Some(jwks) = self.cache.get(&self.cache_key).await? {
            debug!(key = %self.cache_key, "JWKS cache hit");
            return Ok(jwks);
        }

        debug!(key = %self.cache_key, "JWKS cache miss, delegating to the wrapped provider");
        let jwks = self.provider.get_jwks().await?;
        self.cache
            .set(&self.cache_key, jwks.clone(), self.ttl)
            .await?;
        Ok(jwks)
    }

    async fn reload(&self) -> Result<(), NilaJoseError> {
        self.cache.delete(&self.cache_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::Jwk;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts delegated fetches, and can change its answer between calls.
    struct CountingProvider {
        sets: Vec<JwkSet>,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(sets: Vec<JwkSet>) -> Self {
            Self {
                sets,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JwksProvider for CountingProvider {
        async fn get_jwks(&self) -> Result<JwkSet, NilaJoseError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.sets[call.min(self.sets.len() - 1)].clone())
        }

        async fn reload(&self) -> Result<(), NilaJoseError> {
            Ok(())
        }
    }

    fn set_with_kid(kid: &str) -> JwkSet {
        JwkSet::single(Jwk {
            kid: Some(kid.to_string()),
            ..Jwk::oct("AAAA".to_string())
        })
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let inner = Arc::new(CountingProvider::new(vec![set_with_kid("k1")]));
        let cached = CachedJwksProvider::new(
            inner.clone(),
            Arc::new(MokaJwksCache::new()),
            "jwks".to_string(),
            Duration::from_secs(60),
        );

        cached.get_jwks().await.unwrap();
        cached.get_jwks().await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reload_invalidates_and_the_next_read_refetches() {
        let inner = Arc::new(CountingProvider::new(vec![
            set_with_kid("k1"),
            set_with_kid("k2"),
        ]));
        let cached = CachedJwksProvider::new(
            inner.clone(),
            Arc::new(MokaJwksCache::new()),
            "jwks".to_string(),
            Duration::from_secs(60),
        );

        let first = cached.get_jwks().await.unwrap();
        assert_eq!(first.keys[0].kid.as_deref(), Some("k1"));

        cached.reload().await.unwrap();

        let second = cached.get_jwks().await.unwrap();
        assert_eq!(second.keys[0].kid.as_deref(), Some("k2"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
