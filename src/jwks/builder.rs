// src/jwks/builder.rs

use super::{CachedJwksProvider, JwksCache, JwksProvider, MemoryJwksProvider, RemoteJwksProvider};
use crate::error::NilaJoseError;
use crate::jwk::JwkSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// Assembles a [`JwksProvider`] from either a static key set or a JWKS
/// endpoint, optionally wrapped in a cache.
#[derive(Default)]
pub struct JwksProviderBuilder {
    jwks: Option<JwkSet>,
    jwks_uri: Option<Url>,
    http_client: Option<reqwest::Client>,
    cache: Option<Arc<dyn JwksCache>>,
    cache_ttl: Option<Duration>,
}

impl JwksProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a static in-memory key set. Mutually exclusive with
    /// [`jwks_uri`](Self::jwks_uri).
    pub fn jwks(mut self, jwks: JwkSet) -> Self {
        self.jwks = Some(jwks);
        self
    }

    /// Fetches keys from a remote JWKS endpoint. Mutually exclusive with
    /// [`jwks`](Self::jwks).
    pub fn jwks_uri(mut self, uri: &str) -> Result<Self, NilaJoseError> {
        let parsed = Url::parse(uri).map_err(|e| NilaJoseError::InvalidUrl(e.to_string()))?;
        self.jwks_uri = Some(parsed);
        Ok(self)
    }

    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Wraps the remote provider in a read-through cache. Ignored for static
    /// key sets, which need no caching.
    pub fn cache(mut self, cache: Arc<dyn JwksCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// TTL for cached key sets. Defaults to 24 hours.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn build(self) -> Result<Arc<dyn JwksProvider>, NilaJoseError> {
        if self.jwks.is_some() && self.jwks_uri.is_some() {
            return Err(NilaJoseError::InvalidConfiguration(
                "You should provide only one between remote or static jwks".to_string(),
            ));
        }

        let Some(uri) = self.jwks_uri else {
            return Ok(Arc::new(MemoryJwksProvider::new(
                self.jwks.unwrap_or_default(),
            )));
        };

        let remote = Arc::new(RemoteJwksProvider::new(
            self.http_client.unwrap_or_default(),
            uri.clone(),
        ));

        match self.cache {
            Some(cache) => Ok(Arc::new(CachedJwksProvider::new(
                remote,
                cache,
                base64_url::encode(uri.as_str()),
                self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
            ))),
            None => Ok(remote),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::Jwk;
    use crate::jwks::MokaJwksCache;

    #[tokio::test]
    async fn builds_a_memory_provider_by_default() {
        let provider = JwksProviderBuilder::new().build().unwrap();
        assert!(provider.get_jwks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn builds_a_memory_provider_from_a_static_set() {
        let provider = JwksProviderBuilder::new()
            .jwks(JwkSet::single(Jwk::oct("AAAA".to_string())))
            .build()
            .unwrap();
        assert_eq!(provider.get_jwks().await.unwrap().keys.len(), 1);
    }

    #[test]
    fn static_and_remote_sources_are_mutually_exclusive() {
        let result = JwksProviderBuilder::new()
            .jwks(JwkSet::default())
            .jwks_uri("https://issuer.com/jwks.json")
            .unwrap()
            .build();
        assert!(matches!(
            result,
            Err(NilaJoseError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn invalid_uri_is_rejected() {
        assert!(matches!(
            JwksProviderBuilder::new().jwks_uri("not a url"),
            Err(NilaJoseError::InvalidUrl(_))
        ));
    }

    #[test]
    fn remote_with_cache_builds() {
        let result = JwksProviderBuilder::new()
            .jwks_uri("https://issuer.com/jwks.json")
            .unwrap()
            .cache(Arc::new(MokaJwksCache::new()))
            .cache_ttl(Duration::from_secs(600))
            .build();
        assert!(result.is_ok());
    }
}
