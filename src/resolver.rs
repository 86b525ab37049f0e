// src/resolver.rs

use crate::error::NilaJoseError;
use crate::jwk::JwkSet;
use crate::jwks::JwksProvider;
use crate::secret::jose_secret_key;
use std::sync::Arc;
use tracing::debug;

/// Chooses the key material to verify (or decrypt) a token with, based on the
/// token's declared algorithm and key id.
pub struct KeyResolver {
    jwks_provider: Arc<dyn JwksProvider>,
    client_secret: Option<String>,
}

impl KeyResolver {
    pub fn new(jwks_provider: Arc<dyn JwksProvider>, client_secret: Option<String>) -> Self {
        Self {
            jwks_provider,
            client_secret,
        }
    }

    /// Resolves the candidate signing keys for a token header.
    ///
    /// Symmetric (`HS*`) algorithms derive a one-key set from the client
    /// secret without touching the key set store. Asymmetric algorithms with
    /// a `kid` select `(use=sig, kid)` from the store, reloading it once on a
    /// miss before giving up; without a `kid` the store's entire current set
    /// is returned unfiltered (keys are not narrowed to `use=sig` in that
    /// branch, matching the kid-present/kid-absent asymmetry of established
    /// relying-party implementations).
    pub async fn signing_key_set(
        &self,
        alg: &str,
        kid: Option<&str>,
    ) -> Result<JwkSet, NilaJoseError> {
        if !alg.starts_with("HS") {
            return match kid {
                Some(kid) => self.jwk_set_from_kid(kid).await,
                None => self.jwks_provider.get_jwks().await,
            };
        }

        let secret = self
            .client_secret
            .as_deref()
            .ok_or(NilaJoseError::MissingClientSecret)?;

        Ok(JwkSet::single(jose_secret_key(secret, None)))
    }

    /// At most one reload per verification call: a kid still missing from the
    /// refreshed set fails permanently for this call.
    async fn jwk_set_from_kid(&self, kid: &str) -> Result<JwkSet, NilaJoseError> {
        let jwks = self.jwks_provider.get_jwks().await?;
        if let Some(jwk) = jwks.select(Some("sig"), Some(kid)) {
            return Ok(JwkSet::single(jwk.clone()));
        }

        debug!(kid, "kid not found in the current key set, forcing a reload");
        self.jwks_provider.reload().await?;

        let jwks = self.jwks_provider.get_jwks().await?;
        jwks.select(Some("sig"), Some(kid))
            .map(|jwk| JwkSet::single(jwk.clone()))
            .ok_or_else(|| NilaJoseError::KeyNotFound(kid.to_string()))
    }

    /// Resolves the candidate decryption keys for an encrypted token header.
    ///
    /// Asymmetric key-management algorithms (`RSA*`, `ECDH*`) decrypt with
    /// the client-held key set, use unrestricted. Symmetric key management
    /// derives an oct key from the client secret, sized by `enc` for direct
    /// encryption and by `alg` otherwise.
    pub async fn decryption_key_set(
        &self,
        alg: &str,
        enc: &str,
    ) -> Result<JwkSet, NilaJoseError> {
        if alg.starts_with("RSA") || alg.starts_with("ECDH") {
            return self.jwks_provider.get_jwks().await;
        }

        let secret = self.client_secret.as_deref().unwrap_or("");
        let sizing_alg = if alg == "dir" { enc } else { alg };
        Ok(JwkSet::single(jose_secret_key(secret, Some(sizing_alg))))
    }
}
