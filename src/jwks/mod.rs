// src/jwks/mod.rs

//! Key set stores.
//!
//! A [`JwksProvider`] exposes the current key set and a way to force a
//! reload from its source. Three implementations are provided: a static
//! in-memory set, a remote store fetching from a JWKS endpoint on every call,
//! and a caching wrapper combining the two behaviors.

mod builder;
mod cache;
mod remote;

pub use builder::JwksProviderBuilder;
pub use cache::{CachedJwksProvider, JwksCache, MokaJwksCache};
pub use remote::RemoteJwksProvider;

use crate::error::NilaJoseError;
use crate::jwk::JwkSet;
use async_trait::async_trait;

/// A source of JSON Web Key Sets.
#[async_trait]
pub trait JwksProvider: Send + Sync {
    /// Returns the current key set. May perform I/O.
    async fn get_jwks(&self) -> Result<JwkSet, NilaJoseError>;

    /// Requests a reload of the keys from the source. For stores that fetch
    /// fresh on every [`get_jwks`](JwksProvider::get_jwks) call this is a
    /// no-op; for cached stores it invalidates the cached set.
    async fn reload(&self) -> Result<(), NilaJoseError>;
}

/// A static in-memory key set. `reload` is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryJwksProvider {
    jwks: JwkSet,
}

impl MemoryJwksProvider {
    pub fn new(jwks: JwkSet) -> Self {
        Self { jwks }
    }
}

#[async_trait]
impl JwksProvider for MemoryJwksProvider {
    async fn get_jwks(&self) -> Result<JwkSet, NilaJoseError> {
        Ok(self.jwks.clone())
    }

    async fn reload(&self) -> Result<(), NilaJoseError> {
        Ok(())
    }
}
