// src/lib.rs

pub mod builder;
pub mod checker;
pub mod config;
pub mod decrypter;
mod engine;
pub mod error;
pub mod jwk;
pub mod jwks;
pub mod metadata;
pub mod resolver;
pub mod secret;
pub mod verifier;

/// The public prelude for the `nila-jose` crate.
///
/// This module re-exports the most commonly used types for convenience.
pub mod prelude {
    pub use crate::builder::VerifierBuilder;
    pub use crate::config::VerifierConfig;
    pub use crate::error::NilaJoseError;
    pub use crate::jwk::{Jwk, JwkSet};
    pub use crate::jwks::{
        CachedJwksProvider, JwksProvider, JwksProviderBuilder, MemoryJwksProvider,
        MokaJwksCache, RemoteJwksProvider,
    };
    pub use crate::metadata::{ClientMetadata, IssuerMetadata};
    pub use crate::verifier::{IdTokenVerifier, JwtVerifier, UserInfoVerifier};
}
