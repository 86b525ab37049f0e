// src/builder.rs

//! Builds fully-configured verifiers from issuer and client metadata.
//!
//! The builder is the mechanical layer between OIDC discovery/registration
//! documents and the verifier configuration: it wires the token-type-specific
//! expected-algorithm fields, resolves the issuer key source (`jwks` vs
//! `jwks_uri`) and validates the encrypted-response declaration.

use crate::config::VerifierConfig;
use crate::decrypter::TokenDecrypter;
use crate::error::NilaJoseError;
use crate::jwks::{JwksCache, JwksProvider, JwksProviderBuilder};
use crate::metadata::{ClientMetadata, IssuerMetadata};
use crate::verifier::{IdTokenVerifier, JwtVerifier, UserInfoVerifier};
use std::sync::Arc;
use std::time::Duration;

/// Builds the verifier variants from OIDC metadata.
///
/// One builder can produce all three verifiers; pass a shared provider via
/// [`with_jwks_provider`](Self::with_jwks_provider) to let them reuse one
/// key-set cache.
pub struct VerifierBuilder {
    issuer_metadata: IssuerMetadata,
    client_metadata: ClientMetadata,
    clock_tolerance: u64,
    aad_issuer_validation: bool,
    expected_azp: Option<String>,
    jwks_provider: Option<Arc<dyn JwksProvider>>,
    jwks_cache: Option<Arc<dyn JwksCache>>,
    cache_ttl: Option<Duration>,
    http_client: Option<reqwest::Client>,
    decrypter: Option<Arc<dyn TokenDecrypter>>,
}

impl VerifierBuilder {
    pub fn new(issuer_metadata: IssuerMetadata, client_metadata: ClientMetadata) -> Self {
        Self {
            issuer_metadata,
            client_metadata,
            clock_tolerance: 0,
            aad_issuer_validation: false,
            expected_azp: None,
            jwks_provider: None,
            jwks_cache: None,
            cache_ttl: None,
            http_client: None,
            decrypter: None,
        }
    }

    pub fn with_clock_tolerance(mut self, seconds: u64) -> Self {
        self.clock_tolerance = seconds;
        self
    }

    pub fn with_aad_issuer_validation(mut self, enabled: bool) -> Self {
        self.aad_issuer_validation = enabled;
        self
    }

    pub fn with_expected_azp(mut self, azp: impl Into<String>) -> Self {
        self.expected_azp = Some(azp.into());
        self
    }

    /// Overrides the issuer key source entirely, bypassing the metadata.
    pub fn with_jwks_provider(mut self, provider: Arc<dyn JwksProvider>) -> Self {
        self.jwks_provider = Some(provider);
        self
    }

    /// Caches remote key sets in the given store.
    pub fn with_jwks_cache(mut self, cache: Arc<dyn JwksCache>) -> Self {
        self.jwks_cache = Some(cache);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Wires a decryption engine for encrypted responses.
    pub fn with_decrypter(mut self, decrypter: Arc<dyn TokenDecrypter>) -> Self {
        self.decrypter = Some(decrypter);
        self
    }

    pub fn build_id_token_verifier(&self) -> Result<IdTokenVerifier, NilaJoseError> {
        let config = self.base_config(
            self.client_metadata.id_token_signed_response_alg.as_deref(),
        );
        let decrypter = self.resolve_decrypter(
            "id_token",
            self.client_metadata.id_token_encrypted_response_alg.as_deref(),
            self.client_metadata.id_token_encrypted_response_enc.as_deref(),
        )?;

        let mut verifier = IdTokenVerifier::new(config, self.build_jwks_provider()?);
        if let Some(decrypter) = decrypter {
            verifier = verifier.with_decrypter(decrypter);
        }
        Ok(verifier)
    }

    /// Access tokens carry no registered expected-algorithm metadata.
    pub fn build_access_token_verifier(&self) -> Result<JwtVerifier, NilaJoseError> {
        let config = self.base_config(None);
        Ok(JwtVerifier::new(config, self.build_jwks_provider()?))
    }

    pub fn build_userinfo_verifier(&self) -> Result<UserInfoVerifier, NilaJoseError> {
        let config = self.base_config(
            self.client_metadata.userinfo_signed_response_alg.as_deref(),
        );
        let decrypter = self.resolve_decrypter(
            "userinfo",
            self.client_metadata.userinfo_encrypted_response_alg.as_deref(),
            self.client_metadata.userinfo_encrypted_response_enc.as_deref(),
        )?;

        let mut verifier = UserInfoVerifier::new(config, self.build_jwks_provider()?);
        if let Some(decrypter) = decrypter {
            verifier = verifier.with_decrypter(decrypter);
        }
        Ok(verifier)
    }

    fn base_config(&self, expected_alg: Option<&str>) -> VerifierConfig {
        let mut config = VerifierConfig::new(
            &self.issuer_metadata.issuer,
            &self.client_metadata.client_id,
        )
        .with_clock_tolerance(self.clock_tolerance)
        .with_auth_time_required(self.client_metadata.require_auth_time)
        .with_aad_issuer_validation(self.aad_issuer_validation);

        if let Some(secret) = &self.client_metadata.client_secret {
            config = config.with_client_secret(secret);
        }
        if let Some(alg) = expected_alg {
            config = config.with_expected_alg(alg);
        }
        if let Some(azp) = &self.expected_azp {
            config = config.with_expected_azp(azp);
        }

        config
    }

    fn build_jwks_provider(&self) -> Result<Arc<dyn JwksProvider>, NilaJoseError> {
        if let Some(provider) = &self.jwks_provider {
            return Ok(provider.clone());
        }

        let mut builder = JwksProviderBuilder::new();
        if let Some(jwks) = &self.issuer_metadata.jwks {
            builder = builder.jwks(jwks.clone());
        }
        if let Some(uri) = &self.issuer_metadata.jwks_uri {
            builder = builder.jwks_uri(uri)?;
        }
        if let Some(http_client) = &self.http_client {
            builder = builder.http_client(http_client.clone());
        }
        if let Some(cache) = &self.jwks_cache {
            builder = builder.cache(cache.clone());
        }
        if let Some(ttl) = self.cache_ttl {
            builder = builder.cache_ttl(ttl);
        }
        builder.build()
    }

    /// An encrypted-response declaration needs both members of its pair, and
    /// a decryption engine to honor it.
    fn resolve_decrypter(
        &self,
        token_type: &str,
        enc_alg: Option<&str>,
        enc: Option<&str>,
    ) -> Result<Option<Arc<dyn TokenDecrypter>>, NilaJoseError> {
        match (enc_alg, enc) {
            (None, None) => Ok(self.decrypter.clone()),
            (Some(_), Some(_)) => match &self.decrypter {
                Some(decrypter) => Ok(Some(decrypter.clone())),
                None => Err(NilaJoseError::DecryptionUnsupported),
            },
            _ => Err(NilaJoseError::InvalidConfiguration(format!(
                "Invalid values received for {token_type}_encrypted_response_* metadata",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::{Jwk, JwkSet};

    fn issuer_metadata() -> IssuerMetadata {
        IssuerMetadata::new("https://issuer.com")
    }

    #[test]
    fn builds_the_three_verifiers_from_plain_metadata() {
        let builder = VerifierBuilder::new(issuer_metadata(), ClientMetadata::new("client-id"));
        assert!(builder.build_id_token_verifier().is_ok());
        assert!(builder.build_access_token_verifier().is_ok());
        assert!(builder.build_userinfo_verifier().is_ok());
    }

    #[test]
    fn wires_the_token_type_specific_expected_alg() {
        let client = ClientMetadata {
            id_token_signed_response_alg: Some("PS256".to_string()),
            userinfo_signed_response_alg: Some("ES256".to_string()),
            ..ClientMetadata::new("client-id")
        };
        let builder = VerifierBuilder::new(issuer_metadata(), client);

        let id_token = builder.build_id_token_verifier().unwrap();
        assert_eq!(id_token.config().expected_alg(), Some("PS256"));

        let userinfo = builder.build_userinfo_verifier().unwrap();
        assert_eq!(userinfo.config().expected_alg(), Some("ES256"));

        let access_token = builder.build_access_token_verifier().unwrap();
        assert_eq!(access_token.config().expected_alg(), None);
    }

    #[test]
    fn inline_jwks_and_jwks_uri_are_mutually_exclusive() {
        let issuer = IssuerMetadata {
            jwks_uri: Some("https://issuer.com/jwks".to_string()),
            jwks: Some(JwkSet::single(Jwk::oct("AAAA".to_string()))),
            ..issuer_metadata()
        };
        let builder = VerifierBuilder::new(issuer, ClientMetadata::new("client-id"));
        assert!(matches!(
            builder.build_id_token_verifier(),
            Err(NilaJoseError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn half_declared_encryption_is_a_configuration_error() {
        let client = ClientMetadata {
            id_token_encrypted_response_alg: Some("RSA-OAEP".to_string()),
            ..ClientMetadata::new("client-id")
        };
        let builder = VerifierBuilder::new(issuer_metadata(), client);
        assert!(matches!(
            builder.build_id_token_verifier(),
            Err(NilaJoseError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn declared_encryption_without_an_engine_is_unsupported() {
        let client = ClientMetadata {
            id_token_encrypted_response_alg: Some("RSA-OAEP".to_string()),
            id_token_encrypted_response_enc: Some("A128CBC-HS256".to_string()),
            ..ClientMetadata::new("client-id")
        };
        let builder = VerifierBuilder::new(issuer_metadata(), client);
        assert!(matches!(
            builder.build_id_token_verifier(),
            Err(NilaJoseError::DecryptionUnsupported)
        ));
    }

    #[test]
    fn require_auth_time_flows_into_the_config() {
        let client = ClientMetadata {
            require_auth_time: true,
            ..ClientMetadata::new("client-id")
        };
        let builder = VerifierBuilder::new(issuer_metadata(), client);
        let verifier = builder.build_access_token_verifier().unwrap();
        assert!(verifier.config().auth_time_required());
    }
}
