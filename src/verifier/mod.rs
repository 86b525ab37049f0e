// src/verifier/mod.rs

//! The token verifier variants.
//!
//! Three thin orchestrators share one pipeline-assembly core and differ only
//! in their mandatory-claim sets and the extra checkers they add: ID tokens
//! bind the auxiliary flow artifacts, access tokens enforce the full
//! reserved-claim set, UserInfo responses only require `sub`.

mod id_token;
mod jwt;
mod userinfo;

pub use id_token::IdTokenVerifier;
pub use jwt::JwtVerifier;
pub use userinfo::UserInfoVerifier;

use crate::checker::{
    AlgorithmChecker, AudienceChecker, AuthTimeChecker, AzpChecker, ExpirationTimeChecker,
    IssuedAtChecker, IssuerChecker, NonceChecker, NotBeforeChecker, SharedClock, SystemClock,
    Validate,
};
use crate::config::VerifierConfig;
use crate::decrypter::{NullTokenDecrypter, TokenDecrypter};
use crate::engine;
use crate::error::NilaJoseError;
use crate::jwks::JwksProvider;
use crate::resolver::KeyResolver;
use serde_json::Value;
use std::sync::Arc;

/// Claim names every signed token of an authorization flow must carry.
pub(crate) const RESERVED_CLAIMS: [&str; 5] = ["iss", "sub", "aud", "exp", "iat"];

/// Shared state and pipeline assembly for the verifier variants.
pub(crate) struct VerifierCore {
    config: VerifierConfig,
    resolver: KeyResolver,
    decrypter: Arc<dyn TokenDecrypter>,
    clock: SharedClock,
}

impl VerifierCore {
    pub(crate) fn new(config: VerifierConfig, jwks_provider: Arc<dyn JwksProvider>) -> Self {
        let resolver = KeyResolver::new(
            jwks_provider,
            config.client_secret().map(str::to_string),
        );
        Self {
            config,
            resolver,
            decrypter: Arc::new(NullTokenDecrypter),
            clock: Arc::new(SystemClock),
        }
    }

    pub(crate) fn set_decrypter(&mut self, decrypter: Arc<dyn TokenDecrypter>) {
        self.decrypter = decrypter;
    }

    pub(crate) fn set_clock(&mut self, clock: SharedClock) {
        self.clock = clock;
    }

    pub(crate) fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub(crate) fn decrypt(&self, token: &str) -> Result<String, NilaJoseError> {
        self.decrypter.decrypt(token)
    }

    /// Assembles the base pipeline for a decrypted token: resolves the
    /// signing keys from the token's own header and wires every checker the
    /// configuration implies.
    pub(crate) async fn create<'a>(
        &self,
        token: &'a str,
    ) -> Result<Validate<'a>, NilaJoseError> {
        let header = engine::decode_protected_header(token)?;
        let alg = header.get("alg").and_then(Value::as_str).unwrap_or("");
        let kid = header.get("kid").and_then(Value::as_str);

        let jwks = self.resolver.signing_key_set(alg, kid).await?;

        let mut expected_issuer = self.config.issuer().to_string();
        if self.config.aad_issuer_validation() {
            // The expected issuer depends on the token's own tenant id, so the
            // payload is read once before the checker is built. The value is
            // only compared after the signature has been verified.
            let payload = engine::decode_payload(token)?;
            let tid = payload.get("tid").and_then(Value::as_str).unwrap_or("");
            expected_issuer = expected_issuer.replace("{tenantid}", tid);
        }

        let tolerance = self.config.clock_tolerance();

        let mut validate = Validate::with_token(token)
            .with_jwk_set(jwks)
            .with_claim(IssuerChecker::new(expected_issuer))
            .with_claim(IssuedAtChecker::new(tolerance, self.clock.clone()))
            .with_claim(AudienceChecker::new(self.config.client_id()))
            .with_claim(ExpirationTimeChecker::new(tolerance, self.clock.clone()))
            .with_claim(NotBeforeChecker::new(tolerance, self.clock.clone()));

        if let Some(azp) = self.config.expected_azp() {
            validate = validate.with_claim(AzpChecker::new(azp));
        }

        if let Some(expected_alg) = self.config.expected_alg() {
            validate = validate.with_header(AlgorithmChecker::new([expected_alg]));
        }

        if let Some(nonce) = self.config.nonce() {
            validate = validate.with_claim(NonceChecker::new(nonce));
        }

        if let Some(max_age) = self.config.max_age() {
            validate = validate.with_claim(AuthTimeChecker::new(
                max_age,
                tolerance,
                self.clock.clone(),
            ));
        }

        if self.config.auth_time_required() || self.config.max_age().is_some() {
            validate = validate.with_mandatory(["auth_time"]);
        }

        Ok(validate)
    }
}
