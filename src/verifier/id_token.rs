// src/verifier/id_token.rs

use super::{VerifierCore, RESERVED_CLAIMS};
use crate::checker::{AtHashChecker, CHashChecker, SHashChecker, SharedClock};
use crate::config::VerifierConfig;
use crate::decrypter::TokenDecrypter;
use crate::engine;
use crate::error::NilaJoseError;
use crate::jwks::JwksProvider;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Verifies OpenID Connect ID tokens.
///
/// On top of the base pipeline, an ID token is checked against the auxiliary
/// artifacts of the authorization flow supplied through the configuration:
/// `at_hash` against the access token, `c_hash` against the authorization
/// code (both become mandatory claims when supplied) and `s_hash` against the
/// state value. The binding hashes use the signature algorithm declared by
/// the token's own header.
pub struct IdTokenVerifier {
    core: VerifierCore,
}

impl IdTokenVerifier {
    pub fn new(config: VerifierConfig, jwks_provider: Arc<dyn JwksProvider>) -> Self {
        Self {
            core: VerifierCore::new(config, jwks_provider),
        }
    }

    /// Replaces the pass-through decrypter for encrypted ID tokens.
    pub fn with_decrypter(mut self, decrypter: Arc<dyn TokenDecrypter>) -> Self {
        self.core.set_decrypter(decrypter);
        self
    }

    /// Overrides the clock used by the time-based checkers.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.core.set_clock(clock);
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        self.core.config()
    }

    /// Verifies the token and returns its claims.
    #[instrument(skip(self, token), err)]
    pub async fn verify(&self, token: &str) -> Result<Map<String, Value>, NilaJoseError> {
        let token = self.core.decrypt(token)?;

        let header = engine::decode_protected_header(&token)?;
        let alg = header
            .get("alg")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let mut validate = self.core.create(&token).await?;
        let mut mandatory: Vec<&str> = RESERVED_CLAIMS.to_vec();

        let config = self.core.config();

        if let Some(access_token) = config.access_token() {
            mandatory.push("at_hash");
            validate = validate.with_claim(AtHashChecker::new(access_token, alg.clone()));
        }

        if let Some(code) = config.code() {
            mandatory.push("c_hash");
            validate = validate.with_claim(CHashChecker::new(code, alg.clone()));
        }

        if let Some(state) = config.state() {
            validate = validate.with_claim(SHashChecker::new(state, alg.clone()));
        }

        validate.with_mandatory(mandatory).run()
    }
}
