// src/verifier/userinfo.rs

use super::VerifierCore;
use crate::checker::SharedClock;
use crate::config::VerifierConfig;
use crate::decrypter::TokenDecrypter;
use crate::error::NilaJoseError;
use crate::jwks::JwksProvider;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Verifies signed UserInfo responses.
///
/// A UserInfo JWT is only guaranteed to carry the subject, so `sub` is the
/// single mandatory claim; everything else in the base pipeline still applies
/// when the corresponding claims are present.
pub struct UserInfoVerifier {
    core: VerifierCore,
}

impl UserInfoVerifier {
    pub fn new(config: VerifierConfig, jwks_provider: Arc<dyn JwksProvider>) -> Self {
        Self {
            core: VerifierCore::new(config, jwks_provider),
        }
    }

    /// Replaces the pass-through decrypter for encrypted responses.
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

    /// Verifies the response and returns its claims.
    #[instrument(skip(self, token), err)]
    pub async fn verify(&self, token: &str) -> Result<Map<String, Value>, NilaJoseError> {
        let token = self.core.decrypt(token)?;
        let validate = self.core.create(&token).await?;
        validate.with_mandatory(["sub"]).run()
    }
}
