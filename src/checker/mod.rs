// src/checker/mod.rs

//! The header/claim checker pipeline.
//!
//! A verification call assembles an ordered set of [`HeaderChecker`]s and
//! [`ClaimChecker`]s plus a mandatory-claim list into a [`Validate`] value and
//! runs it. Header checks only see the protected header and run before the
//! signature is trusted; claim checks run against the decoded payload after
//! the signature has been verified. The pipeline stops at the first failure.

mod claims;
mod hash;
mod header;

pub use claims::{
    AudienceChecker, AuthTimeChecker, AzpChecker, ExpirationTimeChecker, IssuedAtChecker,
    IssuerChecker, NonceChecker, NotBeforeChecker,
};
pub use hash::{binding_hash, AtHashChecker, CHashChecker, SHashChecker};
pub use header::{AlgorithmChecker, ContentEncryptionAlgorithmChecker};

use crate::engine;
use crate::error::NilaJoseError;
use crate::jwk::JwkSet;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock seam for the time-based checkers, so tolerance behavior is testable
/// without sleeping.
pub trait Clock: Send + Sync {
    /// Current time as seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// The default [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Validates one claim of the decoded payload.
///
/// A checker is only invoked when its claim is present; absence is enforced
/// separately through the mandatory-claim set.
pub trait ClaimChecker: Send + Sync {
    /// The claim name this checker supports.
    fn supported_claim(&self) -> &str;

    /// Checks the claim value, returning the claim-specific error on failure.
    fn check(&self, value: &Value) -> Result<(), NilaJoseError>;
}

/// Validates one parameter of the protected header.
pub trait HeaderChecker: Send + Sync {
    fn supported_header(&self) -> &str;

    fn check(&self, value: &Value) -> Result<(), NilaJoseError>;
}

/// A [`ClaimChecker`] wrapping an arbitrary predicate, the escape hatch for
/// application-specific claims.
pub struct CallableChecker<F> {
    claim: String,
    predicate: F,
}

impl<F> CallableChecker<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    pub fn new(claim: impl Into<String>, predicate: F) -> Self {
        Self {
            claim: claim.into(),
            predicate,
        }
    }
}

impl<F> ClaimChecker for CallableChecker<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn supported_claim(&self) -> &str {
        &self.claim
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        if (self.predicate)(value) {
            Ok(())
        } else {
            Err(NilaJoseError::InvalidClaim {
                claim: self.claim.clone(),
                value: value.clone(),
                message: format!("Invalid claim \"{}\"", self.claim),
            })
        }
    }
}

/// One verification run: a token, the resolved key set, the checkers and the
/// mandatory-claim set.
///
/// Built with-style; every method consumes and returns the value, so a run
/// reads as a single expression.
pub struct Validate<'a> {
    token: &'a str,
    jwks: JwkSet,
    header_checkers: Vec<Box<dyn HeaderChecker>>,
    claim_checkers: Vec<Box<dyn ClaimChecker>>,
    mandatory_claims: Vec<String>,
}

impl<'a> Validate<'a> {
    pub fn with_token(token: &'a str) -> Self {
        Self {
            token,
            jwks: JwkSet::default(),
            header_checkers: Vec::new(),
            claim_checkers: Vec::new(),
            mandatory_claims: Vec::new(),
        }
    }

    pub fn with_jwk_set(mut self, jwks: JwkSet) -> Self {
        self.jwks = jwks;
        self
    }

    pub fn with_claim(mut self, checker: impl ClaimChecker + 'static) -> Self {
        self.claim_checkers.push(Box::new(checker));
        self
    }

    pub fn with_header(mut self, checker: impl HeaderChecker + 'static) -> Self {
        self.header_checkers.push(Box::new(checker));
        self
    }

    /// Adds claims to the mandatory set. A mandatory claim absent from the
    /// payload fails the run before its checker (if any) is consulted.
    pub fn with_mandatory<I, S>(mut self, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for claim in claims {
            let claim = claim.into();
            if !self.mandatory_claims.contains(&claim) {
                self.mandatory_claims.push(claim);
            }
        }
        self
    }

    /// Runs the pipeline: header checks, signature verification, payload
    /// decoding, mandatory-claim enforcement, claim checks.
    ///
    /// Returns the decoded claims on success, the first failure otherwise.
    pub fn run(self) -> Result<Map<String, Value>, NilaJoseError> {
        let protected = engine::decode_protected_header(self.token)?;

        for checker in &self.header_checkers {
            if let Some(value) = protected.get(checker.supported_header()) {
                checker.check(value)?;
            }
        }

        let claims = engine::verify_signature(self.token, &self.jwks)?;

        for claim in &self.mandatory_claims {
            if !claims.contains_key(claim) {
                return Err(NilaJoseError::MissingMandatoryClaim(claim.clone()));
            }
        }

        for checker in &self.claim_checkers {
            if let Some(value) = claims.get(checker.supported_claim()) {
                checker.check(value)?;
            }
        }

        Ok(claims)
    }
}

/// Shared handle type for the clock seam.
pub type SharedClock = Arc<dyn Clock>;


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn callable_checker_accepts_and_rejects() {
        let checker = CallableChecker::new("scope", |v: &Value| v.as_str() == Some("read"));
        assert!(checker.check(&json!("read")).is_ok());
        let err = checker.check(&json!("write")).unwrap_err();
        assert!(matches!(err, NilaJoseError::InvalidClaim { claim, .. } if claim == "scope"));
    }

    #[test]
    fn mandatory_claims_are_deduplicated() {
        let validate = Validate::with_token("x")
            .with_mandatory(["sub", "iss"])
            .with_mandatory(["sub"]);
        assert_eq!(validate.mandatory_claims, vec!["sub", "iss"]);
    }
}
