// src/checker/claims.rs

use super::{ClaimChecker, SharedClock};
use crate::error::{display_value, NilaJoseError};
use serde_json::Value;

fn integer_claim(claim: &str, value: &Value) -> Result<u64, NilaJoseError> {
    value.as_u64().ok_or_else(|| NilaJoseError::InvalidClaim {
        claim: claim.to_string(),
        value: value.clone(),
        message: format!("\"{claim}\" must be an integer."),
    })
}

/// Checks that `iss` matches the expected issuer exactly.
pub struct IssuerChecker {
    issuer: String,
}

impl IssuerChecker {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }
}

impl ClaimChecker for IssuerChecker {
    fn supported_claim(&self) -> &str {
        "iss"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        if value.as_str() == Some(self.issuer.as_str()) {
            Ok(())
        } else {
            Err(NilaJoseError::claim_mismatch("iss", &self.issuer, value))
        }
    }
}

/// Checks that the audience contains the client id.
///
/// `aud` may be a single string or an array of strings.
pub struct AudienceChecker {
    audience: String,
}

impl AudienceChecker {
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
        }
    }
}

impl ClaimChecker for AudienceChecker {
    fn supported_claim(&self) -> &str {
        "aud"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        let matches = match value {
            Value::String(aud) => aud == &self.audience,
            Value::Array(auds) => auds
                .iter()
                .any(|aud| aud.as_str() == Some(self.audience.as_str())),
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(NilaJoseError::claim_mismatch("aud", &self.audience, value))
        }
    }
}

/// Checks that `exp` is not in the past, with clock-tolerance slack.
pub struct ExpirationTimeChecker {
    tolerance: u64,
    clock: SharedClock,
}

impl ExpirationTimeChecker {
    pub fn new(tolerance: u64, clock: SharedClock) -> Self {
        Self { tolerance, clock }
    }
}

impl ClaimChecker for ExpirationTimeChecker {
    fn supported_claim(&self) -> &str {
        "exp"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        let exp = integer_claim("exp", value)?;
        if exp.saturating_add(self.tolerance) < self.clock.now() {
            return Err(NilaJoseError::InvalidClaim {
                claim: "exp".to_string(),
                value: value.clone(),
                message: "The token expired.".to_string(),
            });
        }
        Ok(())
    }
}

/// Checks that `iat` is not implausibly in the future.
pub struct IssuedAtChecker {
    tolerance: u64,
    clock: SharedClock,
}

impl IssuedAtChecker {
    pub fn new(tolerance: u64, clock: SharedClock) -> Self {
        Self { tolerance, clock }
    }
}

impl ClaimChecker for IssuedAtChecker {
    fn supported_claim(&self) -> &str {
        "iat"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        let iat = integer_claim("iat", value)?;
        if iat > self.clock.now().saturating_add(self.tolerance) {
            return Err(NilaJoseError::InvalidClaim {
                claim: "iat".to_string(),
                value: value.clone(),
                message: "The token was issued in the future.".to_string(),
            });
        }
        Ok(())
    }
}

/// Checks that `nbf`, when present, is not in the future.
pub struct NotBeforeChecker {
    tolerance: u64,
    clock: SharedClock,
}

impl NotBeforeChecker {
    pub fn new(tolerance: u64, clock: SharedClock) -> Self {
        Self { tolerance, clock }
    }
}

impl ClaimChecker for NotBeforeChecker {
    fn supported_claim(&self) -> &str {
        "nbf"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        let nbf = integer_claim("nbf", value)?;
        if nbf > self.clock.now().saturating_add(self.tolerance) {
            return Err(NilaJoseError::InvalidClaim {
                claim: "nbf".to_string(),
                value: value.clone(),
                message: "The token cannot be used yet.".to_string(),
            });
        }
        Ok(())
    }
}

/// Checks that `azp`, when present, names the expected authorized party.
pub struct AzpChecker {
    azp: String,
}

impl AzpChecker {
    pub fn new(azp: impl Into<String>) -> Self {
        Self { azp: azp.into() }
    }
}

impl ClaimChecker for AzpChecker {
    fn supported_claim(&self) -> &str {
        "azp"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        if value.as_str() == Some(self.azp.as_str()) {
            Ok(())
        } else {
            Err(NilaJoseError::InvalidClaim {
                claim: "azp".to_string(),
                value: value.clone(),
                message: format!(
                    "azp must be the client_id, expected {}, got: {}",
                    self.azp,
                    display_value(value)
                ),
            })
        }
    }
}

/// Checks `nonce` against the value bound to the authorization request.
pub struct NonceChecker {
    nonce: String,
}

impl NonceChecker {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
        }
    }
}

impl ClaimChecker for NonceChecker {
    fn supported_claim(&self) -> &str {
        "nonce"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        if value.as_str() == Some(self.nonce.as_str()) {
            Ok(())
        } else {
            Err(NilaJoseError::InvalidClaim {
                claim: "nonce".to_string(),
                value: value.clone(),
                message: format!(
                    "Nonce mismatch, expected {}, got: {}",
                    self.nonce,
                    display_value(value)
                ),
            })
        }
    }
}

/// Checks that `auth_time` plus the allowed max age has not elapsed.
pub struct AuthTimeChecker {
    max_age: u64,
    tolerance: u64,
    clock: SharedClock,
}

impl AuthTimeChecker {
    pub fn new(max_age: u64, tolerance: u64, clock: SharedClock) -> Self {
        Self {
            max_age,
            tolerance,
            clock,
        }
    }
}

impl ClaimChecker for AuthTimeChecker {
    fn supported_claim(&self) -> &str {
        "auth_time"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        let auth_time = integer_claim("auth_time", value)?;
        if auth_time.saturating_add(self.max_age) < self.clock.now().saturating_sub(self.tolerance) {
            return Err(NilaJoseError::InvalidClaim {
                claim: "auth_time".to_string(),
                value: value.clone(),
                message: "Too much time has elapsed since the last End-User authentication."
                    .to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_clock::FixedClock;
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    const NOW: u64 = 1_700_000_000;

    fn clock() -> SharedClock {
        Arc::new(FixedClock(NOW))
    }

    #[test]
    fn issuer_must_match_exactly() {
        let checker = IssuerChecker::new("https://issuer.com");
        assert!(checker.check(&json!("https://issuer.com")).is_ok());
        assert!(checker.check(&json!("https://issuer.com/")).is_err());
        assert!(checker.check(&json!(42)).is_err());
    }

    #[test]
    fn audience_accepts_string_or_array() {
        let checker = AudienceChecker::new("client-id");
        assert!(checker.check(&json!("client-id")).is_ok());
        assert!(checker.check(&json!(["other", "client-id"])).is_ok());
        assert!(checker.check(&json!(["other"])).is_err());
        assert!(checker.check(&json!(7)).is_err());
    }

    #[test]
    fn expired_token_fails_without_tolerance() {
        let checker = ExpirationTimeChecker::new(0, clock());
        assert!(checker.check(&json!(NOW - 1)).is_err());
        assert!(checker.check(&json!(NOW)).is_ok());
    }

    #[test]
    fn tolerance_rescues_a_just_expired_token() {
        let checker = ExpirationTimeChecker::new(1, clock());
        assert!(checker.check(&json!(NOW - 1)).is_ok());
        assert!(checker.check(&json!(NOW - 2)).is_err());
    }

    #[test]
    fn iat_in_the_future_is_rejected() {
        let checker = IssuedAtChecker::new(5, clock());
        assert!(checker.check(&json!(NOW + 5)).is_ok());
        assert!(checker.check(&json!(NOW + 6)).is_err());
    }

    #[test]
    fn nbf_in_the_future_is_rejected() {
        let checker = NotBeforeChecker::new(0, clock());
        assert!(checker.check(&json!(NOW)).is_ok());
        assert!(checker.check(&json!(NOW + 1)).is_err());
    }

    #[test]
    fn auth_time_respects_max_age_and_tolerance() {
        let checker = AuthTimeChecker::new(100, 0, clock());
        assert!(checker.check(&json!(NOW - 100)).is_ok());
        assert!(checker.check(&json!(NOW - 101)).is_err());

        let tolerant = AuthTimeChecker::new(100, 10, clock());
        assert!(tolerant.check(&json!(NOW - 110)).is_ok());
    }

    #[test]
    fn auth_time_must_be_an_integer() {
        let checker = AuthTimeChecker::new(100, 0, clock());
        let err = checker.check(&json!("yesterday")).unwrap_err();
        assert!(matches!(err, NilaJoseError::InvalidClaim { claim, .. } if claim == "auth_time"));
    }

    #[test]
    fn azp_and_nonce_report_structured_errors() {
        let err = AzpChecker::new("client-id").check(&json!("other")).unwrap_err();
        match err {
            NilaJoseError::InvalidClaim { claim, value, .. } => {
                assert_eq!(claim, "azp");
                assert_eq!(value, json!("other"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(NonceChecker::new("n-1").check(&json!("n-1")).is_ok());
        assert!(NonceChecker::new("n-1").check(&json!("n-2")).is_err());
    }
}
