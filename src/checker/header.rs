// src/checker/header.rs

use super::HeaderChecker;
use crate::error::{display_value, NilaJoseError};
use serde_json::Value;

/// Restricts the `alg` header parameter to an allow-list.
pub struct AlgorithmChecker {
    allowed: Vec<String>,
}

impl AlgorithmChecker {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl HeaderChecker for AlgorithmChecker {
    fn supported_header(&self) -> &str {
        "alg"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        match value.as_str() {
            Some(alg) if self.allowed.iter().any(|a| a == alg) => Ok(()),
            _ => Err(NilaJoseError::InvalidHeader(format!(
                "Unsupported algorithm: {}",
                display_value(value)
            ))),
        }
    }
}

/// Restricts the `enc` header parameter of an encrypted token.
pub struct ContentEncryptionAlgorithmChecker {
    allowed: Vec<String>,
}

impl ContentEncryptionAlgorithmChecker {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl HeaderChecker for ContentEncryptionAlgorithmChecker {
    fn supported_header(&self) -> &str {
        "enc"
    }

    fn check(&self, value: &Value) -> Result<(), NilaJoseError> {
        match value.as_str() {
            Some(enc) if self.allowed.iter().any(|a| a == enc) => Ok(()),
            _ => Err(NilaJoseError::InvalidHeader(format!(
                "Unsupported content encryption algorithm: {}",
                display_value(value)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn algorithm_allow_list() {
        let checker = AlgorithmChecker::new(["RS256"]);
        assert!(checker.check(&json!("RS256")).is_ok());
        assert!(matches!(
            checker.check(&json!("HS256")),
            Err(NilaJoseError::InvalidHeader(_))
        ));
        assert!(checker.check(&json!(42)).is_err());
    }

    #[test]
    fn enc_allow_list() {
        let checker = ContentEncryptionAlgorithmChecker::new(["A128CBC-HS256"]);
        assert!(checker.check(&json!("A128CBC-HS256")).is_ok());
        assert!(checker.check(&json!("A256GCM")).is_err());
    }
}
