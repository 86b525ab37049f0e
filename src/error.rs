// src/error.rs

use thiserror::Error;

/// The primary error type for the `nila-jose` library.
///
/// Verification is pass/fail: every failed `verify` call surfaces exactly one
/// of these variants, preferring the most specific kind (a failed `nonce`
/// match is `InvalidClaim`, not a generic `InvalidSignature`).
#[derive(Debug, Error)]
pub enum NilaJoseError {
    #[error("Invalid JWT provided")]
    MalformedToken,

    #[error("Unable to decode JWT payload")]
    InvalidPayload,

    #[error("Signature requires client_secret to be verified")]
    MissingClientSecret,

    #[error("Unable to find the jwk with the provided kid: {0}")]
    KeyNotFound(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid token header: {0}")]
    InvalidHeader(String),

    #[error("Missing mandatory claim: {0}")]
    MissingMandatoryClaim(String),

    /// A present claim failed its checker. This is the only variant carrying
    /// structured context (claim name and offending value) for programmatic
    /// handling.
    #[error("{message}")]
    InvalidClaim {
        claim: String,
        value: serde_json::Value,
        message: String,
    },

    #[error("Unable to decrypt token: no decryption engine is available")]
    DecryptionUnsupported,

    #[error("Unable to decrypt token")]
    DecryptionFailed,

    #[error("An error occurred fetching the key set: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unable to get the key set (HTTP status {0})")]
    JwksFetchStatus(u16),

    #[error("Invalid key set content")]
    InvalidKeySet,

    #[error("Invalid JWK: {0}")]
    InvalidKey(String),

    #[error("An error occurred accessing the key set cache: {0}")]
    Cache(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl NilaJoseError {
    /// Builds the standard claim-mismatch error with its conventional wording.
    pub(crate) fn claim_mismatch(
        claim: &str,
        expected: impl std::fmt::Display,
        value: &serde_json::Value,
    ) -> Self {
        NilaJoseError::InvalidClaim {
            claim: claim.to_string(),
            value: value.clone(),
            message: format!(
                "{claim} mismatch, expected {expected}, got: {}",
                display_value(value)
            ),
        }
    }
}

/// Renders a claim value the way it appears in error messages: bare strings
/// without JSON quoting, everything else as compact JSON.
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}
