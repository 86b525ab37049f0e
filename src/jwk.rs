// src/jwk.rs

use serde::{Deserialize, Serialize};

/// A single JSON Web Key (JWK) as defined in RFC 7517.
///
/// Only `kty` is required; the remaining members are populated as the key
/// source provides them. Keys are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: "RSA", "EC", "OKP" or "oct".
    pub kty: String,
    /// Intended use: "sig" or "enc".
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,

    // RSA material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    // EC / OKP material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    // Symmetric material (base64url).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,
}

impl Jwk {
    /// Creates a symmetric (`oct`) key from already base64url-encoded material.
    pub fn oct(k: String) -> Self {
        Self {
            kty: "oct".to_string(),
            use_purpose: None,
            kid: None,
            alg: None,
            key_ops: None,
            n: None,
            e: None,
            crv: None,
            x: None,
            y: None,
            k: Some(k),
            x5c: None,
        }
    }

    /// Whether this key is eligible for the given use ("sig"/"enc").
    ///
    /// A key that does not declare a `use` member matches any requested use.
    pub fn allows_use(&self, use_purpose: &str) -> bool {
        match &self.use_purpose {
            Some(u) => u == use_purpose,
            None => true,
        }
    }
}

/// An ordered list of [`Jwk`]s, the standard `{"keys": [...]}` JWKS shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn new(keys: Vec<Jwk>) -> Self {
        Self { keys }
    }

    /// Wraps a single key in a one-key set.
    pub fn single(key: Jwk) -> Self {
        Self { keys: vec![key] }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Selects a key by intended use and key id.
    ///
    /// Selection must be deterministic when several keys match: the first
    /// match in set order wins.
    pub fn select(&self, use_purpose: Option<&str>, kid: Option<&str>) -> Option<&Jwk> {
        self.keys.iter().find(|key| {
            if let Some(u) = use_purpose {
                if !key.allows_use(u) {
                    return false;
                }
            }
            if let Some(kid) = kid {
                if key.kid.as_deref() != Some(kid) {
                    return false;
                }
            }
            true
        })
    }
}
