// src/metadata.rs

use crate::jwk::JwkSet;
use serde::{Deserialize, Serialize};

/// The subset of OIDC provider metadata relevant to token verification.
///
/// Typically deserialized straight from the issuer's discovery document.
/// Inline `jwks` and a `jwks_uri` are mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerMetadata {
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks: Option<JwkSet>,
}

impl IssuerMetadata {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            jwks_uri: None,
            jwks: None,
        }
    }
}

/// The subset of OIDC client registration metadata relevant to token
/// verification.
///
/// The `*_signed_response_alg` fields pin the accepted signature algorithm
/// per token type; the `*_encrypted_response_alg`/`_enc` pairs declare that
/// the provider encrypts the corresponding responses (both members of a pair
/// must be set together). `jwks` holds the client's own keys, used to decrypt
/// asymmetrically encrypted responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub require_auth_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks: Option<JwkSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_signed_response_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_encrypted_response_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_encrypted_response_enc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_signed_response_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_encrypted_response_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_encrypted_response_enc: Option<String>,
}

impl ClientMetadata {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }
}
