// src/engine.rs

//! Adapter over the `jsonwebtoken` signature engine.
//!
//! The pipeline owns every claim check, so the engine is driven with all of
//! its built-in claim validation disabled: it contributes compact-segment
//! parsing and signature verification only.

use crate::error::NilaJoseError;
use crate::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

fn decode_segment(token: &str, index: usize) -> Result<Map<String, Value>, NilaJoseError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(NilaJoseError::MalformedToken);
    }

    let bytes =
        base64_url::decode(parts[index]).map_err(|_| NilaJoseError::MalformedToken)?;

    let decode_error = if index == 0 {
        NilaJoseError::MalformedToken
    } else {
        NilaJoseError::InvalidPayload
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(decode_error),
    }
}

/// Decodes the protected header of a compact JWS without any verification.
pub fn decode_protected_header(token: &str) -> Result<Map<String, Value>, NilaJoseError> {
    decode_segment(token, 0)
}

/// Decodes the payload of a compact JWS without any verification.
///
/// Used for the pre-passes that must read the token before its checkers can
/// be built (the `{tenantid}` issuer substitution); nothing read here is
/// trusted until the signature has been verified.
pub fn decode_payload(token: &str) -> Result<Map<String, Value>, NilaJoseError> {
    decode_segment(token, 1)
}

fn parse_algorithm(alg: &str) -> Result<Algorithm, NilaJoseError> {
    alg.parse::<Algorithm>()
        .map_err(|_| NilaJoseError::UnsupportedAlgorithm(alg.to_string()))
}

fn key_matches_algorithm(jwk: &Jwk, alg: Algorithm) -> bool {
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => jwk.kty == "oct",
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => jwk.kty == "RSA",
        Algorithm::ES256 | Algorithm::ES384 => jwk.kty == "EC",
        Algorithm::EdDSA => jwk.kty == "OKP",
    }
}

fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, NilaJoseError> {
    match jwk.kty.as_str() {
        "RSA" => {
            let n = jwk
                .n
                .as_deref()
                .ok_or_else(|| NilaJoseError::InvalidKey("RSA key missing 'n'".to_string()))?;
            let e = jwk
                .e
                .as_deref()
                .ok_or_else(|| NilaJoseError::InvalidKey("RSA key missing 'e'".to_string()))?;
            DecodingKey::from_rsa_components(n, e)
                .map_err(|e| NilaJoseError::InvalidKey(e.to_string()))
        }
        "EC" => {
            let x = jwk
                .x
                .as_deref()
                .ok_or_else(|| NilaJoseError::InvalidKey("EC key missing 'x'".to_string()))?;
            let y = jwk
                .y
                .as_deref()
                .ok_or_else(|| NilaJoseError::InvalidKey("EC key missing 'y'".to_string()))?;
            DecodingKey::from_ec_components(x, y)
                .map_err(|e| NilaJoseError::InvalidKey(e.to_string()))
        }
        "OKP" => {
            let x = jwk
                .x
                .as_deref()
                .ok_or_else(|| NilaJoseError::InvalidKey("OKP key missing 'x'".to_string()))?;
            DecodingKey::from_ed_components(x)
                .map_err(|e| NilaJoseError::InvalidKey(e.to_string()))
        }
        "oct" => {
            let k = jwk
                .k
                .as_deref()
                .ok_or_else(|| NilaJoseError::InvalidKey("oct key missing 'k'".to_string()))?;
            let secret = base64_url::decode(k)
                .map_err(|e| NilaJoseError::InvalidKey(e.to_string()))?;
            Ok(DecodingKey::from_secret(&secret))
        }
        other => Err(NilaJoseError::InvalidKey(format!(
            "unsupported key type: {other}"
        ))),
    }
}

/// Verifies the token signature against every eligible key of the set and
/// returns the decoded payload of the first key that verifies.
///
/// Keys whose type does not fit the token's algorithm are skipped, as are
/// keys whose material cannot be converted; a set with no verifying key
/// yields `InvalidSignature`.
pub fn verify_signature(
    token: &str,
    jwks: &JwkSet,
) -> Result<Map<String, Value>, NilaJoseError> {
    let header = decode_protected_header(token)?;
    let alg = header.get("alg").and_then(Value::as_str).unwrap_or("");
    let algorithm = parse_algorithm(alg)?;

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    for jwk in &jwks.keys {
        if !key_matches_algorithm(jwk, algorithm) {
            continue;
        }

        let key = match decoding_key(jwk) {
            Ok(key) => key,
            Err(e) => {
                debug!(kid = jwk.kid.as_deref(), "Skipping unusable JWK: {e}");
                continue;
            }
        };

        match decode::<Map<String, Value>>(token, &key, &validation) {
            Ok(data) => return Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::Base64(_) => {
                    return Err(NilaJoseError::MalformedToken)
                }
                jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                    return Err(NilaJoseError::InvalidPayload)
                }
                _ => continue,
            },
        }
    }

    Err(NilaJoseError::InvalidSignature)
}
