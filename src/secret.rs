// src/secret.rs

use crate::jwk::Jwk;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static KEY_WRAP_ALG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A(\d{3})(?:GCM)?KW$").unwrap());
static CONTENT_ENC_ALG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A(\d{3})(?:GCM|CBC-HS(\d{3}))$").unwrap());

/// Derives the symmetric JWK for a client secret and an optional algorithm id.
///
/// Key-wrapping (`A128KW`, `A256GCMKW`, ...) and content-encryption
/// (`A128GCM`, `A256CBC-HS512`, ...) algorithms use a truncated SHA-256
/// digest of the secret sized to the algorithm; for `A<N>CBC-HS<M>` the `M`
/// bits win. Any other algorithm (the HMAC family, or none at all) uses the
/// raw secret bytes, base64url-encoded without hashing.
///
/// Deterministic: the same `(secret, alg)` always yields the same key.
pub fn jose_secret_key(secret: &str, alg: Option<&str>) -> Jwk {
    if let Some(alg) = alg {
        if let Some(captures) = KEY_WRAP_ALG.captures(alg) {
            let bits: u32 = captures[1].parse().unwrap_or(0);
            return derived_key(secret, bits);
        }

        if let Some(captures) = CONTENT_ENC_ALG.captures(alg) {
            let bits: u32 = captures
                .get(2)
                .or_else(|| captures.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            return derived_key(secret, bits);
        }
    }

    Jwk::oct(base64_url::encode(secret.as_bytes()))
}

/// Derives an `oct` key from the first `bits / 8` bytes of `SHA-256(secret)`.
pub fn derived_key(secret: &str, bits: u32) -> Jwk {
    let digest = Sha256::digest(secret.as_bytes());
    let len = ((bits as usize) / 8).min(digest.len());
    Jwk::oct(base64_url::encode(&digest[..len]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    #[test]
    fn derives_gcm_sized_key() {
        let jwk = jose_secret_key(SECRET, Some("A128GCM"));
        assert_eq!(jwk.kty, "oct");
        assert_eq!(jwk.k.as_deref(), Some("zwBxoIOtPkc0nS4_vIltBw"));

        let jwk = jose_secret_key(SECRET, Some("A256GCM"));
        assert_eq!(
            jwk.k.as_deref(),
            Some("zwBxoIOtPkc0nS4_vIltB6DVBYCzNcN-OX1Akb-OcTs")
        );
    }

    #[test]
    fn derives_key_wrap_sized_key() {
        // A128KW and A128GCMKW both truncate to 128 bits.
        let kw = jose_secret_key(SECRET, Some("A128KW"));
        let gcmkw = jose_secret_key(SECRET, Some("A128GCMKW"));
        assert_eq!(kw, gcmkw);
        assert_eq!(kw.k.as_deref(), Some("zwBxoIOtPkc0nS4_vIltBw"));
    }

    #[test]
    fn cbc_hs_uses_the_mac_size() {
        // A128CBC-HS256 sizes by the HS256 half, i.e. 256 bits.
        let cbc = jose_secret_key(SECRET, Some("A128CBC-HS256"));
        assert_eq!(cbc, jose_secret_key(SECRET, Some("A256GCM")));
    }

    #[test]
    fn other_algorithms_encode_the_raw_secret() {
        let expected =
            "YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXowMTIzNDU2Nzg5QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVo";
        assert_eq!(jose_secret_key(SECRET, Some("RS256")).k.as_deref(), Some(expected));
        assert_eq!(jose_secret_key(SECRET, Some("HS256")).k.as_deref(), Some(expected));
        assert_eq!(jose_secret_key(SECRET, None).k.as_deref(), Some(expected));
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(
            jose_secret_key(SECRET, Some("A192KW")),
            jose_secret_key(SECRET, Some("A192KW"))
        );
    }
}
