// src/decrypter.rs

use crate::error::NilaJoseError;

/// Pre-step turning an encrypted token (JWE) into its signed payload (JWS)
/// before verification.
///
/// The content-decryption engine itself is an external collaborator; wire a
/// custom implementation here when the authorization server issues encrypted
/// responses.
pub trait TokenDecrypter: Send + Sync {
    fn decrypt(&self, token: &str) -> Result<String, NilaJoseError>;
}

/// The no-op decrypter used when responses are not encrypted.
///
/// It passes the token through unchanged; a five-segment JWE then fails the
/// compact-JWS parse downstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTokenDecrypter;

impl TokenDecrypter for NullTokenDecrypter {
    fn decrypt(&self, token: &str) -> Result<String, NilaJoseError> {
        Ok(token.to_string())
    }
}
