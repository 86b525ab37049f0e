// src/jwks/remote.rs

use super::JwksProvider;
use crate::error::NilaJoseError;
use crate::jwk::JwkSet;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::{debug, instrument};
use url::Url;

/// Fetches the key set from a remote JWKS endpoint on every call.
///
/// Every `get_jwks` hits the endpoint, so `reload` is a no-op; wrap this
/// provider in a [`CachedJwksProvider`](super::CachedJwksProvider) to avoid
/// fetching on each verification.
#[derive(Debug, Clone)]
pub struct RemoteJwksProvider {
    http_client: reqwest::Client,
    uri: Url,
    headers: HeaderMap,
}

impl RemoteJwksProvider {
    pub fn new(http_client: reqwest::Client, uri: Url) -> Self {
        Self {
            http_client,
            uri,
            headers: HeaderMap::new(),
        }
    }

    /// Extra request headers to send to the endpoint (authorization for a
    /// protected JWKS, a tracing header, ...).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }
}

#[async_trait]
impl JwksProvider for RemoteJwksProvider {
    #[instrument(skip(self), fields(uri = %self.uri), err)]
    async fn get_jwks(&self) -> Result<JwkSet, NilaJoseError> {
        let response = self
            .http_client
            .get(self.uri.clone())
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NilaJoseError::JwksFetchStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let jwks: JwkSet =
            serde_json::from_str(&body).map_err(|_| NilaJoseError::InvalidKeySet)?;

        debug!("Fetched {} keys from JWKS endpoint", jwks.keys.len());
        Ok(jwks)
    }

    async fn reload(&self) -> Result<(), NilaJoseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jwks_body() -> serde_json::Value {
        serde_json::json!({
            "keys": [{"kty": "RSA", "use": "sig", "kid": "k1", "n": "abc", "e": "AQAB"}]
        })
    }

    #[tokio::test]
    async fn fetches_and_parses_the_key_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
            .mount(&server)
            .await;

        let uri = Url::parse(&format!("{}/jwks.json", server.uri())).unwrap();
        let provider = RemoteJwksProvider::new(reqwest::Client::new(), uri);
        let jwks = provider.get_jwks().await.unwrap();
        assert_eq!(jwks.keys[0].kid.as_deref(), Some("k1"));
    }

    #[tokio::test]
    async fn sends_configured_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer xyz".parse().unwrap());
        let uri = Url::parse(&server.uri()).unwrap();
        let provider = RemoteJwksProvider::new(reqwest::Client::new(), uri).with_headers(headers);
        assert!(provider.get_jwks().await.is_ok());
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let uri = Url::parse(&server.uri()).unwrap();
        let provider = RemoteJwksProvider::new(reqwest::Client::new(), uri);
        assert!(matches!(
            provider.get_jwks().await,
            Err(NilaJoseError::JwksFetchStatus(500))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_an_invalid_key_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"no_keys": true}"#))
            .mount(&server)
            .await;

        let uri = Url::parse(&server.uri()).unwrap();
        let provider = RemoteJwksProvider::new(reqwest::Client::new(), uri);
        assert!(matches!(
            provider.get_jwks().await,
            Err(NilaJoseError::InvalidKeySet)
        ));
    }
}
