// src/config.rs

/// Per-verification configuration for a token verifier.
///
/// The value is logically immutable: every `with_` method clones the
/// configuration and returns the updated copy, so a base configuration can be
/// shared and specialized per request (a fresh `nonce` or `max_age` per
/// authorization flow) without synchronization.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    issuer: String,
    client_id: String,
    client_secret: Option<String>,
    expected_alg: Option<String>,
    expected_azp: Option<String>,
    clock_tolerance: u64,
    auth_time_required: bool,
    aad_issuer_validation: bool,
    nonce: Option<String>,
    max_age: Option<u64>,
    access_token: Option<String>,
    code: Option<String>,
    state: Option<String>,
}

impl VerifierConfig {
    pub fn new(issuer: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            client_id: client_id.into(),
            client_secret: None,
            expected_alg: None,
            expected_azp: None,
            clock_tolerance: 0,
            auth_time_required: false,
            aad_issuer_validation: false,
            nonce: None,
            max_age: None,
            access_token: None,
            code: None,
            state: None,
        }
    }

    pub fn with_client_secret(&self, client_secret: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.client_secret = Some(client_secret.into());
        new
    }

    /// Restricts the accepted signature algorithm (the registered
    /// `*_signed_response_alg` value).
    pub fn with_expected_alg(&self, alg: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.expected_alg = Some(alg.into());
        new
    }

    pub fn with_expected_azp(&self, azp: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.expected_azp = Some(azp.into());
        new
    }

    /// Allowed clock skew, in seconds, for the time-based claims.
    pub fn with_clock_tolerance(&self, seconds: u64) -> Self {
        let mut new = self.clone();
        new.clock_tolerance = seconds;
        new
    }

    /// Makes `auth_time` a mandatory claim regardless of `max_age`.
    pub fn with_auth_time_required(&self, required: bool) -> Self {
        let mut new = self.clone();
        new.auth_time_required = required;
        new
    }

    /// Treats the configured issuer as a multi-tenant template: the literal
    /// `{tenantid}` substring is replaced with the token's own `tid` claim
    /// before the issuer comparison.
    pub fn with_aad_issuer_validation(&self, enabled: bool) -> Self {
        let mut new = self.clone();
        new.aad_issuer_validation = enabled;
        new
    }

    pub fn with_nonce(&self, nonce: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.nonce = Some(nonce.into());
        new
    }

    /// Maximum seconds since the end-user last authenticated; also makes
    /// `auth_time` mandatory.
    pub fn with_max_age(&self, max_age: u64) -> Self {
        let mut new = self.clone();
        new.max_age = Some(max_age);
        new
    }

    /// Binds the access token from the same flow, enabling the `at_hash`
    /// check on ID tokens.
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.access_token = Some(access_token.into());
        new
    }

    /// Binds the authorization code from the same flow, enabling the
    /// `c_hash` check on ID tokens.
    pub fn with_code(&self, code: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.code = Some(code.into());
        new
    }

    /// Binds the state value from the same flow, enabling the `s_hash`
    /// check on ID tokens.
    pub fn with_state(&self, state: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.state = Some(state.into());
        new
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn expected_alg(&self) -> Option<&str> {
        self.expected_alg.as_deref()
    }

    pub fn expected_azp(&self) -> Option<&str> {
        self.expected_azp.as_deref()
    }

    pub fn clock_tolerance(&self) -> u64 {
        self.clock_tolerance
    }

    pub fn auth_time_required(&self) -> bool {
        self.auth_time_required
    }

    pub fn aad_issuer_validation(&self) -> bool {
        self.aad_issuer_validation
    }

    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}
