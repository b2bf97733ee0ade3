use secrecy::SecretString;

/// Which upstream protocol generation a client speaks.
///
/// The two generations are incompatible — different base paths, payload
/// formats (JSON vs XML-over-form-POST), session material, and arm-type
/// encodings — and are never mixed within one client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolGeneration {
    /// JSON REST endpoints under `TC2API.TCResource/api/`, bearer-token auth.
    Rest,
    /// XML-bodied form-POST endpoints under `TC21api/tc2.asmx`, session-id auth.
    Legacy,
}

impl ProtocolGeneration {
    /// The production base URL for this generation's resource endpoints.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Rest => "https://rs.alarmnet.com/TC2API.TCResource/api",
            Self::Legacy => "https://rs.alarmnet.com/TC21api/tc2.asmx",
        }
    }
}

/// Account credential, supplied once at construction and immutable for
/// the client's lifetime. Re-used whenever session material must be
/// (re)obtained; never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Bearer token obtained from the identity endpoint (REST generation).
///
/// Immutable once issued; a refresh produces a whole new value rather
/// than patching this one in place.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub token_type: String,
    pub access_token: String,
}

impl BearerToken {
    /// The `Authorization` header value for this token.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
