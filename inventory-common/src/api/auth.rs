//! Admin authorization via HTTP Basic credentials
//!
//! Mutating operations require the configured admin login and password.
//! When either is unset, authorization is disabled entirely.
//!
//! # Pure Functions
//!
//! Parsing and checking only; the middleware that applies them lives in the
//! HTTP crate.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Authorization failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// No `Authorization` header on the request
    MissingCredentials,

    /// Header present but not a decodable `Basic` credential
    MalformedCredentials(String),

    /// Credentials decoded but do not match
    InvalidCredentials,
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingCredentials => write!(f, "Authorization required"),
            ApiAuthError::MalformedCredentials(reason) => {
                write!(f, "Malformed authorization header: {}", reason)
            }
            ApiAuthError::InvalidCredentials => write!(f, "Invalid credentials"),
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Configured admin login and password
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    login: String,
    password: String,
}

// Keep the password out of logs
impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

impl AdminCredentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Credentials only when both parts are present and non-empty
    pub fn from_parts(login: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (login, password) {
            (Some(login), Some(password)) if !login.is_empty() && !password.is_empty() => {
                Some(Self::new(login, password))
            }
            _ => None,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    /// Check an `Authorization` header value against these credentials
    ///
    /// Returns the authenticated login on success.
    pub fn verify_header(&self, header: Option<&str>) -> Result<String, ApiAuthError> {
        let header = header.ok_or(ApiAuthError::MissingCredentials)?;
        let (login, password) = parse_basic_authorization(header)?;

        if login == self.login && password == self.password {
            Ok(login)
        } else {
            Err(ApiAuthError::InvalidCredentials)
        }
    }
}

/// Decode `Basic <base64(login:password)>` into its two parts
///
/// The password may itself contain `:`; only the first one separates.
pub fn parse_basic_authorization(header: &str) -> Result<(String, String), ApiAuthError> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| ApiAuthError::MalformedCredentials("expected Basic scheme".to_string()))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ApiAuthError::MalformedCredentials(format!("invalid base64: {}", e)))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| ApiAuthError::MalformedCredentials("credentials are not UTF-8".to_string()))?;

    let (login, password) = decoded
        .split_once(':')
        .ok_or_else(|| ApiAuthError::MalformedCredentials("missing ':' separator".to_string()))?;

    Ok((login.to_string(), password.to_string()))
}

/// Build a `Basic` header value; used by clients and tests
pub fn basic_authorization_header(login: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", login, password)))
}
