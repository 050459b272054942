//! Login exchange and the caller-owned token cache.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::config;
use crate::error::{ExportError, Result};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Account username and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "areaCode")]
    area_code: &'a str,
    client_id: &'a str,
    grant_type: &'a str,
    source: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    msg: Option<String>,
    data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    access_token: Option<String>,
}

/// Exchange username and password for a bearer token.
///
/// Always performs a network round trip; use [`Session`] to cache the result.
pub fn authenticate(api: &ApiClient, credentials: &Credentials) -> Result<String> {
    let body = LoginRequest {
        area_code: config::AREA_CODE,
        client_id: config::CLIENT_ID,
        grant_type: "password",
        source: config::SOURCE,
        username: &credentials.username,
        password: &credentials.password,
    };

    let resp = api.post_json(&api.url(config::TOKEN_PATH), &body)?;
    let status = resp.status();
    let text = resp.text()?;

    let parsed: LoginResponse = serde_json::from_str(&text).map_err(|_| {
        ExportError::Auth(format!("unexpected login response (HTTP {})", status))
    })?;

    if !parsed.success {
        let reason = parsed
            .msg
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("login rejected (HTTP {})", status));
        return Err(ExportError::Auth(reason));
    }

    parsed
        .data
        .and_then(|d| d.access_token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ExportError::Auth("login response did not include an access token".into()))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Lazily-initialized bearer token owned by the caller.
///
/// The first [`ensure_authenticated`](Session::ensure_authenticated) call logs
/// in; later calls return the cached token without touching the network. A
/// session created with [`with_token`](Session::with_token) never logs in.
#[derive(Debug, Clone, Default)]
pub struct Session {
    credentials: Option<Credentials>,
    token: Option<String>,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            token: None,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            credentials: None,
            token: Some(token.into()),
        }
    }

    pub fn from_parts(credentials: Option<Credentials>, token: Option<String>) -> Self {
        Self { credentials, token }
    }

    /// The cached token, if any, without logging in.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Return the cached token, logging in first if there is none yet.
    pub fn ensure_authenticated(&mut self, api: &ApiClient) -> Result<&str> {
        match self.token {
            Some(ref token) => Ok(token.as_str()),
            None => {
                let credentials = self.credentials.as_ref().ok_or_else(|| {
                    ExportError::Auth("no credentials or bearer token configured".into())
                })?;
                let token = authenticate(api, credentials)?;
                tracing::info!("authenticated as {}", credentials.username);
                Ok(self.token.insert(token).as_str())
            }
        }
    }
}
