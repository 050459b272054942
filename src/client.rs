//! Blocking HTTP access to the Sunsynk cloud API.
//!
//! Holds the base URL and request timeout and builds the underlying
//! `reqwest` client lazily on first use. Every request blocks until the
//! server answers or the timeout elapses.

use crate::config;
use crate::error::Result;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use std::cell::OnceCell;
use std::time::Duration;

/// Thin wrapper around a lazily-built blocking HTTP client.
#[derive(Debug)]
pub struct ApiClient {
    /// Scheme and host, without a trailing slash (e.g. `https://api.sunsynk.net`).
    pub base_url: String,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl ApiClient {
    /// Create a client for the given base URL. No connection is made yet.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            client: OnceCell::new(),
        }
    }

    /// Lazy HTTP client, created on first use.
    pub fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(self.client.get_or_init(|| client))
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL for a path under the versioned data API.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, config::API_PREFIX, path)
    }

    /// POST a JSON body without authentication.
    pub fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response> {
        tracing::debug!("POST {}", url);
        Ok(self.client()?.post(url).json(body).send()?)
    }

    /// GET with `Authorization: Bearer {token}`.
    ///
    /// The response is returned as-is; callers decide what a non-success
    /// status means for them.
    pub fn get_authorized(&self, url: &str, token: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);
        Ok(self.client()?.get(url).bearer_auth(token).send()?)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(config::API_BASE, config::DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let api = ApiClient::new("http://localhost:8080/", Duration::from_secs(1));
        assert_eq!(api.url("/oauth/token"), "http://localhost:8080/oauth/token");
        assert_eq!(
            api.api_url("/plants?page=1&limit=1"),
            "http://localhost:8080/api/v1/plants?page=1&limit=1"
        );
    }

    #[test]
    fn client_is_built_once() {
        let api = ApiClient::default();
        let first = api.client().unwrap() as *const Client;
        let second = api.client().unwrap() as *const Client;
        assert_eq!(first, second);
    }
}
