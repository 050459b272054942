//! API constants and environment-driven settings.

use std::time::Duration;

use crate::auth::Credentials;
use crate::error::{ExportError, Result};

pub const API_BASE: &str = "https://api.sunsynk.net";
pub const API_PREFIX: &str = "/api/v1";
pub const TOKEN_PATH: &str = "/oauth/token";

// Fixed login parameters the web portal sends.
pub const AREA_CODE: &str = "sunsynk";
pub const CLIENT_ID: &str = "csp-web";
pub const SOURCE: &str = "sunsynk";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_USERNAME: &str = "SUNSYNK_USERNAME";
pub const ENV_PASSWORD: &str = "SUNSYNK_PASSWORD";
pub const ENV_PLANT_ID: &str = "SUNSYNK_PLANT_ID";
pub const ENV_BEARER_TOKEN: &str = "SUNSYNK_BEARER_TOKEN";
pub const ENV_API_URL: &str = "SUNSYNK_API_URL";

/// Settings assembled from the process environment.
///
/// Either a preset bearer token or a full username/password pair must be
/// present. A preset token skips the login exchange entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub credentials: Option<Credentials>,
    pub bearer_token: Option<String>,
    pub plant_id: Option<u64>,
    pub api_url: String,
}

impl Settings {
    /// Load `.env` (if any) and read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let credentials = match (get(ENV_USERNAME), get(ENV_PASSWORD)) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (Some(_), None) => {
                return Err(ExportError::Config(format!(
                    "{} is set but {} is missing",
                    ENV_USERNAME, ENV_PASSWORD
                )))
            }
            (None, Some(_)) => {
                return Err(ExportError::Config(format!(
                    "{} is set but {} is missing",
                    ENV_PASSWORD, ENV_USERNAME
                )))
            }
            (None, None) => None,
        };

        let bearer_token = get(ENV_BEARER_TOKEN);
        if credentials.is_none() && bearer_token.is_none() {
            return Err(ExportError::Config(format!(
                "set {} and {}, or {}",
                ENV_USERNAME, ENV_PASSWORD, ENV_BEARER_TOKEN
            )));
        }

        let plant_id = get(ENV_PLANT_ID)
            .map(|raw| parse_plant_id(&raw))
            .transpose()?;

        Ok(Self {
            credentials,
            bearer_token,
            plant_id,
            api_url: get(ENV_API_URL).unwrap_or_else(|| API_BASE.to_string()),
        })
    }
}

/// Parse a vendor plant identifier.
pub fn parse_plant_id(raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        ExportError::Config(format!("plant id must be numeric, got {:?}", raw))
    })
}
