//! Sunsynk energy history exporter.
//!
//! Logs in to the Sunsynk cloud API, walks a plant's monthly and daily
//! energy history backward from today until the API runs dry, pivots the
//! nested category/record payloads into time-indexed tables, and writes
//! them to a two-sheet Excel workbook.
//!
//! # Quick start
//!
//! ```no_run
//! use sunsynk_export::{Credentials, SunsynkExporter};
//!
//! let mut exporter = SunsynkExporter::builder()
//!     .credentials(Credentials::new("me@example.com", "secret"))
//!     .build()
//!     .unwrap();
//!
//! let path = exporter.run(".").unwrap();
//! println!("wrote {}", path.display());
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod plants;
pub mod table;

pub use auth::{Credentials, Session};
pub use client::ApiClient;
pub use config::Settings;
pub use error::{ExportError, Result};
pub use history::{EnergyEndpoint, Granularity, HistoryWalk, PeriodSource};
pub use models::{Category, RawPeriodPayload, Record};
pub use table::{build_table, TimeTable};

use chrono::{Local, NaiveDate};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// SunsynkExporterBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SunsynkExporter`].
///
/// Use [`SunsynkExporter::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](SunsynkExporterBuilder::build).
pub struct SunsynkExporterBuilder {
    base_url: String,
    timeout: Duration,
    credentials: Option<Credentials>,
    token: Option<String>,
    plant_id: Option<u64>,
}

impl Default for SunsynkExporterBuilder {
    fn default() -> Self {
        Self {
            base_url: config::API_BASE.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
            credentials: None,
            token: None,
            plant_id: None,
        }
    }
}

impl SunsynkExporterBuilder {
    /// Start from environment-derived [`Settings`].
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            base_url: settings.api_url,
            credentials: settings.credentials,
            token: settings.bearer_token,
            plant_id: settings.plant_id,
            ..Self::default()
        }
    }

    /// Override the API host. Defaults to `https://api.sunsynk.net`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use an existing bearer token instead of logging in.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Export this plant instead of the account's first one.
    pub fn plant_id(mut self, plant_id: u64) -> Self {
        self.plant_id = Some(plant_id);
        self
    }

    /// Build the exporter. No network traffic happens until the first call
    /// that needs a token.
    pub fn build(self) -> Result<SunsynkExporter> {
        if self.credentials.is_none() && self.token.is_none() {
            return Err(ExportError::Config(
                "either credentials or a bearer token is required".into(),
            ));
        }
        Ok(SunsynkExporter {
            api: ApiClient::new(self.base_url, self.timeout),
            session: Session::from_parts(self.credentials, self.token),
            plant_id: self.plant_id,
        })
    }
}

// ---------------------------------------------------------------------------
// SunsynkExporter
// ---------------------------------------------------------------------------

/// Entry point tying login, plant resolution, history walks, table
/// building and the workbook export together.
///
/// The token and resolved plant id are cached for the exporter's lifetime.
pub struct SunsynkExporter {
    api: ApiClient,
    session: Session,
    plant_id: Option<u64>,
}

impl SunsynkExporter {
    pub fn builder() -> SunsynkExporterBuilder {
        SunsynkExporterBuilder::default()
    }

    /// Return the bearer token, logging in on first use.
    pub fn ensure_authenticated(&mut self) -> Result<&str> {
        self.session.ensure_authenticated(&self.api)
    }

    /// The configured plant id, or the account's first plant.
    pub fn plant_id(&mut self) -> Result<u64> {
        if let Some(id) = self.plant_id {
            return Ok(id);
        }
        let token = self.session.ensure_authenticated(&self.api)?;
        let id = plants::resolve_default_plant(&self.api, token)?;
        self.plant_id = Some(id);
        Ok(id)
    }

    /// Walk one granularity's history backward from `start` (today when
    /// `None`). Most recent period first.
    pub fn fetch_history(
        &mut self,
        granularity: Granularity,
        start: Option<NaiveDate>,
    ) -> Result<Vec<RawPeriodPayload>> {
        let plant_id = self.plant_id()?;
        let token = self.session.ensure_authenticated(&self.api)?;
        history::fetch_range(EnergyEndpoint::new(&self.api, token), plant_id, granularity, start)
    }

    /// Fetch and pivot one granularity into a table.
    pub fn fetch_table(
        &mut self,
        granularity: Granularity,
        start: Option<NaiveDate>,
    ) -> Result<TimeTable> {
        let payloads = self.fetch_history(granularity, start)?;
        build_table(&payloads, granularity)
    }

    /// Fetch both granularities and write them to `destination`.
    ///
    /// Both tables are built before anything is written, so a bad value
    /// leaves no file behind.
    pub fn export_to(&mut self, destination: &Path, start: Option<NaiveDate>) -> Result<()> {
        let monthly = self.fetch_table(Granularity::Monthly, start)?;
        let daily = self.fetch_table(Granularity::Daily, start)?;
        export::export(&monthly, &daily, destination)
    }

    /// Full export into `output_dir` under a timestamped file name.
    ///
    /// Returns the path of the written workbook.
    pub fn run<P: AsRef<Path>>(&mut self, output_dir: P) -> Result<PathBuf> {
        let plant_id = self.plant_id()?;
        let filename = export::output_filename(plant_id, Local::now().naive_local());
        let destination = output_dir.as_ref().join(filename);
        self.export_to(&destination, None)?;
        Ok(destination)
    }

    /// Return a reference to the underlying [`ApiClient`].
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for SunsynkExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plant = self
            .plant_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unresolved".to_string());
        write!(
            f,
            "SunsynkExporter(base_url={}, plant={}, authenticated={})",
            self.api.base_url,
            plant,
            self.session.token().is_some()
        )
    }
}
