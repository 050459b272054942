//! Backward walk over a plant's energy history.
//!
//! History has no advertised start date, so the walk begins at the most
//! recent period and steps back one calendar unit at a time until the API
//! stops returning data. The transport decides what "no data" means via
//! [`PeriodSource`]; [`HistoryWalk`] only drives the dates.

use chrono::{Datelike, Days, Local, NaiveDate};

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Category, EnergyResponse, RawPeriodPayload};

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

/// Aggregation level of an energy query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Monthly,
    Daily,
}

impl Granularity {
    /// Path segment of the energy endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Granularity::Monthly => "month",
            Granularity::Daily => "day",
        }
    }

    /// `strftime` pattern of the `date` query parameter.
    pub fn period_format(self) -> &'static str {
        match self {
            Granularity::Monthly => "%Y-%m",
            Granularity::Daily => "%Y-%m-%d",
        }
    }

    pub fn period_label(self, date: NaiveDate) -> String {
        date.format(self.period_format()).to_string()
    }

    /// The date to query after `date`, strictly earlier in time.
    ///
    /// Monthly steps subtract (day-of-month + 1) days, which always lands in
    /// the previous calendar month whatever its length. Returns `None` only
    /// at the bottom of the representable date range.
    pub fn step_back(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Monthly => date.checked_sub_days(Days::new(u64::from(date.day()) + 1)),
            Granularity::Daily => date.pred_opt(),
        }
    }

    /// Header of the time-key column.
    pub fn index_label(self) -> &'static str {
        match self {
            Granularity::Monthly => "Date",
            Granularity::Daily => "Date/Time",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            Granularity::Monthly => "Monthly Data",
            Granularity::Daily => "Daily Data",
        }
    }

    pub fn is_daily(self) -> bool {
        self == Granularity::Daily
    }
}

// ---------------------------------------------------------------------------
// PeriodSource
// ---------------------------------------------------------------------------

/// Fetches one calendar unit of history.
///
/// `Ok(None)` means "no data for this period" and ends the walk. `Err` is
/// reserved for failures the caller should see (e.g. the transport itself).
pub trait PeriodSource {
    fn fetch_period(
        &mut self,
        plant_id: u64,
        granularity: Granularity,
        period: &str,
    ) -> Result<Option<Vec<Category>>>;
}

impl<S: PeriodSource + ?Sized> PeriodSource for &mut S {
    fn fetch_period(
        &mut self,
        plant_id: u64,
        granularity: Granularity,
        period: &str,
    ) -> Result<Option<Vec<Category>>> {
        (**self).fetch_period(plant_id, granularity, period)
    }
}

/// The month/day energy endpoints, authorized with a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct EnergyEndpoint<'a> {
    api: &'a ApiClient,
    token: &'a str,
}

impl<'a> EnergyEndpoint<'a> {
    pub fn new(api: &'a ApiClient, token: &'a str) -> Self {
        Self { api, token }
    }
}

impl PeriodSource for EnergyEndpoint<'_> {
    fn fetch_period(
        &mut self,
        plant_id: u64,
        granularity: Granularity,
        period: &str,
    ) -> Result<Option<Vec<Category>>> {
        let url = self.api.api_url(&format!(
            "/plant/energy/{id}/{seg}?lan=en&date={period}&id={id}",
            id = plant_id,
            seg = granularity.endpoint(),
            period = period,
        ));
        let resp = self.api.get_authorized(&url, self.token)?;
        let status = resp.status();
        if !status.is_success() {
            tracing::info!("{} returned HTTP {}", period, status);
            return Ok(None);
        }

        let text = resp.text()?;
        let parsed: EnergyResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("unreadable energy response for {}: {}", period, e);
                return Ok(None);
            }
        };

        let infos = match parsed.data {
            Some(data) if !data.infos.is_empty() => data.infos,
            _ => return Ok(None),
        };

        // Data is present from here on; a bad category fails the run.
        let categories = infos
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<Category>>>()
            .map_err(|e| {
                tracing::error!("malformed category in {} data: {}", period, e);
                e
            })?;
        Ok(Some(categories))
    }
}

// ---------------------------------------------------------------------------
// HistoryWalk
// ---------------------------------------------------------------------------

/// Lazy, finite iterator over a plant's history, most recent period first.
///
/// Each `next()` issues exactly one request. The walk ends at the first
/// empty period or error and stays ended afterwards.
#[derive(Debug)]
pub struct HistoryWalk<S> {
    source: S,
    plant_id: u64,
    granularity: Granularity,
    cursor: Option<NaiveDate>,
    requests: usize,
}

impl<S: PeriodSource> HistoryWalk<S> {
    /// Start walking at `start`, or today (local time) when `None`.
    pub fn new(
        source: S,
        plant_id: u64,
        granularity: Granularity,
        start: Option<NaiveDate>,
    ) -> Self {
        Self {
            source,
            plant_id,
            granularity,
            cursor: Some(start.unwrap_or_else(|| Local::now().date_naive())),
            requests: 0,
        }
    }

    /// Number of requests issued so far, including a terminating one.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl<S: PeriodSource> Iterator for HistoryWalk<S> {
    type Item = Result<RawPeriodPayload>;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.cursor.take()?;
        let period = self.granularity.period_label(date);
        tracing::info!("fetching {:?} data for {}", self.granularity, period);

        self.requests += 1;
        match self
            .source
            .fetch_period(self.plant_id, self.granularity, &period)
        {
            Ok(Some(categories)) => {
                self.cursor = self.granularity.step_back(date);
                Some(Ok(RawPeriodPayload::new(period, categories)))
            }
            Ok(None) => {
                tracing::info!("no more {:?} data before {}", self.granularity, period);
                None
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Collect a plant's history for one granularity, most recent first.
pub fn fetch_range<S: PeriodSource>(
    source: S,
    plant_id: u64,
    granularity: Granularity,
    start: Option<NaiveDate>,
) -> Result<Vec<RawPeriodPayload>> {
    let mut walk = HistoryWalk::new(source, plant_id, granularity, start);
    let payloads = walk.by_ref().collect::<Result<Vec<_>>>()?;
    tracing::info!(
        "collected {} {:?} periods in {} requests",
        payloads.len(),
        granularity,
        walk.requests()
    );
    Ok(payloads)
}
