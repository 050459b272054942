use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Record — One timestamped sample inside a category
// ---------------------------------------------------------------------------

/// A single sample. `time` is empty for monthly data and an intra-day
/// timestamp (`HH:MM`) for daily data. `value` is kept as the raw string the
/// API sent; numeric coercion happens when the table is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

impl Record {
    pub fn new(time: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Category — A named metric stream (e.g. grid import, battery charge)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Category {
    /// Column header for this category, e.g. `"Grid (kWh)"`.
    pub fn column_name(&self) -> String {
        format!("{} ({})", self.label, self.unit)
    }
}

// ---------------------------------------------------------------------------
// RawPeriodPayload — One calendar unit's categories keyed by its date label
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPeriodPayload {
    /// `YYYY-MM` for monthly data, `YYYY-MM-DD` for daily data.
    pub period: String,
    pub categories: Vec<Category>,
}

impl RawPeriodPayload {
    pub fn new(period: impl Into<String>, categories: Vec<Category>) -> Self {
        Self {
            period: period.into(),
            categories,
        }
    }
}

// ---------------------------------------------------------------------------
// EnergyResponse — Envelope returned by the month/day energy endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct EnergyResponse {
    pub data: Option<EnergyData>,
}

/// Categories are kept undecoded here so that a malformed category can be
/// told apart from a missing or empty `data` block.
#[derive(Debug, Clone, Deserialize)]
pub struct EnergyData {
    #[serde(default)]
    pub infos: Vec<Value>,
}

/// Accept strings, numbers, or null where the API is inconsistent about
/// quoting. Null and missing both become an empty string.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
