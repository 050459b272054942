//! Pivot of raw period payloads into a sparse, time-indexed table.
//!
//! Each record contributes one cell at (time key, `"{label} ({unit})"`).
//! Contributions that land on the same cell are summed, never overwritten.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{ExportError, Result};
use crate::history::Granularity;
use crate::models::RawPeriodPayload;

/// One row per time key, one column per category. Missing cells are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    granularity: Granularity,
    /// Column names in first-seen order.
    columns: Vec<String>,
    column_set: HashSet<String>,
    rows: BTreeMap<String, HashMap<String, f64>>,
}

impl TimeTable {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            columns: Vec::new(),
            column_set: HashSet::new(),
            rows: BTreeMap::new(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// `"Date"` for monthly tables, `"Date/Time"` for daily ones.
    pub fn index_label(&self) -> &'static str {
        self.granularity.index_label()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in ascending time-key order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &HashMap<String, f64>)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn time_keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn get(&self, time_key: &str, column: &str) -> Option<f64> {
        self.rows.get(time_key).and_then(|row| row.get(column)).copied()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add `value` into the cell at (`time_key`, `column`), creating the
    /// row, column, or cell as needed.
    pub fn accumulate(&mut self, time_key: &str, column: &str, value: f64) {
        if !self.column_set.contains(column) {
            self.column_set.insert(column.to_string());
            self.columns.push(column.to_string());
        }

        let row = self.rows.entry(time_key.to_string()).or_default();
        match row.entry(column.to_string()) {
            Entry::Occupied(mut cell) => *cell.get_mut() += value,
            Entry::Vacant(cell) => {
                cell.insert(value);
            }
        }
    }
}

/// Row key of a record: the period itself for monthly data, the period
/// followed by the record's intra-day time for daily data.
pub fn time_key(granularity: Granularity, period: &str, record_time: &str) -> String {
    if granularity.is_daily() {
        format!("{} {}", period, record_time)
    } else {
        period.to_string()
    }
}

/// Fold every record of every payload into a [`TimeTable`].
///
/// Fails on the first value that is not a number; no partial table is
/// returned.
pub fn build_table(payloads: &[RawPeriodPayload], granularity: Granularity) -> Result<TimeTable> {
    let mut table = TimeTable::new(granularity);

    for payload in payloads {
        for category in &payload.categories {
            let column = category.column_name();
            for record in &category.records {
                let key = time_key(granularity, &payload.period, &record.time);
                let value = record.value.trim().parse::<f64>().map_err(|_| {
                    ExportError::InvalidValue {
                        time_key: key.clone(),
                        column: column.clone(),
                        value: record.value.clone(),
                    }
                })?;
                table.accumulate(&key, &column, value);
            }
        }
    }

    tracing::debug!(
        "built {:?} table: {} rows x {} columns",
        granularity,
        table.len(),
        table.columns().len()
    );
    Ok(table)
}
