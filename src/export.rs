//! Two-sheet Excel export of the monthly and daily tables.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::Result;
use crate::history::Granularity;
use crate::table::TimeTable;

/// File name for an export of `plant_id` generated at `generated_at`,
/// e.g. `solar_data_history_227328_20240305_142501.xlsx`.
pub fn output_filename(plant_id: u64, generated_at: NaiveDateTime) -> String {
    format!(
        "solar_data_history_{}_{}.xlsx",
        plant_id,
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Write both tables to `destination`, replacing any existing file.
///
/// The workbook always holds exactly two sheets, "Monthly Data" then
/// "Daily Data", even when a table is empty.
pub fn export(monthly: &TimeTable, daily: &TimeTable, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for (granularity, table) in [(Granularity::Monthly, monthly), (Granularity::Daily, daily)] {
        let worksheet = workbook.add_worksheet().set_name(granularity.sheet_name())?;
        write_table(worksheet, table, &header)?;
    }

    workbook.save(destination)?;
    tracing::info!(
        "wrote {} monthly and {} daily rows to {}",
        monthly.len(),
        daily.len(),
        destination.display()
    );
    Ok(())
}

/// Header row first, then one row per time key. Missing cells stay blank.
fn write_table(worksheet: &mut Worksheet, table: &TimeTable, header: &Format) -> Result<()> {
    worksheet.write_string_with_format(0, 0, table.index_label(), header)?;
    for (idx, column) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col_index(idx + 1)?, column, header)?;
    }

    for (idx, (time_key, cells)) in table.rows().enumerate() {
        let row = row_index(idx + 1)?;
        worksheet.write_string(row, 0, time_key)?;
        for (col, column) in table.columns().iter().enumerate() {
            if let Some(value) = cells.get(column) {
                worksheet.write_number(row, col_index(col + 1)?, *value)?;
            }
        }
    }

    worksheet.set_column_width(0, 18)?;
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn row_index(idx: usize) -> Result<u32> {
    Ok(u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)?)
}

fn col_index(idx: usize) -> Result<u16> {
    Ok(u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)?)
}
