// Excel import (xlsx, xls, xlsb, ods) and result-workbook export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use matdock_recon::{Grid, Table};

use crate::source_name;

/// Read the first worksheet of an Excel file into a text grid. Banner
/// rows come through as-is; header promotion happens in the engine.
pub fn read_grid(path: &Path) -> Result<Grid, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| format!("{}: workbook has no sheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(Grid::new(source_name(path), rows))
}

/// Render one calamine cell as the text the engine parses.
///
/// Whole floats print without a decimal point so account ids and type
/// codes survive Excel's float storage ("30224", not "30224.0").
/// Date cells print their raw serial; the depara loader handles those.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            if serial.fract() == 0.0 {
                format!("{}", serial as i64)
            } else {
                format!("{}", serial)
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Write the result tables to one workbook, one sheet per table, in
/// the order given. Empty tables still get their header row.
pub fn write_workbook(tables: &[Table], path: &Path) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();

    for table in tables {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&table.name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", table.name, e))?;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, name)
                .map_err(|e| format!("Failed to write header in '{}': {}", table.name, e))?;
        }
        for (row, cells) in table.rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                worksheet
                    .write_string(row as u32 + 1, col as u16, cell)
                    .map_err(|e| format!("Failed to write cell in '{}': {}", table.name, e))?;
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}
