//! File I/O for the reconciliation pipeline: reads delimited and Excel
//! sources into text grids, writes the result workbook. All parsing
//! semantics live in `matdock-recon`; this crate only moves cells.

pub mod csv;
pub mod xlsx;

use std::path::Path;

use matdock_recon::Grid;

/// Read one input file into a grid, dispatching on extension.
/// Delimited text goes through the delimiter sniffer; everything else
/// is treated as an Excel workbook.
pub fn read_grid(path: &Path) -> Result<Grid, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" | "tsv" => csv::read_grid(path),
        _ => xlsx::read_grid(path),
    }
}

/// The grid's source tag: file name only, so loader errors and
/// filename date extraction stay stable across directories.
pub(crate) fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}
