use std::collections::HashMap;

use crate::config::{DockConfig, MateraConfig};
use crate::error::ReconError;
use crate::model::{Grid, Ledger, LedgerBatch, LedgerRow};
use crate::normalize::{extract_date, normalize_identity, parse_amount_cents};

/// Locate the real header row in a banner-prefixed export grid.
///
/// Processor exports prepend merged title rows; the first row with a
/// non-empty cell in the anchor column is the header. Columns whose
/// header cell is blank are dropped entirely. Returns the promoted
/// header and the data rows below it, both restricted to kept columns.
pub(crate) fn promote_header(
    grid: &Grid,
    anchor_column: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>), ReconError> {
    let header_at = grid
        .rows
        .iter()
        .position(|row| {
            row.get(anchor_column)
                .map(|cell| !cell.trim().is_empty())
                .unwrap_or(false)
        })
        .ok_or_else(|| ReconError::MalformedAnchor { source: grid.source.clone() })?;

    let header_row = &grid.rows[header_at];
    let keep: Vec<usize> = header_row
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    let header: Vec<String> = keep.iter().map(|&i| header_row[i].trim().to_string()).collect();
    let body: Vec<Vec<String>> = grid.rows[header_at + 1..]
        .iter()
        .map(|row| {
            keep.iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    Ok((header, body))
}

fn column_index(header: &[String], source: &str, name: &str) -> Result<usize, ReconError> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| ReconError::MissingColumn {
            source: source.into(),
            column: name.into(),
        })
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Load one Matera settlement export: row 0 is the header, the
/// document date comes from the filename, and the amount is negated
/// when the history code is a reversal code.
pub fn load_matera(grid: &Grid, config: &MateraConfig) -> Result<LedgerBatch, ReconError> {
    let header = grid.rows.first().ok_or_else(|| ReconError::MissingColumn {
        source: grid.source.clone(),
        column: config.identity_column.clone(),
    })?;
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    let identity_idx = column_index(&header, &grid.source, &config.identity_column)?;
    let amount_idx = column_index(&header, &grid.source, &config.amount_column)?;
    // The kind column is required up front even though it is only read
    // per row; a partial load must never slip through.
    let kind_idx = column_index(&header, &grid.source, &config.kind_column)?;

    let doc_date = extract_date(&grid.source);
    let passthrough = passthrough_columns(&header, &[identity_idx, amount_idx]);

    let mut rows = Vec::new();
    for (row_no, record) in grid.rows[1..].iter().enumerate() {
        if is_blank_row(record) {
            continue;
        }
        let cell = |i: usize| record.get(i).map(String::as_str).unwrap_or("");

        let raw_amount = cell(amount_idx);
        let mut amount_cents =
            parse_amount_cents(raw_amount).ok_or_else(|| ReconError::AmountParse {
                source: grid.source.clone(),
                row: row_no + 1,
                value: raw_amount.into(),
            })?;
        let kind = cell(kind_idx).trim();
        if config.reversal_codes.iter().any(|code| code == kind) {
            amount_cents = -amount_cents;
        }

        rows.push(LedgerRow {
            ledger: Ledger::Matera,
            identity: normalize_identity(cell(identity_idx)),
            doc_date: doc_date.clone(),
            amount_cents,
            account_id: String::new(),
            display_name: String::new(),
            account_status: String::new(),
            registration_date: None,
            raw: collect_raw(&header, record, &[identity_idx, amount_idx]),
        });
    }

    Ok(LedgerBatch {
        ledger: Ledger::Matera,
        source: grid.source.clone(),
        passthrough,
        rows,
    })
}

/// Load one Dock processor export: banner scan + header promotion,
/// then the same canonicalization as Matera. The identity key stays
/// unknown here — it is attached by the depara join.
pub fn load_dock(grid: &Grid, config: &DockConfig) -> Result<LedgerBatch, ReconError> {
    let (header, body) = promote_header(grid, config.anchor_column)?;

    let account_idx = column_index(&header, &grid.source, &config.account_column)?;
    let amount_idx = column_index(&header, &grid.source, &config.amount_column)?;
    let kind_idx = column_index(&header, &grid.source, &config.kind_column)?;

    let doc_date = extract_date(&grid.source);
    let passthrough = passthrough_columns(&header, &[account_idx, amount_idx]);

    let mut rows = Vec::new();
    for (row_no, record) in body.iter().enumerate() {
        if is_blank_row(record) {
            continue;
        }
        let cell = |i: usize| record.get(i).map(String::as_str).unwrap_or("");

        let raw_amount = cell(amount_idx);
        let mut amount_cents =
            parse_amount_cents(raw_amount).ok_or_else(|| ReconError::AmountParse {
                source: grid.source.clone(),
                row: row_no + 1,
                value: raw_amount.into(),
            })?;
        let kind = cell(kind_idx).trim();
        if config.reversal_codes.iter().any(|code| code == kind) {
            amount_cents = -amount_cents;
        }

        rows.push(LedgerRow {
            ledger: Ledger::Dock,
            identity: String::new(),
            doc_date: doc_date.clone(),
            amount_cents,
            account_id: cell(account_idx).trim().to_string(),
            display_name: String::new(),
            account_status: String::new(),
            registration_date: None,
            raw: collect_raw(&header, record, &[account_idx, amount_idx]),
        });
    }

    Ok(LedgerBatch {
        ledger: Ledger::Dock,
        source: grid.source.clone(),
        passthrough,
        rows,
    })
}

fn passthrough_columns(header: &[String], mapped: &[usize]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .filter(|(i, name)| !mapped.contains(i) && !name.is_empty())
        .map(|(_, name)| name.clone())
        .collect()
}

fn collect_raw(
    header: &[String],
    record: &[String],
    mapped: &[usize],
) -> HashMap<String, String> {
    let mut raw = HashMap::new();
    for (i, name) in header.iter().enumerate() {
        if mapped.contains(&i) || name.is_empty() {
            continue;
        }
        raw.insert(
            name.clone(),
            record.get(i).map(String::as_str).unwrap_or("").to_string(),
        );
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;

    fn grid(source: &str, rows: &[&[&str]]) -> Grid {
        Grid::new(
            source,
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn matera_grid(rows: &[&[&str]]) -> Grid {
        grid("matera_2024-03-15.csv", rows)
    }

    #[test]
    fn matera_basic_load() {
        let g = matera_grid(&[
            &["sCpf_Cnpj", "nVlrLanc", "nHistorico", "sDescricao"],
            &["123.456.789-01", "100,50", "1001", "pix in"],
            &["123.456.789-01", "25,00", "1002", "card"],
        ]);
        let batch = load_matera(&g, &ReconConfig::default().matera).unwrap();
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0].identity, "12345678901");
        assert_eq!(batch.rows[0].doc_date, "2024-03-15");
        assert_eq!(batch.rows[0].amount_cents, 10050);
        assert_eq!(batch.rows[0].raw["sDescricao"], "pix in");
        assert_eq!(batch.rows[0].raw["nHistorico"], "1001");
        assert_eq!(batch.passthrough, vec!["nHistorico", "sDescricao"]);
    }

    #[test]
    fn matera_reversal_code_flips_sign() {
        let g = matera_grid(&[
            &["sCpf_Cnpj", "nVlrLanc", "nHistorico"],
            &["123", "100", "9001"],
            &["123", "100", "1001"],
        ]);
        let batch = load_matera(&g, &ReconConfig::default().matera).unwrap();
        assert_eq!(batch.rows[0].amount_cents, -10000);
        assert_eq!(batch.rows[1].amount_cents, 10000);
    }

    #[test]
    fn matera_missing_column_is_fatal() {
        let g = matera_grid(&[&["sCpf_Cnpj", "nVlrLanc"], &["123", "1"]]);
        let err = load_matera(&g, &ReconConfig::default().matera).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nHistorico"), "{msg}");
        assert!(msg.contains("matera_2024-03-15.csv"), "{msg}");
    }

    #[test]
    fn matera_unparsable_amount_is_fatal() {
        let g = matera_grid(&[
            &["sCpf_Cnpj", "nVlrLanc", "nHistorico"],
            &["123", "n/a", "1001"],
        ]);
        let err = load_matera(&g, &ReconConfig::default().matera).unwrap_err();
        assert!(matches!(err, ReconError::AmountParse { row: 1, .. }), "{err}");
    }

    #[test]
    fn matera_unknown_date_filename_keeps_sentinel() {
        let g = grid(
            "matera-latest.csv",
            &[&["sCpf_Cnpj", "nVlrLanc", "nHistorico"], &["123", "1", "1001"]],
        );
        let batch = load_matera(&g, &ReconConfig::default().matera).unwrap();
        assert_eq!(batch.rows[0].doc_date, "");
    }

    fn dock_grid(rows: &[&[&str]]) -> Grid {
        grid("dock_2024-03-15_export.xlsx", rows)
    }

    #[test]
    fn dock_banner_promotion() {
        // Export shape: title row, then the real header detected via a
        // non-empty cell in the anchor column (index 2).
        let g = dock_grid(&[
            &["Relatório de Transações", "", "", ""],
            &["", "Id Conta", "Valor", "Id Tipo Transacao"],
            &["x", "200", "100.00", "10001"],
        ]);
        let batch = load_dock(&g, &ReconConfig::default().dock).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].account_id, "200");
        assert_eq!(batch.rows[0].amount_cents, 10000);
        // Column 0 had a blank header and is dropped; "x" never shows up.
        assert!(batch.rows[0].raw.values().all(|v| v != "x"));
    }

    #[test]
    fn dock_reversal_set_flips_sign() {
        let g = dock_grid(&[
            &["t", "", "", ""],
            &["", "Id Conta", "Valor", "Id Tipo Transacao"],
            &["", "200", "50", "30224"],
            &["", "200", "50", "30350"],
            &["", "200", "50", "30100"],
        ]);
        let batch = load_dock(&g, &ReconConfig::default().dock).unwrap();
        let cents: Vec<i64> = batch.rows.iter().map(|r| r.amount_cents).collect();
        assert_eq!(cents, vec![-5000, -5000, 5000]);
    }

    #[test]
    fn dock_without_anchor_is_fatal() {
        let g = dock_grid(&[&["only", "banner"], &["rows", "here"]]);
        let err = load_dock(&g, &ReconConfig::default().dock).unwrap_err();
        assert!(matches!(err, ReconError::MalformedAnchor { .. }), "{err}");
    }

    #[test]
    fn dock_missing_column_after_promotion_is_fatal() {
        let g = dock_grid(&[
            &["t", "", ""],
            &["", "Id Conta", "Valor"],
            &["", "200", "50"],
        ]);
        let err = load_dock(&g, &ReconConfig::default().dock).unwrap_err();
        assert!(err.to_string().contains("Id Tipo Transacao"), "{err}");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let g = matera_grid(&[
            &["sCpf_Cnpj", "nVlrLanc", "nHistorico"],
            &["", "", ""],
            &["123", "1", "1001"],
        ]);
        let batch = load_matera(&g, &ReconConfig::default().matera).unwrap();
        assert_eq!(batch.rows.len(), 1);
    }
}
