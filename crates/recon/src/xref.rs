use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::DeparaConfig;
use crate::error::ReconError;
use crate::loader::promote_header;
use crate::model::{Grid, LedgerRow, XrefEntry};
use crate::normalize::normalize_identity;

/// Load the depara workbook grid into cross-reference entries. Shares
/// the banner/header-promotion handling with the Dock loader — the
/// depara export comes out of the same reporting tool.
pub fn load_depara(grid: &Grid, config: &DeparaConfig) -> Result<Vec<XrefEntry>, ReconError> {
    let (header, body) = promote_header(grid, config.anchor_column)?;

    let idx = |name: &str| -> Result<usize, ReconError> {
        header
            .iter()
            .position(|h| h.as_str() == name)
            .ok_or_else(|| ReconError::MissingColumn {
                source: grid.source.clone(),
                column: name.into(),
            })
    };

    let account_idx = idx(&config.account_column)?;
    let identity_idx = idx(&config.identity_column)?;
    let name_idx = idx(&config.name_column)?;
    let status_idx = idx(&config.status_column)?;
    let registered_idx = idx(&config.registered_column)?;

    let mut entries = Vec::new();
    for record in &body {
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cell = |i: usize| record.get(i).map(String::as_str).unwrap_or("");

        entries.push(XrefEntry {
            account_id: cell(account_idx).trim().to_string(),
            identity: normalize_identity(cell(identity_idx)),
            display_name: cell(name_idx).trim().to_string(),
            account_status: cell(status_idx).trim().to_string(),
            registration_date: parse_registration_date(cell(registered_idx)),
        });
    }

    Ok(entries)
}

/// Lenient registration-date parse. Accepts ISO dates, Brazilian
/// day-first dates, datetimes, and raw Excel serial numbers. Failure
/// is non-fatal: the entry keeps `None`.
fn parse_registration_date(text: &str) -> Option<NaiveDate> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(t, fmt) {
            return Some(date);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.date());
        }
    }
    // Excel serial day count (1900 date system).
    if let Ok(serial) = t.parse::<f64>() {
        if serial > 0.0 && serial < 200_000.0 {
            return NaiveDate::from_ymd_opt(1899, 12, 30)
                .map(|epoch| epoch + chrono::Duration::days(serial.trunc() as i64));
        }
    }
    None
}

/// Left join: attach identity metadata to Dock rows by account id.
///
/// Rows without a depara entry are real transactions — they keep the
/// unknown identity key and survive into aggregation. Returns how many
/// rows went unmatched. Duplicate account ids in depara keep the
/// first-seen entry.
pub fn join_dock(rows: &mut [LedgerRow], entries: &[XrefEntry]) -> usize {
    let mut by_account: HashMap<&str, &XrefEntry> = HashMap::new();
    for entry in entries {
        by_account.entry(entry.account_id.as_str()).or_insert(entry);
    }

    let mut unmatched = 0;
    for row in rows.iter_mut() {
        match by_account.get(row.account_id.as_str()) {
            Some(entry) => {
                row.identity = entry.identity.clone();
                row.display_name = entry.display_name.clone();
                row.account_status = entry.account_status.clone();
                row.registration_date = entry.registration_date;
            }
            None => unmatched += 1,
        }
    }
    unmatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;
    use crate::model::{Grid, Ledger};

    fn depara_grid() -> Grid {
        let rows = vec![
            vec!["Relatório Contas e Cartões", "", "", "", "", ""],
            vec![
                "",
                "Id Conta",
                "CPF",
                "Nome",
                "Status Conta",
                "Data Cadastramento",
            ],
            vec!["", "200", "123.456.789-01", "Ana Souza", "ATIVA", "2023-05-02"],
            vec!["", "201", "123.456.789-01", "Ana Souza", "ATIVA", "02/06/2023"],
            vec!["", "300", "987.654.321-00", "Bruno Lima", "BLOQUEADA", "45000"],
        ];
        Grid::new(
            "depara.xlsm",
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }

    fn dock_row(account_id: &str) -> LedgerRow {
        LedgerRow {
            ledger: Ledger::Dock,
            identity: String::new(),
            doc_date: "2024-03-15".into(),
            amount_cents: 100,
            account_id: account_id.into(),
            display_name: String::new(),
            account_status: String::new(),
            registration_date: None,
            raw: Default::default(),
        }
    }

    #[test]
    fn depara_load_with_banner() {
        let entries = load_depara(&depara_grid(), &ReconConfig::default().depara).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].account_id, "200");
        assert_eq!(entries[0].identity, "12345678901");
        assert_eq!(
            entries[0].registration_date,
            NaiveDate::from_ymd_opt(2023, 5, 2)
        );
        // Day-first format.
        assert_eq!(
            entries[1].registration_date,
            NaiveDate::from_ymd_opt(2023, 6, 2)
        );
        // Excel serial 45000 = 2023-03-15.
        assert_eq!(
            entries[2].registration_date,
            NaiveDate::from_ymd_opt(2023, 3, 15)
        );
    }

    #[test]
    fn depara_missing_column_is_fatal() {
        let mut grid = depara_grid();
        for row in &mut grid.rows {
            row.truncate(5);
        }
        let err = load_depara(&grid, &ReconConfig::default().depara).unwrap_err();
        assert!(err.to_string().contains("Data Cadastramento"), "{err}");
    }

    #[test]
    fn unreadable_registration_date_is_not_fatal() {
        let mut grid = depara_grid();
        grid.rows[2][5] = "em breve".into();
        let entries = load_depara(&grid, &ReconConfig::default().depara).unwrap();
        assert_eq!(entries[0].registration_date, None);
    }

    #[test]
    fn join_attaches_metadata_and_keeps_unmatched() {
        let entries = load_depara(&depara_grid(), &ReconConfig::default().depara).unwrap();
        let mut rows = vec![dock_row("200"), dock_row("300"), dock_row("999")];
        let unmatched = join_dock(&mut rows, &entries);
        assert_eq!(unmatched, 1);
        assert_eq!(rows[0].identity, "12345678901");
        assert_eq!(rows[0].display_name, "Ana Souza");
        assert_eq!(rows[1].account_status, "BLOQUEADA");
        // Unmatched row survives with the unknown identity key.
        assert_eq!(rows[2].identity, "");
        assert_eq!(rows[2].amount_cents, 100);
    }

    #[test]
    fn duplicate_account_id_keeps_first_entry() {
        let mut entries = load_depara(&depara_grid(), &ReconConfig::default().depara).unwrap();
        entries.push(XrefEntry {
            account_id: "200".into(),
            identity: "999".into(),
            display_name: "Dup".into(),
            account_status: "X".into(),
            registration_date: None,
        });
        let mut rows = vec![dock_row("200")];
        join_dock(&mut rows, &entries);
        assert_eq!(rows[0].display_name, "Ana Souza");
    }
}
