use std::collections::BTreeSet;

use crate::model::{format_cents, IdentityPartition, Ledger, LedgerRow, Table};
use crate::summary::summarize;

/// Fixed sheet contract: names and order the workbook writer must
/// emit. Empty tables still ship their header row.
pub const SHEET_ORDER: [&str; 6] = [
    "se_matam_dock",
    "se_matam_matera",
    "summary_80_grouped",
    "nao_se_matam_dock",
    "nao_se_matam_matera",
    "summary_321_grouped",
];

const SUMMARY_COLUMNS: [&str; 3] = ["CPF", "Nome", "Id Contas"];

/// Canonical leading columns of a record sheet; the source's
/// passthrough columns follow in first-seen order. Labels are fixed
/// output contract, independent of input column renames.
fn record_columns(ledger: Ledger, passthrough: &[String]) -> Vec<String> {
    let canonical: &[&str] = match ledger {
        Ledger::Matera => &["CPF", "date_doc", "nVlrLanc"],
        Ledger::Dock => &[
            "CPF",
            "date_doc",
            "Valor",
            "Id Conta",
            "Nome",
            "Status Conta",
            "Data Cadastramento",
        ],
    };
    canonical
        .iter()
        .map(|c| c.to_string())
        .chain(passthrough.iter().cloned())
        .collect()
}

fn record_table(
    name: &str,
    ledger: Ledger,
    rows: &[LedgerRow],
    identities: &BTreeSet<String>,
    passthrough: &[String],
) -> Table {
    let columns = record_columns(ledger, passthrough);
    let rows = rows
        .iter()
        .filter(|row| identities.contains(&row.identity))
        .map(|row| {
            let mut cells = vec![row.identity.clone(), row.doc_date.clone()];
            cells.push(format_cents(row.amount_cents));
            if ledger == Ledger::Dock {
                cells.push(row.account_id.clone());
                cells.push(row.display_name.clone());
                cells.push(row.account_status.clone());
                cells.push(
                    row.registration_date
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                );
            }
            for column in passthrough {
                cells.push(row.raw.get(column).cloned().unwrap_or_default());
            }
            cells
        })
        .collect();

    Table { name: name.into(), columns, rows }
}

fn summary_table(name: &str, dock_rows: &[LedgerRow], identities: &BTreeSet<String>) -> Table {
    let rows = summarize(dock_rows, identities)
        .into_iter()
        .map(|s| vec![s.identity, s.display_name, s.account_ids.join(", ")])
        .collect();

    Table {
        name: name.into(),
        columns: SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// Build the six contract tables in sheet order: records and summary
/// for the date-localized-only set, then for the overall-mismatch set.
pub fn build_tables(
    matera_rows: &[LedgerRow],
    dock_rows: &[LedgerRow],
    matera_passthrough: &[String],
    dock_passthrough: &[String],
    partition: &IdentityPartition,
) -> Vec<Table> {
    let localized = &partition.date_localized_only;
    let mismatched = &partition.mismatch_overall;

    vec![
        record_table(SHEET_ORDER[0], Ledger::Dock, dock_rows, localized, dock_passthrough),
        record_table(SHEET_ORDER[1], Ledger::Matera, matera_rows, localized, matera_passthrough),
        summary_table(SHEET_ORDER[2], dock_rows, localized),
        record_table(SHEET_ORDER[3], Ledger::Dock, dock_rows, mismatched, dock_passthrough),
        record_table(SHEET_ORDER[4], Ledger::Matera, matera_rows, mismatched, matera_passthrough),
        summary_table(SHEET_ORDER[5], dock_rows, mismatched),
    ]
}
