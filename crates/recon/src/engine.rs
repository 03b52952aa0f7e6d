use std::collections::{BTreeSet, HashMap};

use crate::aggregate::aggregate_rows;
use crate::classify::{diff_aggregates, partition_identities};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::loader::{load_dock, load_matera};
use crate::model::{
    Grain, Ledger, LedgerRow, ReconInput, ReconMeta, ReconResult, ReconSummary,
};
use crate::report::build_tables;
use crate::xref::{join_dock, load_depara};

/// Run one reconciliation to completion: ingest, join, aggregate at
/// both grains, classify, and build the six contract tables.
///
/// Ingestion is all-or-nothing — a fatal error on any input file
/// aborts the run, since silently excluding a file would corrupt
/// aggregate totals.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    config.validate()?;
    if input.matera.is_empty() {
        return Err(ReconError::EmptyInput("matera".into()));
    }
    if input.dock.is_empty() {
        return Err(ReconError::EmptyInput("dock".into()));
    }

    let mut matera_rows: Vec<LedgerRow> = Vec::new();
    let mut matera_passthrough: Vec<String> = Vec::new();
    for grid in &input.matera {
        let batch = load_matera(grid, &config.matera)?;
        merge_columns(&mut matera_passthrough, &batch.passthrough);
        matera_rows.extend(batch.rows);
    }

    let mut dock_rows: Vec<LedgerRow> = Vec::new();
    let mut dock_passthrough: Vec<String> = Vec::new();
    for grid in &input.dock {
        let batch = load_dock(grid, &config.dock)?;
        merge_columns(&mut dock_passthrough, &batch.passthrough);
        dock_rows.extend(batch.rows);
    }

    let entries = load_depara(&input.depara, &config.depara)?;
    let unknown_identity_rows = join_dock(&mut dock_rows, &entries);

    let matera_overall = aggregate_rows(Ledger::Matera, &matera_rows, Grain::Identity);
    let dock_overall = aggregate_rows(Ledger::Dock, &dock_rows, Grain::Identity);
    let matera_daily = aggregate_rows(Ledger::Matera, &matera_rows, Grain::IdentityDate);
    let dock_daily = aggregate_rows(Ledger::Dock, &dock_rows, Grain::IdentityDate);

    let discrepancies_overall = diff_aggregates(&matera_overall, &dock_overall);
    let discrepancies_by_date = diff_aggregates(&matera_daily, &dock_daily);
    let partition = partition_identities(&discrepancies_overall, &discrepancies_by_date);

    let tables = build_tables(
        &matera_rows,
        &dock_rows,
        &matera_passthrough,
        &dock_passthrough,
        &partition,
    );

    let identities: BTreeSet<&str> = discrepancies_overall
        .iter()
        .map(|row| row.identity.as_str())
        .collect();
    let table_rows: HashMap<String, usize> = tables
        .iter()
        .map(|table| (table.name.clone(), table.rows.len()))
        .collect();

    let summary = ReconSummary {
        matera_rows: matera_rows.len(),
        dock_rows: dock_rows.len(),
        identities: identities.len(),
        mismatch_overall: partition.mismatch_overall.len(),
        date_localized_only: partition.date_localized_only.len(),
        unknown_identity_rows,
        table_rows,
    };

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        discrepancies_overall,
        discrepancies_by_date,
        partition,
        tables,
    })
}

fn merge_columns(into: &mut Vec<String>, columns: &[String]) {
    for column in columns {
        if !into.contains(column) {
            into.push(column.clone());
        }
    }
}
