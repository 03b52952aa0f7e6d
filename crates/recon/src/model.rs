use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which system of record a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ledger {
    /// Settlement ledger — source of truth amounts.
    Matera,
    /// Card-processor ledger, compared against Matera.
    Dock,
}

impl std::fmt::Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matera => write!(f, "matera"),
            Self::Dock => write!(f, "dock"),
        }
    }
}

/// One pre-parsed tabular source: every cell as text, tagged with the
/// filename it came from. Banner rows of processor exports are part of
/// the grid; banner detection happens in the loader.
#[derive(Debug, Clone)]
pub struct Grid {
    pub source: String,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(source: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self { source: source.into(), rows }
    }
}

/// Pre-loaded grids for one reconciliation run. Each run owns its
/// input; nothing here is shared between runs.
pub struct ReconInput {
    pub matera: Vec<Grid>,
    pub dock: Vec<Grid>,
    pub depara: Grid,
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// A single canonical transaction record.
///
/// `amount_cents` is already sign-corrected for reversals; no
/// downstream stage re-applies sign logic. An empty `identity` is the
/// unknown-identity key, an empty `doc_date` the unknown-date
/// sentinel — both are real grouping keys, never dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub ledger: Ledger,
    pub identity: String,
    pub doc_date: String,
    pub amount_cents: i64,
    /// Processor account id. Empty for Matera rows.
    pub account_id: String,
    pub display_name: String,
    pub account_status: String,
    pub registration_date: Option<NaiveDate>,
    /// Source columns not mapped into the canonical fields.
    pub raw: HashMap<String, String>,
}

/// The rows loaded from one source file, plus the source's column
/// order for the passthrough fields (needed for stable sheet output).
#[derive(Debug, Clone)]
pub struct LedgerBatch {
    pub ledger: Ledger,
    pub source: String,
    pub passthrough: Vec<String>,
    pub rows: Vec<LedgerRow>,
}

/// One depara entry: account id → identity metadata. An identity may
/// own several account ids; each account id has one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XrefEntry {
    pub account_id: String,
    pub identity: String,
    pub display_name: String,
    pub account_status: String,
    pub registration_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Grouping grain for aggregation and differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grain {
    Identity,
    IdentityDate,
}

/// Aggregate key = identity plus, at the daily grain, document date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregateKey {
    pub identity: String,
    pub doc_date: Option<String>,
}

/// Signed-cent sum of all records sharing one aggregate key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub ledger: Ledger,
    pub identity: String,
    pub doc_date: Option<String>,
    pub total_cents: i64,
    pub record_count: usize,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// One outer-joined comparison row. Missing sides default to zero, so
/// an identity present in only one ledger still shows up here.
/// `difference_cents == 0` defines a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancyRow {
    pub identity: String,
    pub doc_date: Option<String>,
    pub matera_cents: i64,
    pub dock_cents: i64,
    pub difference_cents: i64,
}

/// Identity keys partitioned by where their totals disagree.
///
/// `date_localized_only` = `mismatch_by_date − mismatch_overall`:
/// daily totals disagree somewhere but the grand totals net out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityPartition {
    pub mismatch_overall: BTreeSet<String>,
    pub mismatch_by_date: BTreeSet<String>,
    pub date_localized_only: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Per-identity roll-up: first-seen display name and the deduplicated
/// account ids involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub identity: String,
    pub display_name: String,
    pub account_ids: Vec<String>,
}

/// A writer-facing result table: one workbook sheet. Empty tables
/// keep their columns so the writer can emit a header-only sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub matera_rows: usize,
    pub dock_rows: usize,
    /// Distinct identity keys seen across both ledgers.
    pub identities: usize,
    pub mismatch_overall: usize,
    pub date_localized_only: usize,
    /// Dock rows with no depara entry, bucketed under the unknown
    /// identity key and flagged for back-office review.
    pub unknown_identity_rows: usize,
    pub table_rows: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub discrepancies_overall: Vec<DiscrepancyRow>,
    pub discrepancies_by_date: Vec<DiscrepancyRow>,
    pub partition: IdentityPartition,
    /// The six contract tables, in sheet order.
    pub tables: Vec<Table>,
}

/// Render signed cents as a plain 2-decimal string ("-12.05").
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_formatting() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(-5), "-0.05");
        assert_eq!(format_cents(123456), "1234.56");
        assert_eq!(format_cents(-100), "-1.00");
    }

    #[test]
    fn aggregate_key_ordering_puts_no_date_first() {
        let a = AggregateKey { identity: "123".into(), doc_date: None };
        let b = AggregateKey { identity: "123".into(), doc_date: Some("2024-03-15".into()) };
        assert!(a < b);
    }
}
