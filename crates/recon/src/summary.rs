use std::collections::{BTreeMap, BTreeSet};

use crate::model::{LedgerRow, SummaryRow};

/// Roll up the given identity set over processor rows: first-seen
/// display name plus the list of distinct account ids involved, in
/// first-seen order.
pub fn summarize(rows: &[LedgerRow], identities: &BTreeSet<String>) -> Vec<SummaryRow> {
    let mut by_identity: BTreeMap<String, SummaryRow> = BTreeMap::new();

    for row in rows.iter().filter(|r| identities.contains(&r.identity)) {
        let entry = by_identity
            .entry(row.identity.clone())
            .or_insert_with(|| SummaryRow {
                identity: row.identity.clone(),
                display_name: row.display_name.clone(),
                account_ids: Vec::new(),
            });
        if !row.account_id.is_empty() && !entry.account_ids.contains(&row.account_id) {
            entry.account_ids.push(row.account_id.clone());
        }
    }

    by_identity.into_values().collect()
}
