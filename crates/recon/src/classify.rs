use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Aggregate, AggregateKey, DiscrepancyRow, IdentityPartition};

/// Full outer join of the two ledgers' aggregates at one grain. Every
/// key from either side survives; a missing side defaults to zero so
/// one-ledger identities are never silently dropped.
pub fn diff_aggregates(matera: &[Aggregate], dock: &[Aggregate]) -> Vec<DiscrepancyRow> {
    let mut merged: BTreeMap<AggregateKey, (i64, i64)> = BTreeMap::new();

    for agg in matera {
        let key = AggregateKey {
            identity: agg.identity.clone(),
            doc_date: agg.doc_date.clone(),
        };
        merged.entry(key).or_insert((0, 0)).0 += agg.total_cents;
    }
    for agg in dock {
        let key = AggregateKey {
            identity: agg.identity.clone(),
            doc_date: agg.doc_date.clone(),
        };
        merged.entry(key).or_insert((0, 0)).1 += agg.total_cents;
    }

    merged
        .into_iter()
        .map(|(key, (matera_cents, dock_cents))| DiscrepancyRow {
            identity: key.identity,
            doc_date: key.doc_date,
            matera_cents,
            dock_cents,
            difference_cents: matera_cents - dock_cents,
        })
        .collect()
}

/// Identities whose difference is nonzero at this grain.
pub fn mismatch_identities(rows: &[DiscrepancyRow]) -> BTreeSet<String> {
    rows.iter()
        .filter(|row| row.difference_cents != 0)
        .map(|row| row.identity.clone())
        .collect()
}

/// Partition identities by where their totals disagree. The two
/// grains are classified independently — amounts can cancel across
/// dates, so neither is derivable from the other. All set algebra is
/// over normalized identity keys.
pub fn partition_identities(
    overall: &[DiscrepancyRow],
    by_date: &[DiscrepancyRow],
) -> IdentityPartition {
    let mismatch_overall = mismatch_identities(overall);
    let mismatch_by_date = mismatch_identities(by_date);
    let date_localized_only = mismatch_by_date
        .difference(&mismatch_overall)
        .cloned()
        .collect();

    IdentityPartition {
        mismatch_overall,
        mismatch_by_date,
        date_localized_only,
    }
}
