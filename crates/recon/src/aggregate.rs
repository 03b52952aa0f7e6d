use std::collections::BTreeMap;

use crate::model::{Aggregate, AggregateKey, Grain, Ledger, LedgerRow};

/// Group rows at the given grain and sum signed cents. Keys are
/// unique and emitted in deterministic (BTreeMap) order; the unknown
/// identity "" and the unknown date sentinel are ordinary keys.
pub fn aggregate_rows(ledger: Ledger, rows: &[LedgerRow], grain: Grain) -> Vec<Aggregate> {
    let mut groups: BTreeMap<AggregateKey, (i64, usize)> = BTreeMap::new();

    for row in rows {
        let key = AggregateKey {
            identity: row.identity.clone(),
            doc_date: match grain {
                Grain::Identity => None,
                Grain::IdentityDate => Some(row.doc_date.clone()),
            },
        };
        let entry = groups.entry(key).or_insert((0, 0));
        entry.0 += row.amount_cents;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (total_cents, record_count))| Aggregate {
            ledger,
            identity: key.identity,
            doc_date: key.doc_date,
            total_cents,
            record_count,
        })
        .collect()
}
