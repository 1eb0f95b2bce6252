//! Material transaction ledger (read-side aggregation).
//!
//! Folds the movement log of one material into running totals. This is pure:
//! callers fetch the transactions, the ledger filters, orders and sums them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sitebook_core::input;

use crate::material::MaterialId;
use crate::transaction::{MaterialTransaction, TransactionKind};

/// Filter applied before aggregation. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(rename = "type", default, deserialize_with = "input::opt_choice")]
    pub kind: Option<TransactionKind>,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &MaterialTransaction) -> bool {
        if self.kind.is_some_and(|k| k != tx.kind) {
            return false;
        }
        if self.from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.date > to) {
            return false;
        }
        true
    }
}

/// Totals over a set of transactions.
///
/// Invariants: `net_quantity = total_in - total_out` and
/// `net_value = total_in_value - total_out_value`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_in: f64,
    pub total_out: f64,
    pub total_in_value: f64,
    pub total_out_value: f64,
    pub net_quantity: f64,
    pub net_value: f64,
    pub transaction_count: usize,
}

impl LedgerSummary {
    pub fn from_transactions<'a>(txs: impl IntoIterator<Item = &'a MaterialTransaction>) -> Self {
        let mut summary = LedgerSummary::default();
        for tx in txs {
            match tx.kind {
                TransactionKind::In => {
                    summary.total_in += tx.quantity;
                    summary.total_in_value += tx.total_cost;
                }
                TransactionKind::Out => {
                    summary.total_out += tx.quantity;
                    summary.total_out_value += tx.total_cost;
                }
            }
            summary.transaction_count += 1;
        }
        summary.net_quantity = summary.total_in - summary.total_out;
        summary.net_value = summary.total_in_value - summary.total_out_value;
        summary
    }
}

/// Filtered, date-ordered transactions of one material plus their totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialLedger {
    pub material_id: MaterialId,
    pub transactions: Vec<MaterialTransaction>,
    pub summary: LedgerSummary,
}

impl MaterialLedger {
    /// Build the ledger of `material_id` from an unfiltered transaction list.
    ///
    /// Transactions of other materials are ignored. Ordering is by date
    /// ascending, ties broken by id (i.e. recording order).
    pub fn build(
        material_id: MaterialId,
        transactions: impl IntoIterator<Item = MaterialTransaction>,
        filter: &TransactionFilter,
    ) -> Self {
        let mut transactions: Vec<MaterialTransaction> = transactions
            .into_iter()
            .filter(|tx| tx.material_id == material_id && filter.matches(tx))
            .collect();
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let summary = LedgerSummary::from_transactions(&transactions);
        Self {
            material_id,
            transactions,
            summary,
        }
    }
}

/// Ledger of `material_id` over `transactions` restricted by `filter`.
pub fn ledger_for(
    material_id: MaterialId,
    transactions: impl IntoIterator<Item = MaterialTransaction>,
    filter: &TransactionFilter,
) -> MaterialLedger {
    MaterialLedger::build(material_id, transactions, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionId;
    use chrono::Utc;
    use proptest::prelude::*;
    use sitebook_core::Timestamps;

    fn tx(material_id: MaterialId, kind: TransactionKind, quantity: f64, total_cost: f64, day: u32) -> MaterialTransaction {
        MaterialTransaction {
            id: TransactionId::new(),
            material_id,
            kind,
            quantity,
            unit_cost: if quantity > 0.0 { total_cost / quantity } else { 0.0 },
            total_cost,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            reference_order: None,
            supplier: None,
            project: None,
            notes: None,
            timestamps: Timestamps::new(Utc::now()),
        }
    }

    #[test]
    fn in_and_out_scenario() {
        let m = MaterialId::new();
        let ledger = MaterialLedger::build(
            m,
            vec![
                tx(m, TransactionKind::In, 100.0, 500.0, 1),
                tx(m, TransactionKind::Out, 30.0, 150.0, 2),
            ],
            &TransactionFilter::default(),
        );

        let s = ledger.summary;
        assert_eq!(s.total_in, 100.0);
        assert_eq!(s.total_out, 30.0);
        assert_eq!(s.total_in_value, 500.0);
        assert_eq!(s.total_out_value, 150.0);
        assert_eq!(s.net_quantity, 70.0);
        assert_eq!(s.net_value, 350.0);
    }

    #[test]
    fn blank_filter_values_mean_no_filter() {
        let filter: TransactionFilter =
            serde_json::from_value(serde_json::json!({ "type": "", "from": "", "to": "" })).unwrap();
        assert_eq!(filter, TransactionFilter::default());

        let filter: TransactionFilter =
            serde_json::from_value(serde_json::json!({ "type": "out", "to": "2024-01-31" })).unwrap();
        assert_eq!(filter.kind, Some(TransactionKind::Out));
        assert_eq!(filter.to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(filter.from, None);
    }

    #[test]
    fn empty_ledger_is_all_zero() {
        let ledger = MaterialLedger::build(MaterialId::new(), Vec::new(), &TransactionFilter::default());
        assert!(ledger.transactions.is_empty());
        assert_eq!(ledger.summary, LedgerSummary::default());
    }

    #[test]
    fn summary_serializes_with_camel_case_keys() {
        let m = MaterialId::new();
        let ledger = MaterialLedger::build(m, vec![tx(m, TransactionKind::In, 2.0, 4.0, 3)], &TransactionFilter::default());
        let v = serde_json::to_value(ledger.summary).unwrap();
        assert_eq!(v["totalIn"], 2.0);
        assert_eq!(v["totalInValue"], 4.0);
        assert_eq!(v["netQuantity"], 2.0);
    }

    #[test]
    fn filters_by_material_type_and_inclusive_dates() {
        let m = MaterialId::new();
        let other = MaterialId::new();
        let all = vec![
            tx(m, TransactionKind::In, 10.0, 10.0, 5),
            tx(m, TransactionKind::Out, 1.0, 1.0, 10),
            tx(m, TransactionKind::In, 3.0, 3.0, 15),
            tx(m, TransactionKind::In, 4.0, 4.0, 20),
            tx(other, TransactionKind::In, 99.0, 99.0, 10),
        ];

        let filter = TransactionFilter {
            kind: Some(TransactionKind::In),
            from: NaiveDate::from_ymd_opt(2024, 1, 5),
            to: NaiveDate::from_ymd_opt(2024, 1, 15),
        };
        let ledger = MaterialLedger::build(m, all, &filter);
        let quantities: Vec<f64> = ledger.transactions.iter().map(|t| t.quantity).collect();
        assert_eq!(quantities, vec![10.0, 3.0]);
        assert_eq!(ledger.summary.total_in, 13.0);
        assert_eq!(ledger.summary.total_out, 0.0);
    }

    #[test]
    fn transactions_are_ordered_by_date() {
        let m = MaterialId::new();
        let ledger = MaterialLedger::build(
            m,
            vec![
                tx(m, TransactionKind::In, 1.0, 1.0, 20),
                tx(m, TransactionKind::In, 2.0, 2.0, 2),
                tx(m, TransactionKind::Out, 3.0, 3.0, 11),
            ],
            &TransactionFilter::default(),
        );
        let days: Vec<NaiveDate> = ledger.transactions.iter().map(|t| t.date).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
    }

    fn arb_kind() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![Just(TransactionKind::In), Just(TransactionKind::Out)]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: net figures are always the difference of the in/out totals.
        #[test]
        fn net_equals_in_minus_out(
            moves in prop::collection::vec((arb_kind(), 0.01f64..10_000.0, 0.0f64..100_000.0, 1u32..28), 0..40)
        ) {
            let m = MaterialId::new();
            let txs: Vec<MaterialTransaction> = moves
                .into_iter()
                .map(|(kind, q, v, day)| tx(m, kind, q, v, day))
                .collect();
            let s = MaterialLedger::build(m, txs, &TransactionFilter::default()).summary;

            prop_assert_eq!(s.net_quantity, s.total_in - s.total_out);
            prop_assert_eq!(s.net_value, s.total_in_value - s.total_out_value);
        }

        /// Property: splitting by type partitions the ledger.
        #[test]
        fn type_filters_partition_the_ledger(
            moves in prop::collection::vec((arb_kind(), 1u32..1_000, 1u32..28), 0..40)
        ) {
            let m = MaterialId::new();
            let txs: Vec<MaterialTransaction> = moves
                .into_iter()
                .map(|(kind, q, day)| tx(m, kind, f64::from(q), f64::from(q) * 2.0, day))
                .collect();

            let all = MaterialLedger::build(m, txs.clone(), &TransactionFilter::default());
            let ins = MaterialLedger::build(m, txs.clone(), &TransactionFilter { kind: Some(TransactionKind::In), ..TransactionFilter::default() });
            let outs = MaterialLedger::build(m, txs, &TransactionFilter { kind: Some(TransactionKind::Out), ..TransactionFilter::default() });

            prop_assert_eq!(ins.transactions.len() + outs.transactions.len(), all.transactions.len());
            prop_assert_eq!(ins.summary.total_in, all.summary.total_in);
            prop_assert_eq!(outs.summary.total_out, all.summary.total_out);
            prop_assert_eq!(ins.summary.total_out, 0.0);
            prop_assert_eq!(outs.summary.total_in, 0.0);
        }
    }
}
