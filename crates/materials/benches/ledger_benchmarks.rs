use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, NaiveDate, Utc};
use sitebook_core::Timestamps;
use sitebook_materials::{
    MaterialId, MaterialTransaction, TransactionFilter, TransactionId, TransactionKind, ledger_for,
};

fn movement_log(material_id: MaterialId, count: usize) -> Vec<MaterialTransaction> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let kind = if i % 3 == 0 { TransactionKind::Out } else { TransactionKind::In };
            let quantity = (i % 50 + 1) as f64;
            MaterialTransaction {
                id: TransactionId::new(),
                material_id,
                kind,
                quantity,
                unit_cost: 4.5,
                total_cost: quantity * 4.5,
                // Spread over a year, deliberately out of order.
                date: start + Duration::days(((i * 7919) % 365) as i64),
                reference_order: None,
                supplier: None,
                project: None,
                notes: None,
                timestamps: Timestamps::new(now),
            }
        })
        .collect()
}

fn bench_ledger_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_aggregation");

    for count in [10usize, 100, 1_000, 10_000].iter() {
        let material_id = MaterialId::new();
        let log = movement_log(material_id, *count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::new("unfiltered", count), &log, |b, log| {
            b.iter(|| {
                let ledger = ledger_for(material_id, log.iter().cloned(), &TransactionFilter::default());
                black_box(ledger.summary);
            });
        });

        let filter = TransactionFilter {
            kind: Some(TransactionKind::In),
            from: NaiveDate::from_ymd_opt(2024, 3, 1),
            to: NaiveDate::from_ymd_opt(2024, 9, 30),
        };
        group.bench_with_input(BenchmarkId::new("type_and_range", count), &log, |b, log| {
            b.iter(|| {
                let ledger = ledger_for(material_id, log.iter().cloned(), &filter);
                black_box(ledger.summary);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ledger_aggregation);
criterion_main!(benches);
