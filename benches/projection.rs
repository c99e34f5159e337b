use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use flowplan_core::{project, TransactionStore};
use flowplan_domain::{Direction, Transaction, TransactionDraft, YearMonth};
use uuid::Uuid;

fn start() -> YearMonth {
    YearMonth::new(2025, 1).expect("valid month")
}

fn sample_transactions(count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|idx| {
            let direction = if idx % 4 == 0 {
                Direction::Income
            } else {
                Direction::Expense
            };
            let amount = 25.0 + (idx % 100) as f64;
            let draft = if idx % 3 == 0 {
                TransactionDraft::monthly(format!("Recurring {idx}"), amount, direction, start())
            } else {
                let month = start().add_months((idx % 36) as u32);
                TransactionDraft::one_off(format!("One-off {idx}"), amount, direction, month)
            };
            draft.into_transaction(Uuid::new_v4())
        })
        .collect()
}

fn bench_projection(c: &mut Criterion) {
    let transactions = sample_transactions(10_000);

    c.bench_function("project_10k_24_months", |b| {
        b.iter(|| {
            let rows = project(1000.0, start(), black_box(&transactions), 24);
            black_box(rows);
        })
    });
}

fn bench_history(c: &mut Criterion) {
    let transactions = sample_transactions(1_000);

    c.bench_function("add_then_undo_1k", |b| {
        b.iter_batched(
            || TransactionStore::new(Uuid::new_v4()),
            |mut store| {
                for txn in &transactions {
                    store.add_transaction(txn.clone().into());
                }
                while store.undo() {}
                black_box(store);
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_projection, bench_history);
criterion_main!(benches);
