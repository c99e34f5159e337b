//! Month-by-month balance projection.

use std::collections::HashMap;

use flowplan_domain::{Amounted, Direction, MonthData, Scenario, Transaction, YearMonth};
use uuid::Uuid;

use crate::transaction_store::TransactionStore;

/// Projects `horizon_months` months starting at `starting_month`.
///
/// Monthly transactions contribute to every month; one-offs only to the month
/// they name. No rounding is applied. Rows stop at `9999-12`, so a window
/// running past it yields fewer than `horizon_months` rows.
pub fn project(
    starting_balance: f64,
    starting_month: YearMonth,
    transactions: &[Transaction],
    horizon_months: usize,
) -> Vec<MonthData> {
    let mut balance = starting_balance;
    YearMonth::sequence(starting_month, horizon_months)
        .map(|month| {
            let (income, expense) = month_totals(transactions, month);
            balance = balance + income - expense;
            MonthData {
                month,
                income,
                expense,
                net: income - expense,
                balance,
            }
        })
        .collect()
}

fn month_totals(transactions: &[Transaction], month: YearMonth) -> (f64, f64) {
    transactions
        .iter()
        .filter(|txn| txn.applies_to(month))
        .fold((0.0, 0.0), |(income, expense), txn| match txn.direction {
            Direction::Income => (income + txn.amount(), expense),
            Direction::Expense => (income, expense + txn.amount()),
        })
}

pub struct ProjectionService;

impl ProjectionService {
    /// Projects `transactions` with the scenario's starting parameters.
    pub fn for_scenario(scenario: &Scenario, transactions: &[Transaction]) -> Vec<MonthData> {
        project(
            scenario.starting_balance,
            scenario.starting_month,
            transactions,
            scenario.horizon.months(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ProjectionKey {
    store_instance: u64,
    revision: u64,
    starting_balance_bits: u64,
    starting_month: YearMonth,
    horizon_months: usize,
}

impl ProjectionKey {
    fn new(scenario: &Scenario, store: &TransactionStore) -> Self {
        Self {
            store_instance: store.instance(),
            revision: store.revision(),
            starting_balance_bits: scenario.starting_balance.to_bits(),
            starting_month: scenario.starting_month,
            horizon_months: scenario.horizon.months(),
        }
    }
}

/// Keeps the latest projection per scenario and recomputes only when the
/// store (or its revision) or the projection parameters change.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    entries: HashMap<Uuid, (ProjectionKey, Vec<MonthData>)>,
    hits: u64,
    misses: u64,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&mut self, scenario: &Scenario, store: &TransactionStore) -> &[MonthData] {
        let key = ProjectionKey::new(scenario, store);
        let fresh = matches!(self.entries.get(&scenario.id), Some((cached, _)) if *cached == key);
        if fresh {
            self.hits += 1;
        } else {
            self.misses += 1;
            let rows = ProjectionService::for_scenario(scenario, store.transactions());
            self.entries.insert(scenario.id, (key, rows));
        }
        self.entries
            .get(&scenario.id)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn invalidate(&mut self, scenario_id: Uuid) {
        self.entries.remove(&scenario_id);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
