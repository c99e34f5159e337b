//! Aggregates and comparisons over projection rows.

use flowplan_domain::{Direction, MonthData, Transaction, YearMonth};
use uuid::Uuid;

/// Lowest point reached by the running balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancePoint {
    pub month: YearMonth,
    pub balance: f64,
}

/// Totals for an entire projected horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSummary {
    pub months: usize,
    pub starting_balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
    pub net: f64,
    pub ending_balance: f64,
    pub lowest: Option<BalancePoint>,
    pub first_negative_month: Option<YearMonth>,
}

impl ProjectionSummary {
    pub fn from_rows(starting_balance: f64, rows: &[MonthData]) -> Self {
        let total_income: f64 = rows.iter().map(|row| row.income).sum();
        let total_expense: f64 = rows.iter().map(|row| row.expense).sum();
        let lowest = rows
            .iter()
            .min_by(|a, b| a.balance.total_cmp(&b.balance))
            .map(|row| BalancePoint {
                month: row.month,
                balance: row.balance,
            });
        Self {
            months: rows.len(),
            starting_balance,
            total_income,
            total_expense,
            net: total_income - total_expense,
            ending_balance: rows.last().map_or(starting_balance, |row| row.balance),
            lowest,
            first_negative_month: rows.iter().find(|row| row.balance < 0.0).map(|row| row.month),
        }
    }
}

/// Row-wise difference `candidate - baseline` for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthDelta {
    pub month: YearMonth,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Income and expense attributed to one category in a given month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    /// `None` groups uncategorised transactions.
    pub category_id: Option<Uuid>,
    pub income: f64,
    pub expense: f64,
}

pub struct SummaryService;

impl SummaryService {
    pub fn summarize(starting_balance: f64, rows: &[MonthData]) -> ProjectionSummary {
        ProjectionSummary::from_rows(starting_balance, rows)
    }

    /// Compares two projections over the months both contain.
    pub fn compare(baseline: &[MonthData], candidate: &[MonthData]) -> Vec<MonthDelta> {
        baseline
            .iter()
            .filter_map(|base| {
                candidate
                    .iter()
                    .find(|row| row.month == base.month)
                    .map(|row| MonthDelta {
                        month: base.month,
                        income: row.income - base.income,
                        expense: row.expense - base.expense,
                        balance: row.balance - base.balance,
                    })
            })
            .collect()
    }

    /// Breaks `month` down by category, in order of first appearance.
    pub fn category_totals(transactions: &[Transaction], month: YearMonth) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for txn in transactions.iter().filter(|txn| txn.applies_to(month)) {
            let index = match totals.iter().position(|t| t.category_id == txn.category_id) {
                Some(index) => index,
                None => {
                    totals.push(CategoryTotal {
                        category_id: txn.category_id,
                        income: 0.0,
                        expense: 0.0,
                    });
                    totals.len() - 1
                }
            };
            match txn.direction {
                Direction::Income => totals[index].income += txn.amount,
                Direction::Expense => totals[index].expense += txn.amount,
            }
        }
        totals
    }
}
