//! Read-side analytics over transactions (recomputed on every request).

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::transaction::{FinancialTransaction, TransactionType};

/// Number of calendar months reported by [`monthly_summary`].
pub const MONTHLY_WINDOW: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub total_transactions: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub average_transaction: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// `YYYY-MM`.
    pub month: String,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    income: Decimal,
    expenses: Decimal,
    income_count: usize,
    expense_count: usize,
}

impl Totals {
    fn add(&mut self, tx: &FinancialTransaction) {
        match tx.transaction_type {
            TransactionType::Income => {
                self.income = self.income.saturating_add(tx.amount);
                self.income_count += 1;
            }
            TransactionType::Expense => {
                self.expenses = self.expenses.saturating_add(tx.amount);
                self.expense_count += 1;
            }
        }
    }
}

/// Aggregate income/expense totals over `transactions`.
pub fn summarize(transactions: &[FinancialTransaction]) -> FinancialSummary {
    let mut totals = Totals::default();
    for tx in transactions {
        totals.add(tx);
    }

    let total_transactions = transactions.len();
    let average_transaction = if total_transactions == 0 {
        Decimal::ZERO
    } else {
        totals.income.saturating_add(totals.expenses) / Decimal::from(total_transactions as u64)
    };

    FinancialSummary {
        total_income: totals.income,
        total_expenses: totals.expenses,
        net_profit: totals.income.saturating_sub(totals.expenses),
        total_transactions,
        income_count: totals.income_count,
        expense_count: totals.expense_count,
        average_transaction,
    }
}

/// Per-month totals for the most recent [`MONTHLY_WINDOW`] months that have
/// data, oldest first.
pub fn monthly_summary(transactions: &[FinancialTransaction]) -> Vec<MonthlySummary> {
    let mut by_month: BTreeMap<(i32, u32), Totals> = BTreeMap::new();
    for tx in transactions {
        let key = (tx.transaction_date.year(), tx.transaction_date.month());
        by_month.entry(key).or_default().add(tx);
    }

    let mut recent: Vec<MonthlySummary> = by_month
        .into_iter()
        .rev()
        .take(MONTHLY_WINDOW)
        .map(|((year, month), t)| MonthlySummary {
            month: format!("{year}-{month:02}"),
            total_income: t.income,
            total_expenses: t.expenses,
            net_profit: t.income.saturating_sub(t.expenses),
        })
        .collect();
    recent.reverse();
    recent
}
