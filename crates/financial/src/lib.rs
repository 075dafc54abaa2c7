//! Financial transactions module.
//!
//! Income/expense records plus the read-only analytics computed over them.
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod summary;
pub mod transaction;

pub use summary::{monthly_summary, summarize, FinancialSummary, MonthlySummary, MONTHLY_WINDOW};
pub use transaction::{
    CreateTransaction, FinancialTransaction, TransactionType, UpdateTransaction,
    DEFAULT_CATEGORY, DEFAULT_PAYMENT_METHOD,
};
