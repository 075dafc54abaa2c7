//! Sales module.
//!
//! Sale records, their validation rules, and the category/summary statistics
//! derived from them. Pure domain logic (no IO, no HTTP, no storage).

pub mod sale;
pub mod stats;

pub use sale::{CreateSale, Sale, SearchQuery, UpdateSale, DEFAULT_CATEGORY};
pub use stats::{category_stats, summarize, CategoryStat, SalesSummary};
