//! Purchasing domain module (stock purchase requests).
//!
//! Business rules for purchase requests, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod request;

pub use request::{PurchaseRequest, PurchaseRequestDraft, StockQuantities};
