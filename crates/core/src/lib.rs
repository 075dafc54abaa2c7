//! `soil-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every resource
//! crate (no IO, no HTTP, no storage).

pub mod document;
pub mod error;
pub mod id;
pub mod limits;
pub mod range;
pub mod version;

pub use document::{Document, DocumentKey};
pub use error::{require_text, DomainError, DomainResult};
pub use id::{DocumentId, UserId};
pub use limits::{cap_amount, cap_quantity, MAX_AMOUNT, MAX_QUANTITY};
pub use range::{parse_date_param, DateRange};
pub use version::ExpectedVersion;
