//! Collection-oriented document storage.
//!
//! Every resource in the system is a self-contained JSON document living in a
//! single collection. This module defines the storage boundary and the two
//! backends behind it: an in-memory map for development and tests, and a
//! Postgres table holding `JSONB` documents for persistent deployments.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::{Filter, Query, Sort};
pub use r#trait::{DocumentStore, StoreError};
