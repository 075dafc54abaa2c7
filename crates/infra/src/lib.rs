//! Infrastructure layer: document storage and configuration.

pub mod config;
pub mod document_store;

pub use config::{AppConfig, ConfigError, DatabaseConfig, JwtConfig, StorageConfig};
pub use document_store::{
    DocumentStore, Filter, InMemoryDocumentStore, PostgresDocumentStore, Query, Sort, StoreError,
};
