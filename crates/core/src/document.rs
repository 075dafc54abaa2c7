//! Stored document contract.
//!
//! A document is a self-contained record living in exactly one collection.
//! Stores persist it as JSON, so every document is serde-serialisable; the
//! identifier and version are lifted out so a store can index and
//! compare-and-swap without knowing the concrete type.

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Identifier types usable as a document key.
pub trait DocumentKey:
    Copy
    + Eq
    + core::hash::Hash
    + core::fmt::Debug
    + core::fmt::Display
    + From<Uuid>
    + Into<Uuid>
    + Send
    + Sync
    + 'static
{
}

/// A record owned by a single collection.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: DocumentKey;

    /// Collection the document lives in.
    const COLLECTION: &'static str;

    /// Human-readable noun used in error messages ("Transaction", "Sale").
    const NOUN: &'static str;

    fn id(&self) -> Self::Id;

    /// Revision counter; `1` after insert, incremented on every replace.
    fn version(&self) -> u64;

    fn set_version(&mut self, version: u64);
}
