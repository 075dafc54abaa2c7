//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic, business-level failures only (validation, missing
/// records, conflicts). Storage faults are modelled by the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation. The message is safe to show to callers.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with stored state (duplicate key, stale version).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credentials were missing or rejected.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Caller-facing message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(m)
            | DomainError::InvalidId(m)
            | DomainError::NotFound(m)
            | DomainError::Conflict(m) => m,
            DomainError::Unauthorized => "unauthorized",
        }
    }
}

/// Reject blank (empty or whitespace-only) input with `message`.
pub fn require_text(value: Option<&str>, message: &str) -> DomainResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::validation(message)),
    }
}
