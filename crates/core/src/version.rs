//! Optimistic concurrency expectations for document replaces.

use crate::error::{DomainError, DomainResult};

/// Version a caller expects a document to be at when replacing it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Last writer wins.
    Any,
    /// Replace only if the stored document is at exactly this version.
    Exact(u64),
}

impl ExpectedVersion {
    /// `Some(v)` from a request body means compare-and-swap, `None` means last-writer-wins.
    pub fn from_optional(version: Option<u64>) -> Self {
        version.map_or(ExpectedVersion::Any, ExpectedVersion::Exact)
    }

    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "version mismatch (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_everything() {
        assert!(ExpectedVersion::Any.matches(0));
        assert!(ExpectedVersion::from_optional(None).matches(42));
    }

    #[test]
    fn exact_mismatch_is_conflict() {
        let err = ExpectedVersion::Exact(2).check(3).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(ExpectedVersion::from_optional(Some(3)).check(3).is_ok());
    }
}
