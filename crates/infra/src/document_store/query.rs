//! Backend-neutral query description.
//!
//! Field names are the document's serialised (camelCase) keys. The
//! in-memory store evaluates filters against `serde_json::Value`; the
//! Postgres store compiles them to `JSONB` predicates.

use chrono::{DateTime, Utc};
use serde_json::Value;

use soil_core::DateRange;

/// Predicate over a document's JSON representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// String field equals `value` exactly.
    Eq { field: &'static str, value: String },
    /// Timestamp field within `[from, to]`.
    Between {
        field: &'static str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// Any of `fields` contains `needle`, ignoring case. The needle is a
    /// literal, not a pattern.
    ContainsIgnoreCase {
        fields: Vec<&'static str>,
        needle: String,
    },
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Filter::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn between(field: &'static str, range: DateRange) -> Self {
        Filter::Between {
            field,
            from: range.from,
            to: range.to,
        }
    }

    pub fn contains_ignore_case(fields: Vec<&'static str>, needle: impl Into<String>) -> Self {
        Filter::ContainsIgnoreCase {
            fields,
            needle: needle.into(),
        }
    }

    /// Evaluate against a serialised document.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => doc.get(*field).and_then(Value::as_str) == Some(value.as_str()),
            Filter::Between { field, from, to } => timestamp(doc, field)
                .map(|at| *from <= at && at <= *to)
                .unwrap_or(false),
            Filter::ContainsIgnoreCase { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|field| {
                    doc.get(*field)
                        .and_then(Value::as_str)
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

/// Ordering: newest first on a timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
}

impl Sort {
    pub fn newest_first(field: &'static str) -> Self {
        Self { field }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

impl Query {
    pub fn all() -> Self {
        Self {
            filter: Filter::All,
            sort: None,
            limit: None,
        }
    }

    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::all()
        }
    }

    pub fn newest_first(mut self, field: &'static str) -> Self {
        self.sort = Some(Sort::newest_first(field));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read an RFC 3339 timestamp field from a serialised document.
pub(crate) fn timestamp(doc: &Value, field: &str) -> Option<DateTime<Utc>> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn eq_is_exact() {
        let doc = json!({ "category": "Food" });
        assert!(Filter::eq("category", "Food").matches(&doc));
        assert!(!Filter::eq("category", "food").matches(&doc));
        assert!(!Filter::eq("missing", "Food").matches(&doc));
    }

    #[test]
    fn between_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let range = DateRange::inclusive_days(start, end).unwrap();
        let filter = Filter::between("saleDate", range);

        assert!(filter.matches(&json!({ "saleDate": "2024-01-01T00:00:00Z" })));
        assert!(filter.matches(&json!({ "saleDate": "2024-01-31T18:30:00Z" })));
        assert!(!filter.matches(&json!({ "saleDate": "2024-02-01T00:00:01Z" })));
        assert!(!filter.matches(&json!({ "saleDate": "not a date" })));
    }

    #[test]
    fn contains_checks_every_field_case_insensitively() {
        let filter = Filter::contains_ignore_case(vec!["productName", "description"], "LATTE");
        assert!(filter.matches(&json!({ "productName": "Iced latte" })));
        assert!(filter.matches(&json!({ "productName": "Tea", "description": "latte art" })));
        assert!(!filter.matches(&json!({ "productName": "Tea", "description": null })));
    }

    #[test]
    fn contains_treats_needle_literally() {
        let filter = Filter::contains_ignore_case(vec!["productName"], ".*");
        assert!(!filter.matches(&json!({ "productName": "anything" })));
        assert!(filter.matches(&json!({ "productName": "regex .* soup" })));
    }

    #[test]
    fn and_requires_all() {
        let filter = Filter::And(vec![Filter::eq("a", "1"), Filter::eq("b", "2")]);
        assert!(filter.matches(&json!({ "a": "1", "b": "2" })));
        assert!(!filter.matches(&json!({ "a": "1", "b": "3" })));
    }
}
