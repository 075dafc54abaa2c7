//! Day-granular date ranges used by the `date-range` queries.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::{DomainError, DomainResult};

/// Closed interval `[from, to]` over UTC timestamps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Build the range for a `startDate`/`endDate` pair.
    ///
    /// The upper bound is pushed out by one day so a record stamped at any
    /// time on `end`'s calendar day is still inside the range.
    pub fn inclusive_days(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(
                "End date must be greater than or equal to start date",
            ));
        }
        Ok(Self {
            from: start,
            to: end + Duration::days(1),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// Parse a query-string date: `YYYY-MM-DD` (midnight UTC) or full RFC 3339.
pub fn parse_date_param(name: &str, raw: Option<&str>) -> DomainResult<DateTime<Utc>> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::validation(format!("{name} is required")))?;

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DomainError::validation(format!("{name} is not a valid date")))
}
