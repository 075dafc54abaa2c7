use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use soil_core::{cap_amount, require_text, Document, DocumentId, DomainError, DomainResult};

pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }

    /// Parse the wire literal. Matching is exact: `"income"` is rejected.
    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        match raw {
            Some("Income") => Ok(TransactionType::Income),
            Some("Expense") => Ok(TransactionType::Expense),
            _ => Err(DomainError::validation(
                "Transaction type must be Income or Expense",
            )),
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single income or expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTransaction {
    pub id: DocumentId,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: String,
    pub transaction_type: TransactionType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

/// Command: record a new transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTransaction {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Decimal,
    pub transaction_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub transaction_type: Option<String>,
    pub notes: Option<String>,
}

/// Command: replace the mutable fields of an existing transaction.
///
/// An absent `transaction_type` or `transaction_date` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTransaction {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Decimal,
    pub transaction_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub transaction_type: Option<String>,
    pub notes: Option<String>,
}

fn require_description(raw: Option<&str>) -> DomainResult<String> {
    require_text(raw, "Description is required")
}

fn require_positive_amount(amount: Decimal) -> DomainResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("Amount must be greater than 0"));
    }
    cap_amount(amount, "Amount is too large")
}

fn or_default(raw: Option<String>, default: &str) -> String {
    match raw {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

impl FinancialTransaction {
    /// Validate `cmd` and build a new record stamped at `now`.
    pub fn create(id: DocumentId, cmd: CreateTransaction, now: DateTime<Utc>) -> DomainResult<Self> {
        let description = require_description(cmd.description.as_deref())?;
        let amount = require_positive_amount(cmd.amount)?;
        let transaction_type = TransactionType::parse(cmd.transaction_type.as_deref())?;

        Ok(Self {
            id,
            description,
            category: or_default(cmd.category, DEFAULT_CATEGORY),
            amount,
            transaction_date: cmd.transaction_date.unwrap_or(now),
            payment_method: or_default(cmd.payment_method, DEFAULT_PAYMENT_METHOD),
            transaction_type,
            notes: cmd.notes,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Validate `cmd` and overwrite every mutable field.
    ///
    /// Nothing is modified when validation fails.
    pub fn apply_update(&mut self, cmd: UpdateTransaction, now: DateTime<Utc>) -> DomainResult<()> {
        let description = require_description(cmd.description.as_deref())?;
        let amount = require_positive_amount(cmd.amount)?;
        let transaction_type = match cmd.transaction_type.as_deref() {
            None => self.transaction_type,
            raw => TransactionType::parse(raw)?,
        };

        self.description = description;
        self.category = or_default(cmd.category, DEFAULT_CATEGORY);
        self.amount = amount;
        if let Some(date) = cmd.transaction_date {
            self.transaction_date = date;
        }
        self.payment_method = or_default(cmd.payment_method, DEFAULT_PAYMENT_METHOD);
        self.transaction_type = transaction_type;
        self.notes = cmd.notes;
        self.updated_at = now;
        Ok(())
    }
}

impl Document for FinancialTransaction {
    type Id = DocumentId;

    const COLLECTION: &'static str = "financial_transactions";
    const NOUN: &'static str = "Transaction";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn coffee() -> CreateTransaction {
        CreateTransaction {
            description: Some("Coffee beans".to_string()),
            amount: dec("50"),
            transaction_type: Some("Expense".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_applies_defaults() {
        let tx = FinancialTransaction::create(DocumentId::new(), coffee(), now()).unwrap();
        assert_eq!(tx.category, "Other");
        assert_eq!(tx.payment_method, "Cash");
        assert_eq!(tx.transaction_date, now());
        assert_eq!(tx.created_at, now());
        assert_eq!(tx.updated_at, now());
        assert_eq!(tx.transaction_type, TransactionType::Expense);
    }

    #[test]
    fn create_rejects_blank_description() {
        let cmd = CreateTransaction {
            description: Some("  ".to_string()),
            ..coffee()
        };
        let err = FinancialTransaction::create(DocumentId::new(), cmd, now()).unwrap_err();
        assert_eq!(err, DomainError::validation("Description is required"));
    }

    #[test]
    fn create_rejects_non_positive_amount() {
        for amount in [dec("0"), dec("-1.5")] {
            let cmd = CreateTransaction { amount, ..coffee() };
            let err = FinancialTransaction::create(DocumentId::new(), cmd, now()).unwrap_err();
            assert_eq!(err, DomainError::validation("Amount must be greater than 0"));
        }
    }

    #[test]
    fn amounts_above_the_cap_are_rejected() {
        let cmd = CreateTransaction { amount: dec("5e28"), ..coffee() };
        let err = FinancialTransaction::create(DocumentId::new(), cmd, now()).unwrap_err();
        assert_eq!(err, DomainError::validation("Amount is too large"));

        let cmd = CreateTransaction { amount: soil_core::MAX_AMOUNT, ..coffee() };
        assert!(FinancialTransaction::create(DocumentId::new(), cmd, now()).is_ok());
    }

    #[test]
    fn create_rejects_unknown_type() {
        for raw in [None, Some("Transfer"), Some("income")] {
            let cmd = CreateTransaction {
                transaction_type: raw.map(str::to_string),
                ..coffee()
            };
            let err = FinancialTransaction::create(DocumentId::new(), cmd, now()).unwrap_err();
            assert_eq!(
                err,
                DomainError::validation("Transaction type must be Income or Expense")
            );
        }
    }

    #[test]
    fn update_keeps_type_and_date_when_absent() {
        let mut tx = FinancialTransaction::create(DocumentId::new(), coffee(), now()).unwrap();
        let later = now() + chrono::Duration::hours(2);

        tx.apply_update(
            UpdateTransaction {
                description: Some("Green coffee".to_string()),
                amount: dec("75.25"),
                category: Some("Supplies".to_string()),
                ..Default::default()
            },
            later,
        )
        .unwrap();

        assert_eq!(tx.description, "Green coffee");
        assert_eq!(tx.amount, dec("75.25"));
        assert_eq!(tx.category, "Supplies");
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.transaction_date, now());
        assert_eq!(tx.created_at, now());
        assert_eq!(tx.updated_at, later);
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let mut tx = FinancialTransaction::create(DocumentId::new(), coffee(), now()).unwrap();
        let before = tx.clone();

        let err = tx
            .apply_update(
                UpdateTransaction {
                    description: Some("Refund".to_string()),
                    amount: dec("10"),
                    transaction_type: Some("Refund".to_string()),
                    ..Default::default()
                },
                now(),
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(tx, before);
    }

    #[test]
    fn serialises_with_camel_case_fields() {
        let tx = FinancialTransaction::create(DocumentId::new(), coffee(), now()).unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["transactionType"], "Expense");
        assert_eq!(json["paymentMethod"], "Cash");
        assert_eq!(json["amount"].as_f64(), Some(50.0));
        assert!(json["transactionDate"].is_string());
    }
}
