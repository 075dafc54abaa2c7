use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use soil_core::{cap_amount, cap_quantity, require_text, Document, DocumentId, DomainError, DomainResult};

pub const DEFAULT_CATEGORY: &str = "Other";

/// A recorded sale of some quantity of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: DocumentId,
    pub product_name: String,
    pub quantity: i64,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

/// Command: record a sale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSale {
    pub product_name: Option<String>,
    pub quantity: i64,
    pub amount: Decimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
}

/// Command: replace the mutable fields of a sale. An absent `sale_date`
/// keeps the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSale {
    pub product_name: Option<String>,
    pub quantity: i64,
    pub amount: Decimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
}

struct Validated {
    product_name: String,
    quantity: i64,
    amount: Decimal,
    category: String,
}

fn validate(
    product_name: Option<&str>,
    quantity: i64,
    amount: Decimal,
    category: Option<String>,
) -> DomainResult<Validated> {
    let product_name = require_text(product_name, "Product name is required")?;
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("Amount must be greater than 0"));
    }
    if quantity <= 0 {
        return Err(DomainError::validation("Quantity must be greater than 0"));
    }
    let amount = cap_amount(amount, "Amount is too large")?;
    let quantity = cap_quantity(quantity, "Quantity is too large")?;
    let category = match category {
        Some(c) if !c.trim().is_empty() => c,
        _ => DEFAULT_CATEGORY.to_string(),
    };
    Ok(Validated {
        product_name,
        quantity,
        amount,
        category,
    })
}

impl Sale {
    pub fn create(id: DocumentId, cmd: CreateSale, now: DateTime<Utc>) -> DomainResult<Self> {
        let v = validate(cmd.product_name.as_deref(), cmd.quantity, cmd.amount, cmd.category)?;
        Ok(Self {
            id,
            product_name: v.product_name,
            quantity: v.quantity,
            amount: v.amount,
            category: v.category,
            description: cmd.description,
            sale_date: cmd.sale_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Validate `cmd` and overwrite every mutable field; untouched on error.
    pub fn apply_update(&mut self, cmd: UpdateSale, now: DateTime<Utc>) -> DomainResult<()> {
        let v = validate(cmd.product_name.as_deref(), cmd.quantity, cmd.amount, cmd.category)?;
        self.product_name = v.product_name;
        self.quantity = v.quantity;
        self.amount = v.amount;
        self.category = v.category;
        self.description = cmd.description;
        if let Some(date) = cmd.sale_date {
            self.sale_date = date;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Document for Sale {
    type Id = DocumentId;

    const COLLECTION: &'static str = "sales";
    const NOUN: &'static str = "Sale";

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

/// Free-text search term over product name and description.
///
/// Matching is a case-insensitive substring test; the term is treated as
/// literal text, never as a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Serialised field names the term is matched against.
    pub const FIELDS: [&'static str; 2] = ["productName", "description"];

    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        require_text(raw, "Search query is required").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    fn tea() -> CreateSale {
        CreateSale {
            product_name: Some("Milk Tea".to_string()),
            quantity: 2,
            amount: Decimal::from(90),
            description: Some("Large, less ice".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_defaults_category_and_date() {
        let sale = Sale::create(DocumentId::new(), tea(), now()).unwrap();
        assert_eq!(sale.category, "Other");
        assert_eq!(sale.sale_date, now());
        assert_eq!(sale.created_at, sale.updated_at);
    }

    #[test]
    fn validation_order_matches_field_order() {
        let err = Sale::create(
            DocumentId::new(),
            CreateSale {
                product_name: None,
                quantity: 0,
                amount: Decimal::ZERO,
                ..Default::default()
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err.message(), "Product name is required");

        let err = Sale::create(
            DocumentId::new(),
            CreateSale { amount: Decimal::ZERO, ..tea() },
            now(),
        )
        .unwrap_err();
        assert_eq!(err.message(), "Amount must be greater than 0");

        let err = Sale::create(DocumentId::new(), CreateSale { quantity: -3, ..tea() }, now())
            .unwrap_err();
        assert_eq!(err.message(), "Quantity must be greater than 0");
    }

    #[test]
    fn oversized_amount_or_quantity_is_rejected() {
        let err = Sale::create(
            DocumentId::new(),
            CreateSale { amount: Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0), ..tea() },
            now(),
        )
        .unwrap_err();
        assert_eq!(err.message(), "Amount is too large");

        let err = Sale::create(DocumentId::new(), CreateSale { quantity: i64::MAX, ..tea() }, now())
            .unwrap_err();
        assert_eq!(err.message(), "Quantity is too large");
    }

    #[test]
    fn update_revalidates_and_refreshes_updated_at() {
        let mut sale = Sale::create(DocumentId::new(), tea(), now()).unwrap();
        let later = now() + chrono::Duration::minutes(5);

        let err = sale
            .apply_update(
                UpdateSale {
                    product_name: Some("Milk Tea".to_string()),
                    quantity: 0,
                    amount: Decimal::from(10),
                    ..Default::default()
                },
                later,
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(sale.updated_at, now());

        sale.apply_update(
            UpdateSale {
                product_name: Some("Taro Tea".to_string()),
                quantity: 3,
                amount: Decimal::from(135),
                category: Some("Drinks".to_string()),
                ..Default::default()
            },
            later,
        )
        .unwrap();
        assert_eq!(sale.product_name, "Taro Tea");
        assert_eq!(sale.category, "Drinks");
        assert_eq!(sale.description, None);
        assert_eq!(sale.sale_date, now());
        assert_eq!(sale.updated_at, later);
    }

    #[test]
    fn search_query_is_trimmed_and_required() {
        assert_eq!(SearchQuery::parse(Some("  milk ")).unwrap().as_str(), "milk");
        assert!(SearchQuery::parse(Some("  ")).is_err());
        assert!(SearchQuery::parse(None).is_err());
    }

    #[test]
    fn serialised_field_names_cover_search_fields() {
        let sale = Sale::create(DocumentId::new(), tea(), now()).unwrap();
        let json = serde_json::to_value(&sale).unwrap();
        for field in SearchQuery::FIELDS {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
