use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use soil_core::{cap_amount, cap_quantity, Document, DocumentId, DomainError, DomainResult};

/// Requested quantity per stock item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockQuantities {
    pub black_pearl: i64,
    pub powder_flavor: i64,
    pub cup_small: i64,
    pub cup_medium: i64,
    pub cup_large: i64,
    pub straw: i64,
    pub ice: i64,
    pub water_gallon: i64,
}

impl StockQuantities {
    fn named(&self) -> [(&'static str, i64); 8] {
        [
            ("blackPearl", self.black_pearl),
            ("powderFlavor", self.powder_flavor),
            ("cupSmall", self.cup_small),
            ("cupMedium", self.cup_medium),
            ("cupLarge", self.cup_large),
            ("straw", self.straw),
            ("ice", self.ice),
            ("waterGallon", self.water_gallon),
        ]
    }

    pub fn total_units(&self) -> i64 {
        self.named()
            .iter()
            .fold(0i64, |acc, (_, q)| acc.saturating_add(*q))
    }

    fn validate(&self) -> DomainResult<()> {
        for (field, quantity) in self.named() {
            if quantity < 0 {
                return Err(DomainError::validation(format!("{field} cannot be negative")));
            }
            cap_quantity(quantity, &format!("{field} is too large"))?;
        }
        Ok(())
    }
}

/// A request to restock shop supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub id: DocumentId,
    #[serde(flatten)]
    pub quantities: StockQuantities,
    pub total_amount: Decimal,
    pub request_date: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

/// Field values shared by the create and update commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseRequestDraft {
    pub quantities: StockQuantities,
    pub total_amount: Decimal,
    /// Defaults to the time of the write when absent.
    pub request_date: Option<DateTime<Utc>>,
}

impl PurchaseRequestDraft {
    fn validate(&self) -> DomainResult<()> {
        self.quantities.validate()?;
        if self.total_amount < Decimal::ZERO {
            return Err(DomainError::validation("totalAmount cannot be negative"));
        }
        cap_amount(self.total_amount, "totalAmount is too large")?;
        Ok(())
    }
}

impl PurchaseRequest {
    pub fn create(id: DocumentId, draft: PurchaseRequestDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            quantities: draft.quantities,
            total_amount: draft.total_amount,
            request_date: draft.request_date.unwrap_or(now),
            version: 0,
        })
    }

    /// Full replace of every field except the identifier.
    pub fn apply_update(&mut self, draft: PurchaseRequestDraft, now: DateTime<Utc>) -> DomainResult<()> {
        draft.validate()?;
        self.quantities = draft.quantities;
        self.total_amount = draft.total_amount;
        self.request_date = draft.request_date.unwrap_or(now);
        Ok(())
    }
}

impl Document for PurchaseRequest {
    type Id = DocumentId;

    const COLLECTION: &'static str = "purchase_requests";
    const NOUN: &'static str = "PR";

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
