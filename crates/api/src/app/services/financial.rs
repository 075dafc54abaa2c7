use chrono::Utc;

use soil_core::{parse_date_param, require_text, DateRange, DocumentId, ExpectedVersion};
use soil_financial::{
    monthly_summary, summarize, CreateTransaction, FinancialSummary, FinancialTransaction,
    MonthlySummary, TransactionType, UpdateTransaction,
};
use soil_infra::{Filter, Query};

use crate::app::errors::ApiError;
use crate::app::services::records::{Records, Resource};

impl Resource for FinancialTransaction {
    const INVALID_ID: &'static str = "Invalid transaction ID format";
    const PATH: &'static str = "/api/financial";
}

const SORT_FIELD: &str = "transactionDate";

#[derive(Clone)]
pub struct FinancialService {
    records: Records<FinancialTransaction>,
}

impl FinancialService {
    pub fn new(records: Records<FinancialTransaction>) -> Self {
        Self { records }
    }

    async fn find(&self, filter: Filter) -> Result<Vec<FinancialTransaction>, ApiError> {
        self.records
            .find(Query::filtered(filter).newest_first(SORT_FIELD))
            .await
    }

    pub async fn list(&self) -> Result<Vec<FinancialTransaction>, ApiError> {
        self.find(Filter::All).await
    }

    pub async fn get(&self, id: &str) -> Result<FinancialTransaction, ApiError> {
        self.records.get(id).await
    }

    pub async fn create(&self, cmd: CreateTransaction) -> Result<FinancialTransaction, ApiError> {
        let tx = FinancialTransaction::create(DocumentId::new(), cmd, Utc::now())?;
        let tx = self.records.insert(tx).await?;
        tracing::info!(id = %tx.id, kind = %tx.transaction_type, "transaction created");
        Ok(tx)
    }

    /// Missing ids are reported before the body is validated.
    pub async fn update(
        &self,
        id: &str,
        cmd: UpdateTransaction,
        expected: ExpectedVersion,
    ) -> Result<FinancialTransaction, ApiError> {
        let mut tx = self.records.get(id).await?;
        tx.apply_update(cmd, Utc::now())?;
        self.records.replace(tx, expected).await
    }

    pub async fn delete(&self, id: &str) -> Result<String, ApiError> {
        self.records.delete(id).await
    }

    pub async fn by_type(&self, raw: &str) -> Result<Vec<FinancialTransaction>, ApiError> {
        let kind = TransactionType::parse(Some(raw))
            .map_err(|_| ApiError::bad_request("Invalid type. Must be Income or Expense"))?;
        self.find(Filter::eq("transactionType", kind.as_str())).await
    }

    pub async fn by_category(&self, raw: &str) -> Result<Vec<FinancialTransaction>, ApiError> {
        let category = require_text(Some(raw), "Category is required")?;
        self.find(Filter::eq("category", category)).await
    }

    pub async fn by_date_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<FinancialTransaction>, ApiError> {
        let range = DateRange::inclusive_days(
            parse_date_param("startDate", start)?,
            parse_date_param("endDate", end)?,
        )?;
        self.find(Filter::between(SORT_FIELD, range)).await
    }

    pub async fn summary(&self) -> Result<FinancialSummary, ApiError> {
        let all = self.records.find(Query::all()).await?;
        Ok(summarize(&all))
    }

    pub async fn monthly_summary(&self) -> Result<Vec<MonthlySummary>, ApiError> {
        let all = self.records.find(Query::all()).await?;
        Ok(monthly_summary(&all))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use soil_infra::InMemoryDocumentStore;

    fn service() -> FinancialService {
        FinancialService::new(Records::new(Arc::new(InMemoryDocumentStore::new())))
    }

    fn expense(description: &str, amount: i64) -> CreateTransaction {
        CreateTransaction {
            description: Some(description.to_string()),
            amount: Decimal::from(amount),
            transaction_type: Some("Expense".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_applies_defaults_and_round_trips() {
        let svc = service();
        let created = svc.create(expense("Coffee beans", 50)).await.unwrap();
        assert_eq!(created.category, "Other");
        assert_eq!(created.payment_method, "Cash");
        assert_eq!(created.version, 1);

        let loaded = svc.get(&created.id.to_string()).await.unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn non_positive_amount_never_writes() {
        let svc = service();
        let err = svc.create(expense("Free lunch", 0)).await.unwrap_err();
        assert_eq!(err.public_message(), "Amount must be greater than 0");
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found_even_with_bad_body() {
        let svc = service();
        let err = svc
            .update(
                &DocumentId::new().to_string(),
                UpdateTransaction::default(),
                ExpectedVersion::Any,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Transaction not found"));
    }

    #[tokio::test]
    async fn malformed_ids_are_bad_requests() {
        let svc = service();
        let err = svc.get("not-an-id").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Invalid transaction ID format"));
        let err = svc.delete("not-an-id").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let svc = service();
        let created = svc.create(expense("Rent", 900)).await.unwrap();
        let id = created.id.to_string();

        svc.update(&id, update("Rent (June)", 950), ExpectedVersion::Exact(1))
            .await
            .unwrap();
        let err = svc
            .update(&id, update("Rent (July)", 950), ExpectedVersion::Exact(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(svc.get(&id).await.unwrap().description, "Rent (June)");
    }

    fn update(description: &str, amount: i64) -> UpdateTransaction {
        UpdateTransaction {
            description: Some(description.to_string()),
            amount: Decimal::from(amount),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn filters_by_type_category_and_date() {
        let svc = service();
        let june = Utc.with_ymd_and_hms(2024, 6, 30, 22, 0, 0).unwrap();
        svc.create(CreateTransaction {
            transaction_date: Some(june),
            category: Some("Supplies".to_string()),
            ..expense("Cups", 20)
        })
        .await
        .unwrap();
        svc.create(CreateTransaction {
            transaction_type: Some("Income".to_string()),
            ..expense("Sales", 300)
        })
        .await
        .unwrap();

        assert_eq!(svc.by_type("Income").await.unwrap().len(), 1);
        assert!(matches!(
            svc.by_type("income").await.unwrap_err(),
            ApiError::BadRequest(ref m) if m == "Invalid type. Must be Income or Expense"
        ));
        assert_eq!(svc.by_category("Supplies").await.unwrap().len(), 1);
        assert!(svc.by_category("  ").await.is_err());

        let in_june = svc
            .by_date_range(Some("2024-06-01"), Some("2024-06-30"))
            .await
            .unwrap();
        assert_eq!(in_june.len(), 1);
        assert_eq!(in_june[0].description, "Cups");

        let inverted = svc
            .by_date_range(Some("2024-06-30"), Some("2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(inverted, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn summary_nets_income_against_expenses() {
        let svc = service();
        svc.create(expense("Milk", 40)).await.unwrap();
        svc.create(CreateTransaction {
            transaction_type: Some("Income".to_string()),
            ..expense("Sales", 100)
        })
        .await
        .unwrap();

        let summary = svc.summary().await.unwrap();
        assert_eq!(summary.total_income, Decimal::from(100));
        assert_eq!(summary.total_expenses, Decimal::from(40));
        assert_eq!(summary.net_profit, Decimal::from(60));
        assert_eq!(summary.total_transactions, 2);

        let monthly = svc.monthly_summary().await.unwrap();
        assert_eq!(monthly.len(), 1);
    }
}
