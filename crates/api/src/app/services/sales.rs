use chrono::Utc;

use soil_core::{parse_date_param, require_text, DateRange, DocumentId, ExpectedVersion};
use soil_infra::{Filter, Query};
use soil_sales::{
    category_stats, summarize, CategoryStat, CreateSale, Sale, SalesSummary, SearchQuery,
    UpdateSale,
};

use crate::app::errors::ApiError;
use crate::app::services::records::{Records, Resource};

impl Resource for Sale {
    const INVALID_ID: &'static str = "Invalid sale ID format";
    const PATH: &'static str = "/api/sales";
}

#[derive(Clone)]
pub struct SalesService {
    records: Records<Sale>,
}

impl SalesService {
    pub fn new(records: Records<Sale>) -> Self {
        Self { records }
    }

    async fn newest_created(&self, filter: Filter) -> Result<Vec<Sale>, ApiError> {
        self.records
            .find(Query::filtered(filter).newest_first("createdAt"))
            .await
    }

    pub async fn list(&self) -> Result<Vec<Sale>, ApiError> {
        self.newest_created(Filter::All).await
    }

    pub async fn get(&self, id: &str) -> Result<Sale, ApiError> {
        self.records.get(id).await
    }

    pub async fn create(&self, cmd: CreateSale) -> Result<Sale, ApiError> {
        let sale = Sale::create(DocumentId::new(), cmd, Utc::now())?;
        let sale = self.records.insert(sale).await?;
        tracing::info!(id = %sale.id, category = %sale.category, "sale recorded");
        Ok(sale)
    }

    pub async fn update(
        &self,
        id: &str,
        cmd: UpdateSale,
        expected: ExpectedVersion,
    ) -> Result<Sale, ApiError> {
        let mut sale = self.records.get(id).await?;
        sale.apply_update(cmd, Utc::now())?;
        self.records.replace(sale, expected).await
    }

    pub async fn delete(&self, id: &str) -> Result<String, ApiError> {
        self.records.delete(id).await
    }

    pub async fn by_category(&self, raw: &str) -> Result<Vec<Sale>, ApiError> {
        let category = require_text(Some(raw), "Category is required")?;
        self.newest_created(Filter::eq("category", category)).await
    }

    /// Inclusive on both days, newest sale date first.
    pub async fn by_date_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Sale>, ApiError> {
        let range = DateRange::inclusive_days(
            parse_date_param("startDate", start)?,
            parse_date_param("endDate", end)?,
        )?;
        self.records
            .find(Query::filtered(Filter::between("saleDate", range)).newest_first("saleDate"))
            .await
    }

    pub async fn search(&self, raw: Option<&str>) -> Result<Vec<Sale>, ApiError> {
        let query = SearchQuery::parse(raw)?;
        self.newest_created(Filter::contains_ignore_case(
            SearchQuery::FIELDS.to_vec(),
            query.as_str(),
        ))
        .await
    }

    pub async fn category_stats(&self) -> Result<Vec<CategoryStat>, ApiError> {
        let all = self.records.find(Query::all()).await?;
        Ok(category_stats(&all))
    }

    pub async fn summary(&self) -> Result<SalesSummary, ApiError> {
        let all = self.records.find(Query::all()).await?;
        Ok(summarize(&all))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use soil_infra::InMemoryDocumentStore;

    fn service() -> SalesService {
        SalesService::new(Records::new(Arc::new(InMemoryDocumentStore::new())))
    }

    fn sale(name: &str, category: &str, quantity: i64, cents: i64) -> CreateSale {
        CreateSale {
            product_name: Some(name.to_string()),
            quantity,
            amount: Decimal::new(cents, 2),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn invalid_quantity_or_amount_is_rejected_without_writing() {
        let svc = service();
        let err = svc.create(sale("Latte", "Drinks", 0, 450)).await.unwrap_err();
        assert_eq!(err.public_message(), "Quantity must be greater than 0");
        let err = svc.create(sale("Latte", "Drinks", 1, -1)).await.unwrap_err();
        assert_eq!(err.public_message(), "Amount must be greater than 0");
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let svc = service();
        svc.create(sale("First", "Drinks", 1, 100)).await.unwrap();
        svc.create(sale("Second", "Drinks", 1, 100)).await.unwrap();
        let names: Vec<_> = svc
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.product_name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let svc = service();
        svc.create(CreateSale {
            description: Some("with OAT milk".to_string()),
            ..sale("Latte", "Drinks", 1, 450)
        })
        .await
        .unwrap();
        svc.create(sale("Bagel", "Food", 1, 300)).await.unwrap();

        assert_eq!(svc.search(Some("oat")).await.unwrap().len(), 1);
        assert_eq!(svc.search(Some("LAT")).await.unwrap().len(), 1);
        assert!(svc.search(Some(".*")).await.unwrap().is_empty());

        let err = svc.search(Some("   ")).await.unwrap_err();
        assert_eq!(err.public_message(), "Search query is required");
    }

    #[tokio::test]
    async fn date_range_includes_the_whole_end_day_newest_sale_first() {
        let svc = service();
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 5, d, h, 0, 0).unwrap();
        for (name, date) in [("Early", at(1, 9)), ("Late", at(10, 23)), ("After", at(11, 9)), ("Mid", at(5, 12))] {
            svc.create(CreateSale {
                sale_date: Some(date),
                ..sale(name, "Drinks", 1, 100)
            })
            .await
            .unwrap();
        }

        let names: Vec<_> = svc
            .by_date_range(Some("2024-05-01"), Some("2024-05-10"))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.product_name)
            .collect();
        assert_eq!(names, vec!["Late", "Mid", "Early"]);

        let err = svc.by_date_range(Some("2024-05-10"), None).await.unwrap_err();
        assert_eq!(err.public_message(), "endDate is required");
    }

    #[tokio::test]
    async fn category_totals_add_up_to_summary() {
        let svc = service();
        svc.create(sale("Latte", "Drinks", 2, 900)).await.unwrap();
        svc.create(sale("Mocha", "Drinks", 1, 500)).await.unwrap();
        svc.create(sale("Bagel", "Food", 3, 750)).await.unwrap();

        let stats = svc.category_stats().await.unwrap();
        assert_eq!(stats[0].category, "Drinks");
        assert_eq!(stats[0].count, 2);

        let summary = svc.summary().await.unwrap();
        let total: Decimal = stats.iter().map(|s| s.total_sales).sum();
        assert_eq!(summary.total_sales, total);
        assert_eq!(summary.total_quantity, 6);
    }

    #[tokio::test]
    async fn update_keeps_sale_date_when_absent() {
        let svc = service();
        let created = svc.create(sale("Latte", "Drinks", 1, 450)).await.unwrap();
        let updated = svc
            .update(
                &created.id.to_string(),
                UpdateSale {
                    product_name: Some("Large latte".to_string()),
                    quantity: 2,
                    amount: Decimal::new(900, 2),
                    ..Default::default()
                },
                ExpectedVersion::Any,
            )
            .await
            .unwrap();
        assert_eq!(updated.sale_date, created.sale_date);
        assert_eq!(updated.category, "Other");
        assert_eq!(updated.version, 2);
    }
}
