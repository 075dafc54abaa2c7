use chrono::Utc;

use soil_core::{DocumentId, ExpectedVersion};
use soil_infra::Query;
use soil_purchasing::{PurchaseRequest, PurchaseRequestDraft};

use crate::app::errors::ApiError;
use crate::app::services::records::{Records, Resource};

impl Resource for PurchaseRequest {
    const INVALID_ID: &'static str = "Invalid PR ID format";
    const PATH: &'static str = "/api/purchaserequest";
}

#[derive(Clone)]
pub struct PurchaseRequestService {
    records: Records<PurchaseRequest>,
}

impl PurchaseRequestService {
    pub fn new(records: Records<PurchaseRequest>) -> Self {
        Self { records }
    }

    pub async fn list(&self) -> Result<Vec<PurchaseRequest>, ApiError> {
        self.records
            .find(Query::all().newest_first("requestDate"))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<PurchaseRequest, ApiError> {
        self.records.get(id).await
    }

    pub async fn create(&self, draft: PurchaseRequestDraft) -> Result<PurchaseRequest, ApiError> {
        let pr = PurchaseRequest::create(DocumentId::new(), draft, Utc::now())?;
        let units = pr.quantities.total_units();
        let pr = self.records.insert(pr).await?;
        tracing::info!(id = %pr.id, units, "purchase request created");
        Ok(pr)
    }

    /// Full replace; the id is the only field that survives.
    pub async fn update(
        &self,
        id: &str,
        draft: PurchaseRequestDraft,
        expected: ExpectedVersion,
    ) -> Result<PurchaseRequest, ApiError> {
        let mut pr = self.records.get(id).await?;
        pr.apply_update(draft, Utc::now())?;
        self.records.replace(pr, expected).await
    }

    /// Create when `id` is absent, otherwise update that request.
    pub async fn save(
        &self,
        id: Option<&str>,
        draft: PurchaseRequestDraft,
        expected: ExpectedVersion,
    ) -> Result<PurchaseRequest, ApiError> {
        match id {
            None => self.create(draft).await,
            Some(id) => self.update(id, draft, expected).await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<String, ApiError> {
        self.records.delete(id).await
    }
}
