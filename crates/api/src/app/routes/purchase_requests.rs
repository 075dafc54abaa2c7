use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::{get, post},
    Json, Router,
};

use soil_purchasing::PurchaseRequest;

use crate::app::dto::{JsonBody, PurchaseRequestBody};
use crate::app::errors::{self, ApiError};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/savepr", post(save_request))
        .route(
            "/:id",
            get(get_request).put(update_request).delete(delete_request),
        )
}

pub async fn list_requests(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<PurchaseRequest>>, ApiError> {
    Ok(Json(services.purchasing.list().await?))
}

pub async fn get_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseRequest>, ApiError> {
    Ok(Json(services.purchasing.get(&id).await?))
}

pub async fn create_request(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<PurchaseRequestBody>,
) -> Result<Response, ApiError> {
    let (draft, _) = body.into_draft();
    let pr = services.purchasing.create(draft).await?;
    Ok(common::created(pr))
}

pub async fn update_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PurchaseRequestBody>,
) -> Result<Json<PurchaseRequest>, ApiError> {
    let (draft, expected) = body.into_draft();
    Ok(Json(services.purchasing.update(&id, draft, expected).await?))
}

/// Legacy upsert: no id creates, an id updates. Always 200 with the stored request.
pub async fn save_request(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<PurchaseRequestBody>,
) -> Result<Json<PurchaseRequest>, ApiError> {
    let id = body.target_id().map(str::to_owned);
    let (draft, expected) = body.into_draft();
    let pr = services
        .purchasing
        .save(id.as_deref(), draft, expected)
        .await?;
    Ok(Json(pr))
}

pub async fn delete_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let message = services.purchasing.delete(&id).await?;
    Ok(errors::json_message(message))
}
