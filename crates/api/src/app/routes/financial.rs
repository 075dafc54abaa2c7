use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::get,
    Json, Router,
};

use soil_financial::{FinancialSummary, FinancialTransaction, MonthlySummary};

use crate::app::dto::{DateRangeParams, JsonBody, QueryParams, TransactionRequest};
use crate::app::errors::{self, ApiError};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/summary", get(summary))
        .route("/monthly-summary", get(monthly_summary))
        .route("/date-range", get(by_date_range))
        .route("/type/:type", get(by_type))
        .route("/category/:category", get(by_category))
        .route(
            "/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<FinancialTransaction>>, ApiError> {
    Ok(Json(services.financial.list().await?))
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<FinancialTransaction>, ApiError> {
    Ok(Json(services.financial.get(&id).await?))
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<TransactionRequest>,
) -> Result<Response, ApiError> {
    let tx = services.financial.create(body.into_create()).await?;
    Ok(common::created(tx))
}

pub async fn update_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<TransactionRequest>,
) -> Result<Json<FinancialTransaction>, ApiError> {
    let (cmd, expected) = body.into_update();
    Ok(Json(services.financial.update(&id, cmd, expected).await?))
}

pub async fn delete_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let message = services.financial.delete(&id).await?;
    Ok(errors::json_message(message))
}

pub async fn by_type(
    Extension(services): Extension<Arc<AppServices>>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<FinancialTransaction>>, ApiError> {
    Ok(Json(services.financial.by_type(&kind).await?))
}

pub async fn by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<FinancialTransaction>>, ApiError> {
    Ok(Json(services.financial.by_category(&category).await?))
}

pub async fn by_date_range(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<DateRangeParams>,
) -> Result<Json<Vec<FinancialTransaction>>, ApiError> {
    let found = services
        .financial
        .by_date_range(params.start_date.as_deref(), params.end_date.as_deref())
        .await?;
    Ok(Json(found))
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<FinancialSummary>, ApiError> {
    Ok(Json(services.financial.summary().await?))
}

pub async fn monthly_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<MonthlySummary>>, ApiError> {
    Ok(Json(services.financial.monthly_summary().await?))
}
