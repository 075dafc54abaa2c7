use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::get,
    Json, Router,
};

use soil_sales::{CategoryStat, Sale, SalesSummary};

use crate::app::dto::{DateRangeParams, JsonBody, QueryParams, SaleRequest, SearchParams};
use crate::app::errors::{self, ApiError};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/summary", get(summary))
        .route("/stats/category", get(category_stats))
        .route("/date-range", get(by_date_range))
        .route("/search", get(search))
        .route("/category/:category", get(by_category))
        .route("/:id", get(get_sale).put(update_sale).delete(delete_sale))
}

pub async fn list_sales(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(services.sales.list().await?))
}

pub async fn get_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    Ok(Json(services.sales.get(&id).await?))
}

pub async fn create_sale(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<SaleRequest>,
) -> Result<Response, ApiError> {
    let sale = services.sales.create(body.into_create()).await?;
    Ok(common::created(sale))
}

pub async fn update_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SaleRequest>,
) -> Result<Json<Sale>, ApiError> {
    let (cmd, expected) = body.into_update();
    Ok(Json(services.sales.update(&id, cmd, expected).await?))
}

pub async fn delete_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let message = services.sales.delete(&id).await?;
    Ok(errors::json_message(message))
}

pub async fn by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(services.sales.by_category(&category).await?))
}

pub async fn by_date_range(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<DateRangeParams>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let found = services
        .sales
        .by_date_range(params.start_date.as_deref(), params.end_date.as_deref())
        .await?;
    Ok(Json(found))
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(services.sales.search(params.query.as_deref()).await?))
}

pub async fn category_stats(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<CategoryStat>>, ApiError> {
    Ok(Json(services.sales.category_stats().await?))
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<SalesSummary>, ApiError> {
    Ok(Json(services.sales.summary().await?))
}
