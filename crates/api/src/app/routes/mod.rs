use axum::Router;

pub mod auth;
pub mod common;
pub mod financial;
pub mod inventory;
pub mod purchase_requests;
pub mod sales;
pub mod system;

/// Router for the business resources (optionally bearer-guarded).
pub fn resources_router() -> Router {
    Router::new()
        .nest("/api/financial", financial::router())
        .nest("/api/sales", sales::router())
        .nest("/api/purchaserequest", purchase_requests::router())
}
