//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services/`: store wiring and the per-resource services
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: `ApiError` and the `{"message"}` error body

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use soil_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config)
        .await
        .context("failed to initialise document stores")?;
    Ok(router(Arc::new(services), config.require_auth))
}

/// Assemble routes around already-built services.
pub fn router(services: Arc<AppServices>, require_auth: bool) -> Router {
    let auth_state = middleware::AuthState {
        identity: services.identity.clone(),
    };

    let mut resources = routes::resources_router();
    if require_auth {
        resources = resources.layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::auth_middleware,
        ));
    }

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/auth", routes::auth::router(auth_state))
        .nest("/api/inventory", routes::inventory::router())
        .merge(resources)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(services)),
        )
}

pub use services::AppServices;
