use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::app::errors::ApiError;
use crate::app::services::IdentityService;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub identity: IdentityService,
}

/// Reject requests without a valid bearer token; otherwise attach the
/// caller's [`PrincipalContext`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers()).ok_or_else(unauthorized)?;

    let claims = state.identity.verify_token(token).map_err(|e| {
        tracing::info!(error = %e, "rejected bearer token");
        unauthorized()
    })?;

    let principal = PrincipalContext::new(claims);
    tracing::Span::current().record("user_id", tracing::field::display(principal.user_id()));
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Unauthorized".to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// One span and one log line per request.
pub async fn trace_requests(req: Request, next: Next) -> Response {
    let span = soil_observability::http_request_span(req.method().as_str(), req.uri().path());
    let started = Instant::now();

    let response = next.run(req).instrument(span.clone()).await;

    let latency_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    span.record("status", status);
    span.record("latency_ms", latency_ms);
    span.in_scope(|| tracing::info!(status, latency_ms, "request completed"));

    response
}
