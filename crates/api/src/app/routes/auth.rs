use std::sync::Arc;

use axum::{
    extract::Extension,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use crate::app::dto::{AuthResponse, JsonBody, SignInRequest, SignUpRequest};
use crate::app::errors::{self, ApiError};
use crate::app::routes::system;
use crate::app::services::AppServices;
use crate::middleware::{self, AuthState};

pub fn router(auth: AuthState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route(
            "/me",
            get(system::whoami).layer(axum::middleware::from_fn_with_state(
                auth,
                middleware::auth_middleware,
            )),
        )
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<SignUpRequest>,
) -> Result<Response, ApiError> {
    let message = services.identity.signup(body.into()).await?;
    Ok(errors::json_message(message))
}

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<SignInRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(services.identity.signin(body.into()).await?))
}
