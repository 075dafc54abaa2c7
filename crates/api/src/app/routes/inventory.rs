//! Account endpoints of the inventory client. Same handlers as `/api/auth`.

use axum::{routing::post, Router};

use crate::app::routes::auth;

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
}
