use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use soil_core::Document;

use crate::app::services::{Records, Resource};

/// 201 with a `Location` header pointing at the new resource.
pub fn created<D: Resource>(doc: D) -> Response {
    let location = Records::<D>::location(doc.id());
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(doc)).into_response()
}
