// Handlers module
// HTTP handlers for the REST API

pub mod players;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const HELLO_MESSAGE: &str = "Hallo vanuit Go backend!";

/// Static greeting used by the front-end to check that the API is reachable.
/// GET /api/hello
pub async fn hello() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "message": HELLO_MESSAGE })))
}
