use anyhow::Result;
use axum::{
    middleware::map_response,
    routing::{get, post},
    Router,
};

use crate::{
    config::CorsConfig,
    handlers::{hello, players::create_player},
    middleware::{create_middleware_stack, strip_unmatched_cors_headers},
    repository::SharedRepository,
};

/// Create the Axum router with all endpoints and middleware.
/// Unknown paths fall through to axum's default 404.
pub fn create_router(repo: SharedRepository, cors: &CorsConfig) -> Result<Router> {
    Ok(Router::new()
        .route("/api/hello", get(hello))
        .route("/api/player", post(create_player))
        // Add shared state (player storage)
        .with_state(repo)
        // Apply middleware stack
        .layer(create_middleware_stack(cors)?)
        // Outside the CORS layer so it sees the headers it produced
        .layer(map_response(strip_unmatched_cors_headers)))
}
