// Player handlers
// HTTP handlers for player creation

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    error::ApiResult,
    models::player::CreatePlayerRequest,
    repository::SharedRepository,
};

/// Create a new player
/// POST /api/player
///
/// The body is decoded from raw bytes so the request's `Content-Type` does not matter,
/// only its JSON shape. Nothing is written when decoding fails.
pub async fn create_player(
    State(repo): State<SharedRepository>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request: CreatePlayerRequest = serde_json::from_slice(&body)?;
    let new_player = request.into_new_player();

    info!("Creating new player: {}", new_player.name);

    let player = repo.insert_player(new_player).await?;

    info!("Successfully created player with id: {}", player.id);
    Ok((StatusCode::OK, Json(player)))
}
