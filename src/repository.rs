use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    db::Database,
    error::ApiError,
    models::player::{NewPlayer, Player},
};

/// Storage operations the HTTP handlers depend on.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Persists a new player, returning it with identity and timestamps populated.
    async fn insert_player(&self, new_player: NewPlayer) -> Result<Player, ApiError>;
}

/// Handle shared by every request; constructed once in `main` and passed to the router.
pub type SharedRepository = Arc<dyn PlayerRepository>;

#[async_trait]
impl PlayerRepository for Database {
    async fn insert_player(&self, new_player: NewPlayer) -> Result<Player, ApiError> {
        Database::insert_player(self, new_player).await
    }
}
