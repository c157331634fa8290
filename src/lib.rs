// Library root for the player API

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod router;

// Re-export commonly used types
pub use db::Database;
pub use error::{ApiError, ApiResult};
pub use models::{CreatePlayerRequest, NewPlayer, Player};
pub use repository::{PlayerRepository, SharedRepository};
