// Models module

pub mod player;

// Re-export commonly used types
pub use player::{CreatePlayerRequest, NewPlayer, Player};
