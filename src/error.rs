//! Error types shared across the server.

use thiserror::Error;

/// A payload could not be handed to a player's connection.
#[derive(Debug, Error)]
pub enum SendError {
  #[error("connection is closed")]
  Closed,
}

/// Startup configuration that cannot run a game.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value {value:?} for {key}")]
  InvalidValue { key: &'static str, value: String },

  #[error("grid size {grid_size} is too small for snakes of length {snake_length}")]
  GridTooSmall { grid_size: i32, snake_length: u32 },

  #[error("{max_players} players do not fit on a grid of size {grid_size}")]
  TooManyPlayers { max_players: usize, grid_size: i32 },

  #[error("cycle period must be at least 1ms")]
  ZeroCycle,
}
