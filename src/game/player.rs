use super::outbound::{Delivery, Outbound};
use super::snake::Snake;
use crate::error::SendError;
use serde::Serialize;

pub const MAX_PLAYER_NAME_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerFlags {
  pub connected: bool,
  pub prepared: bool,
}

#[derive(Debug)]
pub struct Player {
  pub id: String,
  pub name: String,
  pub flags: PlayerFlags,
  pub snake: Option<Snake>,
  outbound: Outbound,
}

#[derive(Debug, Serialize)]
pub struct PlayerSnapshot<'a> {
  pub id: &'a str,
  pub name: &'a str,
  pub flags: PlayerFlags,
  pub snake: Option<&'a Snake>,
}

impl Player {
  pub fn new(id: String, name: String, outbound: Outbound) -> Self {
    Self {
      id,
      name,
      flags: PlayerFlags {
        connected: true,
        prepared: false,
      },
      snake: None,
      outbound,
    }
  }

  /// Hands a serialized payload to the player's connection without waiting for it.
  pub fn send(&self, payload: &str, delivery: Delivery) -> Result<(), SendError> {
    self.outbound.send(payload.to_string(), delivery)
  }

  pub fn snapshot(&self) -> PlayerSnapshot<'_> {
    PlayerSnapshot {
      id: &self.id,
      name: &self.name,
      flags: self.flags,
      snake: self.snake.as_ref(),
    }
  }
}

pub fn sanitize_player_name(name: &str, fallback: &str) -> String {
  let cleaned = name
    .split_whitespace()
    .map(|word| word.chars().filter(|ch| !ch.is_control()).collect::<String>())
    .filter(|word| !word.is_empty())
    .collect::<Vec<_>>()
    .join(" ");
  if cleaned.is_empty() {
    return fallback.to_string();
  }
  cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect()
}
