use crate::error::ConfigError;
use crate::game::constants::{DEFAULT_CYCLE_MS, DEFAULT_GRID_SIZE, DEFAULT_MAX_PLAYERS, STARTING_LENGTH};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8787;

/// Per-game rules shared by every game the lobby creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
  pub cycle_ms: u64,
  pub grid_size: i32,
  pub snake_length: u32,
}

impl GameSettings {
  pub fn cycle(&self) -> Duration {
    Duration::from_millis(self.cycle_ms)
  }
}

impl Default for GameSettings {
  fn default() -> Self {
    Self {
      cycle_ms: DEFAULT_CYCLE_MS,
      grid_size: DEFAULT_GRID_SIZE,
      snake_length: STARTING_LENGTH,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub port: u16,
  pub max_players: usize,
  pub game: GameSettings,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      max_players: DEFAULT_MAX_PLAYERS,
      game: GameSettings::default(),
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Reads every setting through `lookup`, falling back to defaults for missing keys.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let defaults = Self::default();
    let config = Self {
      port: parse_var(&lookup, "PORT", defaults.port)?,
      max_players: parse_var(&lookup, "MAX_PLAYERS", defaults.max_players)?,
      game: GameSettings {
        cycle_ms: parse_var(&lookup, "CYCLE_MS", defaults.game.cycle_ms)?,
        grid_size: parse_var(&lookup, "GRID_SIZE", defaults.game.grid_size)?,
        snake_length: parse_var(&lookup, "SNAKE_LENGTH", defaults.game.snake_length)?,
      },
    };
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let game = &self.game;
    if game.cycle_ms == 0 {
      return Err(ConfigError::ZeroCycle);
    }
    if game.snake_length == 0 || i64::from(game.snake_length) >= i64::from(game.grid_size) {
      return Err(ConfigError::GridTooSmall {
        grid_size: game.grid_size,
        snake_length: game.snake_length,
      });
    }
    if self.max_players == 0 || self.max_players > game.grid_size as usize {
      return Err(ConfigError::TooManyPlayers {
        max_players: self.max_players,
        grid_size: game.grid_size,
      });
    }
    Ok(())
  }
}

fn parse_var<T: FromStr>(
  lookup: &impl Fn(&str) -> Option<String>,
  key: &'static str,
  default: T,
) -> Result<T, ConfigError> {
  let Some(raw) = lookup(key) else { return Ok(default) };
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(default);
  }
  trimmed
    .parse()
    .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
      .iter()
      .map(|(key, value)| (key.to_string(), value.to_string()))
      .collect();
    move |key: &str| vars.get(key).cloned()
  }

  #[test]
  fn missing_vars_fall_back_to_defaults() {
    let config = Config::from_lookup(lookup_from(&[])).expect("defaults are valid");
    assert_eq!(config, Config::default());
    assert_eq!(config.game.cycle(), Duration::from_millis(150));
  }

  #[test]
  fn vars_override_defaults() {
    let config = Config::from_lookup(lookup_from(&[
      ("PORT", "9000"),
      ("CYCLE_MS", " 80 "),
      ("GRID_SIZE", "12"),
      ("MAX_PLAYERS", "6"),
      ("SNAKE_LENGTH", "4"),
    ]))
    .expect("valid config");
    assert_eq!(config.port, 9000);
    assert_eq!(config.max_players, 6);
    assert_eq!(
      config.game,
      GameSettings {
        cycle_ms: 80,
        grid_size: 12,
        snake_length: 4,
      }
    );
  }

  #[test]
  fn unparsable_values_are_rejected() {
    let error = Config::from_lookup(lookup_from(&[("GRID_SIZE", "huge")])).unwrap_err();
    assert!(matches!(error, ConfigError::InvalidValue { key: "GRID_SIZE", .. }));
  }

  #[test]
  fn inconsistent_settings_are_rejected() {
    assert!(matches!(
      Config::from_lookup(lookup_from(&[("CYCLE_MS", "0")])),
      Err(ConfigError::ZeroCycle)
    ));
    assert!(matches!(
      Config::from_lookup(lookup_from(&[("GRID_SIZE", "3"), ("SNAKE_LENGTH", "3")])),
      Err(ConfigError::GridTooSmall { .. })
    ));
    assert!(matches!(
      Config::from_lookup(lookup_from(&[("GRID_SIZE", "5"), ("MAX_PLAYERS", "6")])),
      Err(ConfigError::TooManyPlayers { .. })
    ));
  }
}
