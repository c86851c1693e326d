use super::collision::{is_colliding_with_snake, is_out_of_bounds};
use super::constants::{EVENT_GAME_OVER, MAX_FRUIT_ATTEMPTS};
use super::placement::start_positions;
use super::session::GameState;
use super::snake::Snake;
use super::types::Point;
use crate::protocol;
use rand::seq::SliceRandom;
use rand::Rng;
use std::future::Future;

/// Rules and tick engine for one game. Holds no state of its own: every call reads and
/// writes the borrowed `GameState`.
#[derive(Debug)]
pub struct GameInstance<'a> {
  game: &'a mut GameState,
}

impl<'a> GameInstance<'a> {
  pub fn new(game: &'a mut GameState) -> Self {
    Self { game }
  }

  pub fn start_game<F, Fut>(&mut self, cycle: F)
  where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
  {
    self.position_snakes();
    self.create_fruit();
    let period = self.game.cycle;
    self.game.ticker.start(period, cycle);
  }

  fn position_snakes(&mut self) {
    let length = self.game.snake_length;
    let starts = start_positions(self.game.players.len(), self.game.grid_size, length);
    for (player, (head, heading)) in self.game.players.iter_mut().zip(starts) {
      match player.snake.as_mut() {
        Some(snake) => snake.reset_position(head, heading, length),
        None => player.snake = Some(Snake::new(head, heading, length)),
      }
    }
  }

  /// Random free cell, falling back to a full scan after `MAX_FRUIT_ATTEMPTS` misses.
  /// `None` only when no free cell is left.
  pub fn random_valid_position(&self) -> Option<Point> {
    let mut rng = rand::thread_rng();
    let grid_size = self.game.grid_size;
    if grid_size <= 0 {
      return None;
    }
    for _ in 0..MAX_FRUIT_ATTEMPTS {
      let pos = Point::new(rng.gen_range(0..grid_size), rng.gen_range(0..grid_size));
      if !self.is_colliding(pos) {
        return Some(pos);
      }
    }

    tracing::debug!(game_id = %self.game.id, "random fruit placement exhausted, scanning grid");
    let free: Vec<Point> = (0..grid_size)
      .flat_map(|row| (0..grid_size).map(move |col| Point::new(row, col)))
      .filter(|pos| !self.is_colliding(*pos))
      .collect();
    free.choose(&mut rng).copied()
  }

  fn create_fruit(&mut self) {
    self.game.fruit = self.random_valid_position();
    if self.game.fruit.is_none() {
      tracing::warn!(game_id = %self.game.id, "no free cell left for fruit");
    }
  }

  pub fn is_colliding(&self, pos: Point) -> bool {
    self.is_oob(pos) || self.is_colliding_with_snakes(pos)
  }

  pub fn is_oob(&self, pos: Point) -> bool {
    is_out_of_bounds(pos, self.game.grid_size)
  }

  pub fn is_colliding_with_snakes(&self, pos: Point) -> bool {
    self
      .game
      .connected_players()
      .filter_map(|player| player.snake.as_ref())
      .any(|snake| is_colliding_with_snake(snake, pos, false))
  }

  /// Whether the freshly moved head of the snake at `index` ran into a wall, itself, or
  /// any connected player's snake.
  fn is_move_fatal(&self, index: usize, head: Point) -> bool {
    if self.is_oob(head) {
      return true;
    }
    self
      .game
      .players
      .iter()
      .enumerate()
      .filter(|(other, player)| *other == index || player.flags.connected)
      .filter_map(|(other, player)| player.snake.as_ref().map(|snake| (other == index, snake)))
      .any(|(is_self, snake)| is_colliding_with_snake(snake, head, is_self))
  }

  /// Eats the fruit if the snake's head is on it: score, growth, then a new fruit.
  pub fn check_fruit(&mut self, index: usize) {
    let Some(fruit) = self.game.fruit else { return };
    let Some(snake) = self.game.players[index].snake.as_mut() else { return };
    if snake.head != fruit {
      return;
    }
    snake.counter += 1;
    snake.grow();
    self.create_fruit();
  }

  pub fn game_cycle(&mut self) {
    let mut alive = 0;
    let mut died = Vec::new();

    for index in 0..self.game.players.len() {
      let player = &mut self.game.players[index];
      let Some(snake) = player.snake.as_mut() else { continue };
      if snake.is_dead() {
        continue;
      }
      let head = snake.step();
      if self.is_move_fatal(index, head) {
        let player = &mut self.game.players[index];
        let length = player.snake.as_mut().map_or(0, |snake| {
          snake.kill();
          snake.len()
        });
        tracing::debug!(game_id = %self.game.id, player = %player.name, length, "snake died");
        died.push(player.id.clone());
        continue;
      }
      self.check_fruit(index);
      alive += 1;
    }

    for player_id in &died {
      self.game.on_snake_dead(player_id);
    }

    if alive == 0 {
      self.close_game();
      return;
    }
    if self.game.fruit.is_none() {
      tracing::info!(game_id = %self.game.id, "board is full");
      self.close_game();
      return;
    }
    self.game.broadcast(None);
  }

  pub fn are_all_players_gone(&mut self) {
    if self.game.players.iter().any(|player| player.flags.connected) {
      return;
    }
    tracing::info!(game_id = %self.game.id, "all players disconnected");
    self.close_game();
  }

  /// Stops ticking, marks the game ended and sends the game-over notice. Runs at most
  /// once per game, and never before the game started. Returns whether it ran.
  pub fn close_game(&mut self) -> bool {
    if !self.game.flags.started || self.game.flags.ended {
      return false;
    }
    self.game.ticker.stop();
    self.game.flags.ended = true;
    match self.game.try_broadcast(Some(protocol::event(EVENT_GAME_OVER))) {
      Ok(()) => tracing::info!(game_id = %self.game.id, "game closed"),
      Err(error) => tracing::error!(game_id = %self.game.id, ?error, "error while closing game"),
    }
    true
  }
}
