use super::constants::{EVENT_GAME_STARTING, EVENT_WELCOME};
use super::instance::GameInstance;
use super::outbound::Delivery;
use super::player::Player;
use super::ticker::Ticker;
use super::types::{Direction, Point};
use crate::config::GameSettings;
use crate::protocol::{self, GameSnapshot};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;

/// One game session. All mutable state sits behind a single lock, so the tick and the
/// transport's event hooks never interleave inside a game.
#[derive(Debug)]
pub struct Game {
  id: String,
  state: Mutex<GameState>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GameFlags {
  pub started: bool,
  pub ended: bool,
}

#[derive(Debug)]
pub struct GameState {
  pub id: String,
  pub flags: GameFlags,
  pub players: Vec<Player>,
  pub fruit: Option<Point>,
  pub grid_size: i32,
  pub snake_length: u32,
  pub cycle: Duration,
  pub ticker: Ticker,
}

impl Game {
  pub fn new(id: String, settings: GameSettings) -> Self {
    Self::with_players(id, settings, Vec::new())
  }

  pub fn with_players(id: String, settings: GameSettings, players: Vec<Player>) -> Self {
    Self {
      state: Mutex::new(GameState::new(id.clone(), settings, players)),
      id,
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub async fn player_count(&self) -> usize {
    self.state.lock().await.players.len()
  }

  pub async fn is_available_to_join(&self) -> bool {
    self.state.lock().await.is_available_to_join()
  }

  pub async fn is_ended(&self) -> bool {
    self.state.lock().await.flags.ended
  }

  /// Adds the player, greets them with their id and resyncs everyone. A game that
  /// already started hands the player back.
  pub async fn join(&self, player: Player) -> Result<(), Player> {
    let mut state = self.state.lock().await;
    if !state.is_available_to_join() {
      return Err(player);
    }
    let player_id = player.id.clone();
    state.add_player(player);
    let welcome = serde_json::json!({
      "event": EVENT_WELCOME,
      "playerId": player_id,
    });
    state.send_envelope_to(&player_id, Some(welcome));
    state.on_player_connected();
    Ok(())
  }

  /// Marks the player prepared and starts the game once everyone is.
  pub async fn ready(self: &Arc<Self>, player_id: &str) -> bool {
    let mut state = self.state.lock().await;
    if let Some(player) = state.player_mut(player_id) {
      player.flags.prepared = true;
    }
    self.start_if_everyone_ready(&mut state)
  }

  /// Before the start a leaving player just drops out of the roster, which may leave
  /// only prepared players behind. Afterwards their snake stays on the board and the
  /// game may close if nobody is left.
  pub async fn leave(self: &Arc<Self>, player_id: &str) {
    let mut state = self.state.lock().await;
    if state.is_available_to_join() {
      state.remove_player(player_id);
      state.broadcast(None);
      self.start_if_everyone_ready(&mut state);
      return;
    }
    if let Some(player) = state.player_mut(player_id) {
      player.flags.connected = false;
    }
    state.on_player_disconnected();
  }

  pub async fn turn(&self, player_id: &str, direction: Direction) {
    let mut state = self.state.lock().await;
    if let Some(snake) = state
      .player_mut(player_id)
      .and_then(|player| player.snake.as_mut())
    {
      snake.turn(direction);
    }
  }

  fn start_if_everyone_ready(self: &Arc<Self>, state: &mut GameState) -> bool {
    let started = state.on_player_ready(self.cycle_fn());
    if started {
      state.broadcast(Some(protocol::event(EVENT_GAME_STARTING)));
    }
    started
  }

  /// One tick; `false` once the game has ended and the ticker should stop.
  async fn cycle(&self) -> bool {
    let mut state = self.state.lock().await;
    if state.flags.ended {
      return false;
    }
    GameInstance::new(&mut state).game_cycle();
    !state.flags.ended
  }

  fn cycle_fn(self: &Arc<Self>) -> impl FnMut() -> CycleFuture + Send + 'static {
    let game = Arc::downgrade(self);
    move || run_cycle(game.clone())
  }
}

type CycleFuture = std::pin::Pin<Box<dyn Future<Output = bool> + Send>>;

fn run_cycle(game: Weak<Game>) -> CycleFuture {
  Box::pin(async move {
    match game.upgrade() {
      Some(game) => game.cycle().await,
      None => false,
    }
  })
}

impl GameState {
  pub fn new(id: String, settings: GameSettings, players: Vec<Player>) -> Self {
    Self {
      id,
      flags: GameFlags::default(),
      players,
      fruit: None,
      grid_size: settings.grid_size,
      snake_length: settings.snake_length,
      cycle: settings.cycle(),
      ticker: Ticker::default(),
    }
  }

  pub fn add_player(&mut self, player: Player) {
    tracing::info!(game_id = %self.id, player = %player.name, "player joined game");
    self.players.push(player);
  }

  pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
    let index = self.players.iter().position(|player| player.id == player_id)?;
    let player = self.players.remove(index);
    tracing::info!(game_id = %self.id, player = %player.name, "player left game");
    Some(player)
  }

  pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
    self.players.iter_mut().find(|player| player.id == player_id)
  }

  pub fn connected_players(&self) -> impl Iterator<Item = &Player> {
    self.players.iter().filter(|player| player.flags.connected)
  }

  pub fn is_available_to_join(&self) -> bool {
    !self.flags.started && !self.flags.ended
  }

  pub fn start_game<F, Fut>(&mut self, cycle: F)
  where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
  {
    if self.flags.started {
      return;
    }
    self.flags.started = true;
    tracing::info!(game_id = %self.id, players = self.players.len(), "game starting");
    GameInstance::new(self).start_game(cycle);
  }

  pub fn snapshot(&self) -> GameSnapshot<'_> {
    GameSnapshot {
      id: &self.id,
      flags: self.flags,
      fruit: self.fruit,
      grid_size: self.grid_size,
      players: self.players.iter().map(Player::snapshot).collect(),
    }
  }

  /// Serializes the envelope once and hands the same text to every player. Plain
  /// state updates go out as frames, anything carrying extra fields as an event.
  pub fn broadcast(&self, extra: Option<Value>) {
    if let Err(error) = self.try_broadcast(extra) {
      tracing::error!(game_id = %self.id, ?error, "failed to encode broadcast");
    }
  }

  pub fn try_broadcast(&self, extra: Option<Value>) -> Result<(), serde_json::Error> {
    let delivery = if extra.is_some() { Delivery::Event } else { Delivery::Frame };
    let payload = protocol::envelope(&self.snapshot(), extra)?;
    for player in &self.players {
      self.send_to_player(player, &payload, delivery);
    }
    Ok(())
  }

  /// Disconnected players are skipped without an attempt; a failed send only affects its player.
  pub fn send_to_player(&self, player: &Player, payload: &str, delivery: Delivery) -> bool {
    if !player.flags.connected {
      return false;
    }
    match player.send(payload, delivery) {
      Ok(()) => true,
      Err(error) => {
        tracing::debug!(game_id = %self.id, player_id = %player.id, %error, "dropping payload");
        false
      }
    }
  }

  pub fn send_envelope_to(&self, player_id: &str, extra: Option<Value>) {
    let Some(player) = self.players.iter().find(|player| player.id == player_id) else { return };
    let delivery = if extra.is_some() { Delivery::Event } else { Delivery::Frame };
    match protocol::envelope(&self.snapshot(), extra) {
      Ok(payload) => {
        self.send_to_player(player, &payload, delivery);
      }
      Err(error) => tracing::error!(game_id = %self.id, ?error, "failed to encode payload"),
    }
  }

  /// Starts the game when every player on a non-empty roster is prepared.
  pub fn on_player_ready<F, Fut>(&mut self, cycle: F) -> bool
  where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
  {
    if !self.is_available_to_join() || self.players.is_empty() {
      return false;
    }
    let all_ready = self.players.iter().all(|player| player.flags.prepared);
    if all_ready {
      self.start_game(cycle);
    }
    all_ready
  }

  pub fn on_player_connected(&self) {
    self.broadcast(None);
  }

  pub fn on_player_disconnected(&mut self) {
    GameInstance::new(self).are_all_players_gone();
  }

  /// Moves the player to the end of the roster, keeping everyone else in order.
  pub fn on_snake_dead(&mut self, player_id: &str) {
    let Some(index) = self.players.iter().position(|player| player.id == player_id) else { return };
    let player = self.players.remove(index);
    self.players.push(player);
  }
}
