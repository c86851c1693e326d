use crate::config::GameSettings;
use crate::game::player::Player;
use crate::game::session::Game;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Matchmaking: new connections fill the first open game, and a fresh game is opened
/// once every existing one is running or full.
#[derive(Debug)]
pub struct Lobby {
  games: DashMap<String, Arc<Game>>,
  settings: GameSettings,
  max_players: usize,
  joining: Mutex<()>,
}

impl Lobby {
  pub fn new(settings: GameSettings, max_players: usize) -> Self {
    Self {
      games: DashMap::new(),
      settings,
      max_players: max_players.max(1),
      joining: Mutex::new(()),
    }
  }

  /// Seats the player in an open game. Joins are serialized so two connections never
  /// overfill the same game. A game that starts between lookup and join refuses the
  /// player, who is then offered the next open game.
  pub async fn join(&self, player: Player) -> Arc<Game> {
    let _guard = self.joining.lock().await;
    let mut player = player;
    loop {
      let game = self.find_or_create().await;
      match game.join(player).await {
        Ok(()) => return game,
        Err(refused) => {
          tracing::debug!(game_id = %game.id(), "game started before join, retrying");
          player = refused;
        }
      }
    }
  }

  pub async fn find_or_create(&self) -> Arc<Game> {
    self.prune_ended().await;

    let games: Vec<Arc<Game>> = self.games.iter().map(|entry| entry.value().clone()).collect();
    for game in games {
      if game.is_available_to_join().await && game.player_count().await < self.max_players {
        return game;
      }
    }

    let id = Uuid::new_v4().to_string();
    let game = Arc::new(Game::new(id.clone(), self.settings));
    tracing::info!(game_id = %id, "opened game");
    self.games.insert(id, game.clone());
    game
  }

  async fn prune_ended(&self) {
    let games: Vec<Arc<Game>> = self.games.iter().map(|entry| entry.value().clone()).collect();
    for game in games {
      if game.is_ended().await {
        self.games.remove(game.id());
        tracing::debug!(game_id = %game.id(), "pruned ended game");
      }
    }
  }

  pub fn len(&self) -> usize {
    self.games.len()
  }
}
