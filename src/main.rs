use axum::{
  extract::{State, WebSocketUpgrade},
  http::Method,
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;
mod game;
mod protocol;
mod transport;

use app::lobby::Lobby;
use config::Config;

struct AppState {
  lobby: Arc<Lobby>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
  ok: bool,
  games: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = Config::from_env()?;
  tracing::info!(
    grid_size = config.game.grid_size,
    cycle_ms = config.game.cycle_ms,
    max_players = config.max_players,
    "loaded config"
  );

  let state = Arc::new(AppState {
    lobby: Arc::new(Lobby::new(config.game, config.max_players)),
  });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/game", get(ws_handler))
    .layer(cors)
    .with_state(state);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthResponse {
    ok: true,
    games: state.lobby.len(),
  })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let lobby = state.lobby.clone();
  ws.on_upgrade(move |socket| transport::ws_session::handle_socket(socket, lobby))
}
