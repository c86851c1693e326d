use crate::app::lobby::Lobby;
use crate::game::outbound::{outbound, Outbound};
use crate::game::player::{sanitize_player_name, Player};
use crate::game::session::Game;
use crate::protocol::{self, ClientMessage};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

/// The game a connection is seated in, once it has joined.
struct Seat {
    game: Arc<Game>,
    player_id: String,
}

pub async fn handle_socket(socket: WebSocket, lobby: Arc<Lobby>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = outbound();

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let mut seat: Option<Seat> = None;
    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => handle_text(&lobby, &tx, &mut seat, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    if let Some(seat) = seat {
        seat.game.leave(&seat.player_id).await;
        tracing::info!(game_id = %seat.game.id(), player_id = %seat.player_id, "connection closed");
    }
    send_task.abort();
}

async fn handle_text(
    lobby: &Lobby,
    tx: &Outbound,
    seat: &mut Option<Seat>,
    text: &str,
) {
    let Some(message) = protocol::decode_client_message(text) else {
        tracing::debug!("ignoring malformed client message");
        return;
    };

    if let ClientMessage::Join { name } = message {
        if seat.is_none() {
            let player_id = Uuid::new_v4().to_string();
            let name = sanitize_player_name(name.as_deref().unwrap_or(""), "Player");
            let player = Player::new(player_id.clone(), name, tx.clone());
            let game = lobby.join(player).await;
            *seat = Some(Seat { game, player_id });
        }
        return;
    }

    let Some(seat) = seat.as_ref() else { return };
    match message {
        ClientMessage::Ready => {
            seat.game.ready(&seat.player_id).await;
        }
        ClientMessage::Turn { direction } => {
            seat.game.turn(&seat.player_id, direction).await;
        }
        ClientMessage::Join { .. } => {}
    }
}
