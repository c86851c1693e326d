use crate::game::player::PlayerSnapshot;
use crate::game::session::GameFlags;
use crate::game::types::{serialize_fruit, Direction, Point};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
  #[serde(rename = "join")]
  Join { name: Option<String> },
  #[serde(rename = "ready")]
  Ready,
  #[serde(rename = "turn")]
  Turn { direction: Direction },
}

/// Client-facing projection of a game.
#[derive(Debug, Serialize)]
pub struct GameSnapshot<'a> {
  pub id: &'a str,
  pub flags: GameFlags,
  #[serde(serialize_with = "serialize_fruit")]
  pub fruit: Option<Point>,
  #[serde(rename = "gridSize")]
  pub grid_size: i32,
  pub players: Vec<PlayerSnapshot<'a>>,
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  serde_json::from_str(text).ok()
}

/// Builds `{"game": ...}` with `extra` merged alongside and serializes it once.
pub fn envelope(game: &GameSnapshot<'_>, extra: Option<Value>) -> Result<String, serde_json::Error> {
  let mut payload = json!({ "game": serde_json::to_value(game)? });
  if let Some(extra) = extra {
    merge_into(&mut payload, extra);
  }
  serde_json::to_string(&payload)
}

pub fn event(name: &str) -> Value {
  json!({ "event": name })
}

/// Deep merge: objects merge key by key, anything else in `extra` replaces what is in `base`.
pub fn merge_into(base: &mut Value, extra: Value) {
  match (base, extra) {
    (Value::Object(base), Value::Object(extra)) => {
      for (key, value) in extra {
        match base.get_mut(&key) {
          Some(slot) => merge_into(slot, value),
          None => {
            base.insert(key, value);
          }
        }
      }
    }
    (base, extra) => *base = extra,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_tagged_client_messages() {
    assert_eq!(
      decode_client_message(r#"{"type":"join","name":"ana"}"#),
      Some(ClientMessage::Join {
        name: Some("ana".to_string())
      })
    );
    assert_eq!(
      decode_client_message(r#"{"type":"join"}"#),
      Some(ClientMessage::Join { name: None })
    );
    assert_eq!(
      decode_client_message(r#"{"type":"ready"}"#),
      Some(ClientMessage::Ready)
    );
    assert_eq!(
      decode_client_message(r#"{"type":"turn","direction":"up"}"#),
      Some(ClientMessage::Turn {
        direction: Direction::Up
      })
    );
    assert_eq!(decode_client_message(r#"{"type":"turn","direction":"north"}"#), None);
    assert_eq!(decode_client_message("not json"), None);
  }

  #[test]
  fn merge_adds_and_nests() {
    let mut base = json!({ "game": { "id": "g", "flags": { "started": true } } });
    merge_into(
      &mut base,
      json!({ "event": "game-over", "game": { "flags": { "ended": true } } }),
    );
    assert_eq!(
      base,
      json!({
        "event": "game-over",
        "game": { "id": "g", "flags": { "started": true, "ended": true } }
      })
    );
  }

  #[test]
  fn envelope_places_extra_next_to_game() {
    let snapshot = GameSnapshot {
      id: "abc",
      flags: GameFlags::default(),
      fruit: Some(Point::new(1, 2)),
      grid_size: 10,
      players: Vec::new(),
    };
    let text = envelope(&snapshot, Some(event("game-over"))).expect("serialize");
    let value: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value["event"], "game-over");
    assert_eq!(value["game"]["id"], "abc");
    assert_eq!(value["game"]["gridSize"], 10);
    assert_eq!(value["game"]["fruit"], json!([1, 2]));
    assert_eq!(value["game"]["flags"], json!({ "started": false, "ended": false }));
    assert_eq!(value["game"]["players"], json!([]));
  }
}
