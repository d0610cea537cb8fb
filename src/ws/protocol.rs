//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::{GameState, PlayerSlot};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Open a new room and take slot 1
    NewGame,

    /// Join an existing room by code
    JoinGame(String),

    /// Raw browser key code, number or numeric string
    Keydown(Value),
}

impl ClientMsg {
    /// Decode a text frame, rejecting anything outside the schema
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Code of the room just created
    GameCode(String),

    /// Slot assigned to this connection
    Init(PlayerSlot),

    /// Per-tick room broadcast
    GameState(GameState),

    /// Match over; the room is gone after this
    GameOver(GameOver),

    /// Join failed: no such room
    UnknowGame,

    /// Join failed: room already has two players
    TooManyPlayers,
}

impl ServerMsg {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub winner: PlayerSlot,
}

/// Integer key code from a keydown payload. Non-numeric input yields `None`.
pub fn parse_key_code(payload: &Value) -> Option<i64> {
    match payload {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
