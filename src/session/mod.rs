//! Room sessions: code-keyed rooms, membership and per-room tick loops

pub mod error;
pub mod manager;
pub mod room;

pub use error::SessionError;
pub use manager::{RoomSettings, SessionManager};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

/// Identifier assigned to each transport connection
pub type ConnectionId = Uuid;

/// Outbound side of one connection
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerMsg>,
}

impl ClientHandle {
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<ServerMsg>) -> Self {
        Self { id, tx }
    }

    /// Handle with a fresh id and its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(Uuid::new_v4(), tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a message for the writer task. Returns false once the connection is gone.
    pub fn send(&self, msg: ServerMsg) -> bool {
        if self.tx.send(msg).is_err() {
            debug!(conn = %self.id, "Dropping message for closed connection");
            return false;
        }
        true
    }
}
