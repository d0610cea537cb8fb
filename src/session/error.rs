//! Session errors reported back to the requesting client

use crate::ws::protocol::ServerMsg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No room with that code")]
    UnknownRoom,

    #[error("Room already has two players")]
    RoomFull,
}

impl SessionError {
    /// Event sent to the client instead of failing the transport
    pub fn reply(self) -> ServerMsg {
        match self {
            Self::UnknownRoom => ServerMsg::UnknowGame,
            Self::RoomFull => ServerMsg::TooManyPlayers,
        }
    }
}
