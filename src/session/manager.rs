//! Session manager - owns the room table and the connection table

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::game::PlayerSlot;
use crate::util::time::tick_period;
use crate::ws::protocol::{parse_key_code, GameOver, ServerMsg};

use super::room::{generate_code, Room, TickOutcome};
use super::{ClientHandle, ConnectionId, SessionError};

/// Attempts at drawing an unused room code before giving up on uniqueness
const MAX_CODE_ATTEMPTS: usize = 16;

/// Per-room parameters
#[derive(Debug, Clone, Copy)]
pub struct RoomSettings {
    pub grid_size: i32,
    pub tick_rate: u32,
    pub code_length: usize,
}

impl RoomSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grid_size: config.grid_size,
            tick_rate: config.tick_rate,
            code_length: config.room_code_length,
        }
    }

    pub fn tick_period(&self) -> Duration {
        tick_period(self.tick_rate)
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            grid_size: 20,
            tick_rate: 10,
            code_length: 5,
        }
    }
}

/// Where a connection sits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub code: String,
    pub slot: PlayerSlot,
}

/// Room registry and lifecycle
pub struct SessionManager {
    settings: RoomSettings,
    /// Room code -> room
    rooms: DashMap<String, Arc<Room>>,
    /// Connection -> room it plays in
    client_rooms: DashMap<ConnectionId, Membership>,
}

impl SessionManager {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            settings,
            rooms: DashMap::new(),
            client_rooms: DashMap::new(),
        }
    }

    pub fn room(&self, code: &str) -> Option<Arc<Room>> {
        self.rooms.get(code).map(|r| r.value().clone())
    }

    pub fn membership(&self, id: ConnectionId) -> Option<Membership> {
        self.client_rooms.get(&id).map(|m| m.value().clone())
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn connected_players(&self) -> usize {
        self.client_rooms.len()
    }

    /// Open a room with `client` as player one. Replies `gameCode` then `init(1)`.
    pub fn new_game(&self, client: &ClientHandle) -> String {
        self.leave(client.id());

        let mut rng = rand::thread_rng();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let code = generate_code(self.settings.code_length, &mut rng);
            match self.rooms.entry(code.clone()) {
                Entry::Vacant(slot) => {
                    let room = Arc::new(Room::new(code.clone(), self.settings.grid_size, rand::random()));
                    slot.insert(room.clone());
                    self.register_creator(&room, client);
                    return code;
                }
                Entry::Occupied(_) if attempts < MAX_CODE_ATTEMPTS => {
                    debug!(room = %code, "Room code collision, drawing again");
                }
                Entry::Occupied(mut slot) => {
                    warn!(room = %code, "Room code space exhausted, replacing existing room");
                    let room = Arc::new(Room::new(code.clone(), self.settings.grid_size, rand::random()));
                    let old = slot.insert(room.clone());
                    drop(slot);
                    old.broadcast(&ServerMsg::UnknowGame);
                    self.teardown(&old);
                    self.register_creator(&room, client);
                    return code;
                }
            }
        }
    }

    /// Open a room under a chosen code
    #[cfg(test)]
    pub(crate) fn new_game_with_code(&self, client: &ClientHandle, code: &str) {
        self.leave(client.id());
        let room = Arc::new(Room::new(code.to_string(), self.settings.grid_size, 7));
        self.rooms.insert(code.to_string(), room.clone());
        self.register_creator(&room, client);
    }

    fn register_creator(&self, room: &Arc<Room>, client: &ClientHandle) {
        let code = room.code().to_string();
        room.add_creator(client.clone());
        self.client_rooms.insert(
            client.id(),
            Membership {
                code: code.clone(),
                slot: PlayerSlot::One,
            },
        );

        client.send(ServerMsg::GameCode(code.clone()));
        client.send(ServerMsg::Init(PlayerSlot::One));

        info!(room = %code, conn = %client.id(), "Room created");
    }

    /// Join `code` as the second player and start its tick loop.
    /// Errors are for the caller to report to the client.
    pub fn join_game(
        self: &Arc<Self>,
        client: &ClientHandle,
        code: &str,
    ) -> Result<PlayerSlot, SessionError> {
        self.leave(client.id());

        let room = self.room(code).ok_or(SessionError::UnknownRoom)?;
        let slot = room.try_join(client.clone())?;

        self.client_rooms.insert(
            client.id(),
            Membership {
                code: code.to_string(),
                slot,
            },
        );
        client.send(ServerMsg::Init(slot));

        info!(room = %code, conn = %client.id(), slot = %slot, "Player joined room");

        self.start_ticker(&room);
        Ok(slot)
    }

    /// Apply a raw keydown payload for this connection.
    /// Unknown connections and non-numeric payloads are ignored.
    pub fn handle_input(&self, id: ConnectionId, raw: &Value) {
        let Some(membership) = self.membership(id) else {
            return;
        };

        let Some(key_code) = parse_key_code(raw) else {
            warn!(conn = %id, payload = %raw, "Ignoring non-numeric key code");
            return;
        };

        if let Some(room) = self.room(&membership.code) {
            room.steer(membership.slot, key_code);
        }
    }

    /// Run one tick for `code` and publish the result.
    /// Returns false once the room no longer needs ticking.
    pub fn advance_room(&self, code: &str) -> bool {
        let Some(room) = self.room(code) else {
            return false;
        };

        match room.tick() {
            TickOutcome::Running(state) => {
                room.broadcast(&ServerMsg::GameState(state));
                true
            }
            TickOutcome::Finished(winner) => {
                self.end_room(code, winner);
                false
            }
        }
    }

    /// Announce the winner and destroy the room. A second call is a no-op.
    pub fn end_room(&self, code: &str, winner: PlayerSlot) -> bool {
        let Some((_, room)) = self.rooms.remove(code) else {
            debug!(room = %code, "Room already torn down");
            return false;
        };

        room.broadcast(&ServerMsg::GameOver(GameOver { winner }));
        self.teardown(&room);

        info!(room = %code, winner = %winner, "Match over");
        true
    }

    /// Destroy a room without announcing a result
    pub fn close_room(&self, code: &str) -> bool {
        let Some((_, room)) = self.rooms.remove(code) else {
            return false;
        };

        self.teardown(&room);
        info!(room = %code, "Room closed");
        true
    }

    /// Take a connection out of its room.
    ///
    /// A running match is forfeited to the remaining player; a room that
    /// never started is closed once empty.
    pub fn leave(&self, id: ConnectionId) {
        let Some((_, membership)) = self.client_rooms.remove(&id) else {
            return;
        };
        let Some(room) = self.room(&membership.code) else {
            return;
        };

        room.remove_member(id);
        info!(room = %membership.code, conn = %id, "Player left room");

        if room.is_running() {
            self.end_room(&membership.code, membership.slot.other());
        } else if room.member_count() == 0 {
            self.close_room(&membership.code);
        }
    }

    fn teardown(&self, room: &Room) {
        self.client_rooms.retain(|_, m| m.code != room.code());
        room.stop_ticker();
        let evicted = room.evict_all();
        debug!(room = %room.code(), evicted, "Room channel cleared");
    }

    fn start_ticker(self: &Arc<Self>, room: &Arc<Room>) {
        let manager: Weak<Self> = Arc::downgrade(self);
        let code = room.code().to_string();
        let period = self.settings.tick_period();

        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;

                let Some(manager) = manager.upgrade() else {
                    break;
                };
                if !manager.advance_room(&code) {
                    break;
                }
            }

            debug!(room = %code, "Tick loop finished");
        });

        room.set_ticker(handle);
        info!(room = %room.code(), ?period, "Match started");
    }
}
