//! A single room: one game, up to two members, one tick task

use parking_lot::Mutex;
use rand::distributions::{Alphanumeric, DistString};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::game::{advance, create_game, velocity_for_input, GameState, PlayerSlot};
use crate::ws::protocol::ServerMsg;

use super::{ClientHandle, ConnectionId, SessionError};

/// Maximum members per room
pub const ROOM_CAPACITY: usize = 2;

/// Random alphanumeric room code
pub fn generate_code<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    Alphanumeric.sample_string(rng, len)
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Match continues; snapshot taken under the room lock
    Running(GameState),
    /// Match over
    Finished(PlayerSlot),
}

#[derive(Debug, Clone)]
struct Member {
    slot: PlayerSlot,
    client: ClientHandle,
}

/// Game state and its RNG, always locked together
struct RoomGame {
    state: GameState,
    rng: ChaCha8Rng,
}

pub struct Room {
    code: String,
    game: Mutex<RoomGame>,
    /// Room channel: every connection that receives room broadcasts
    members: Mutex<Vec<Member>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Room {
    pub fn new(code: String, grid_size: i32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = create_game(grid_size, &mut rng);

        Self {
            code,
            game: Mutex::new(RoomGame { state, rng }),
            members: Mutex::new(Vec::with_capacity(ROOM_CAPACITY)),
            ticker: Mutex::new(None),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn member_count(&self) -> usize {
        self.members.lock().len()
    }

    /// Register the room creator
    pub fn add_creator(&self, client: ClientHandle) {
        self.members.lock().push(Member {
            slot: PlayerSlot::One,
            client,
        });
    }

    /// Add a second member, returning the slot assigned.
    /// An empty room is treated as nonexistent.
    pub fn try_join(&self, client: ClientHandle) -> Result<PlayerSlot, SessionError> {
        let mut members = self.members.lock();

        if members.is_empty() {
            return Err(SessionError::UnknownRoom);
        }
        if members.len() >= ROOM_CAPACITY {
            return Err(SessionError::RoomFull);
        }

        let slot = if members.iter().any(|m| m.slot == PlayerSlot::One) {
            PlayerSlot::Two
        } else {
            PlayerSlot::One
        };
        members.push(Member { slot, client });
        Ok(slot)
    }

    /// Drop a connection from the room channel
    pub fn remove_member(&self, id: ConnectionId) -> Option<PlayerSlot> {
        let mut members = self.members.lock();
        let idx = members.iter().position(|m| m.client.id() == id)?;
        Some(members.remove(idx).slot)
    }

    /// Clear the room channel, returning how many were evicted
    pub fn evict_all(&self) -> usize {
        let mut members = self.members.lock();
        let count = members.len();
        members.clear();
        count
    }

    /// Send to every member
    pub fn broadcast(&self, msg: &ServerMsg) {
        for member in self.members.lock().iter() {
            member.client.send(msg.clone());
        }
    }

    /// Apply a key press to a player's velocity
    pub fn steer(&self, slot: PlayerSlot, key_code: i64) {
        let mut game = self.game.lock();
        let player = game.state.player_mut(slot);
        player.vel = velocity_for_input(key_code, player.vel);
    }

    /// Run one tick under the room lock
    pub fn tick(&self) -> TickOutcome {
        let mut guard = self.game.lock();
        let RoomGame { state, rng } = &mut *guard;

        match advance(state, rng) {
            Some(winner) => TickOutcome::Finished(winner),
            None => TickOutcome::Running(state.clone()),
        }
    }

    /// Copy of the current state
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> GameState {
        self.game.lock().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.ticker.lock().is_some()
    }

    pub fn set_ticker(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.ticker.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the tick task. Returns false if none was running.
    pub fn stop_ticker(&self) -> bool {
        match self.ticker.lock().take() {
            Some(handle) => {
                handle.abort();
                debug!(room = %self.code, "Tick task cancelled");
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&mut GameState) -> T) -> T {
        f(&mut self.game.lock().state)
    }
}
