//! Authoritative board state owned by a single room

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::food::place_food;
use super::grid::{Position, Velocity};

/// Length of each snake at spawn
pub const INITIAL_SNAKE_LENGTH: i32 = 3;

/// Smallest board accepted; spawn rows stay apart and each snake has room ahead
pub const MIN_GRID_SIZE: i32 = 8;

/// Player slot within a room. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

impl From<PlayerSlot> for u8 {
    fn from(slot: PlayerSlot) -> Self {
        slot.index() as u8 + 1
    }
}

impl TryFrom<u8> for PlayerSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("invalid player slot {other}")),
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// One snake and its controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Spawn position of the head
    pub pos: Position,
    pub vel: Velocity,
    /// Head first, never empty
    pub snake: VecDeque<Position>,
    pub score: u32,
}

impl Player {
    /// Straight snake with its head at `head`, body trailing away from `vel`
    pub fn spawn(head: Position, vel: Velocity, length: i32) -> Self {
        let back = vel.opposite();
        let snake = (0..length.max(1))
            .map(|i| Position::new(head.x + back.x * i, head.y + back.y * i))
            .collect();

        Self {
            pos: head,
            vel,
            snake,
            score: 0,
        }
    }

    pub fn head(&self) -> Position {
        // Non-empty by construction; fall back to spawn for safety on foreign input
        self.snake.front().copied().unwrap_or(self.pos)
    }

    /// Where the head lands this tick, or `None` when stationary
    pub fn next_head(&self) -> Option<Position> {
        if self.vel.is_none() {
            None
        } else {
            Some(self.head().step(self.vel))
        }
    }

    pub fn occupies(&self, cell: Position) -> bool {
        self.snake.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }
}

/// Full state of one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub players: [Player; 2],
    pub food: Position,
    #[serde(rename = "gridsize")]
    pub grid_size: i32,
}

impl GameState {
    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    pub fn is_occupied(&self, cell: Position) -> bool {
        self.players.iter().any(|p| p.occupies(cell))
    }
}

/// Fresh match: player one in the upper quarter on the left heading right,
/// player two mirrored in the lower quarter heading left, food on a random
/// free cell. The rows differ so the heads never meet without input.
pub fn create_game<R: Rng + ?Sized>(grid_size: i32, rng: &mut R) -> GameState {
    let grid_size = grid_size.max(MIN_GRID_SIZE);
    let top = grid_size / 4;
    let bottom = grid_size - 1 - grid_size / 4;

    let one = Player::spawn(
        Position::new(INITIAL_SNAKE_LENGTH, top),
        Velocity::RIGHT,
        INITIAL_SNAKE_LENGTH,
    );
    let two = Player::spawn(
        Position::new(grid_size - 1 - INITIAL_SNAKE_LENGTH, bottom),
        Velocity::LEFT,
        INITIAL_SNAKE_LENGTH,
    );

    let mut state = GameState {
        players: [one, two],
        food: Position::new(0, 0),
        grid_size,
    };
    state.food = place_food(&state, rng);
    state
}
