//! Game simulation modules

pub mod food;
pub mod grid;
pub mod input;
pub mod state;
pub mod tick;

pub use input::velocity_for_input;
pub use state::{create_game, GameState, PlayerSlot};
pub use tick::advance;
