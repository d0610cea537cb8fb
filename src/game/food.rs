//! Food placement

use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::Position;
use super::state::GameState;

/// Random probes before falling back to enumerating free cells
pub const MAX_FOOD_ATTEMPTS: usize = 64;

/// Pick a uniformly random cell not covered by any snake.
///
/// Random probing is bounded; after that the free cells are enumerated and
/// one is chosen directly. A completely full board returns the origin.
pub fn place_food<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Position {
    let size = state.grid_size;

    for _ in 0..MAX_FOOD_ATTEMPTS {
        let cell = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        if !state.is_occupied(cell) {
            return cell;
        }
    }

    let free: Vec<Position> = (0..size)
        .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
        .filter(|cell| !state.is_occupied(*cell))
        .collect();

    free.choose(rng).copied().unwrap_or(Position::new(0, 0))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::game::grid::Velocity;
    use crate::game::state::Player;

    fn board_with(one: Vec<Position>, two: Vec<Position>, grid_size: i32) -> GameState {
        let player = |cells: Vec<Position>| Player {
            pos: cells[0],
            vel: Velocity::NONE,
            snake: VecDeque::from(cells),
            score: 0,
        };
        GameState {
            players: [player(one), player(two)],
            food: Position::new(0, 0),
            grid_size,
        }
    }

    #[test]
    fn test_food_avoids_snakes() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let state = board_with(
            vec![Position::new(1, 1), Position::new(1, 2)],
            vec![Position::new(2, 2)],
            4,
        );

        for _ in 0..500 {
            let food = place_food(&state, &mut rng);
            assert!(food.in_bounds(4));
            assert!(!state.is_occupied(food));
        }
    }

    #[test]
    fn test_single_free_cell_is_found() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let size = 8;
        let mut cells: Vec<Position> = (0..size)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .filter(|c| *c != Position::new(6, 7))
            .collect();
        let two = cells.split_off(cells.len() / 2);
        let state = board_with(cells, two, size);

        assert_eq!(place_food(&state, &mut rng), Position::new(6, 7));
    }

    #[test]
    fn test_full_board_terminates() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut cells: Vec<Position> = (0..2)
            .flat_map(|y| (0..2).map(move |x| Position::new(x, y)))
            .collect();
        let two = cells.split_off(2);
        let state = board_with(cells, two, 2);

        assert!(place_food(&state, &mut rng).in_bounds(2));
    }
}
