//! Authoritative per-tick update

use rand::Rng;

use super::food::place_food;
use super::grid::Position;
use super::state::{GameState, PlayerSlot};

/// Advance the match by one tick.
///
/// Players move in slot order. The first loss condition met ends the tick
/// and the opposing slot is returned as the winner; the state is then
/// considered terminal and must not be broadcast. When both heads would
/// enter the same cell, player one loses.
pub fn advance<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Option<PlayerSlot> {
    let heads = [
        state.player(PlayerSlot::One).next_head(),
        state.player(PlayerSlot::Two).next_head(),
    ];
    if let [Some(a), Some(b)] = heads {
        if a == b {
            return Some(PlayerSlot::Two);
        }
    }

    for slot in PlayerSlot::ALL {
        let Some(head) = state.player(slot).next_head() else {
            continue;
        };

        if !head.in_bounds(state.grid_size) || collides(state, slot, head) {
            return Some(slot.other());
        }

        let ate = head == state.food;
        let player = state.player_mut(slot);
        player.snake.push_front(head);
        if ate {
            player.score += 1;
            state.food = place_food(state, rng);
        } else {
            player.snake.pop_back();
        }
    }

    None
}

/// Whether `head` hits either snake. The mover's own tail is excluded unless
/// it is about to grow, since that cell is vacated this tick.
fn collides(state: &GameState, slot: PlayerSlot, head: Position) -> bool {
    let own = state.player(slot);
    let keep = if head == state.food {
        own.len()
    } else {
        own.len().saturating_sub(1)
    };

    own.snake.iter().take(keep).any(|cell| *cell == head)
        || state.player(slot.other()).occupies(head)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::game::grid::Velocity;
    use crate::game::input::velocity_for_input;
    use crate::game::state::{create_game, Player};

    fn player(cells: &[(i32, i32)], vel: Velocity) -> Player {
        let snake: VecDeque<Position> = cells.iter().map(|&(x, y)| Position::new(x, y)).collect();
        Player {
            pos: snake[0],
            vel,
            snake,
            score: 0,
        }
    }

    fn board(one: Player, two: Player, food: (i32, i32)) -> GameState {
        GameState {
            players: [one, two],
            food: Position::new(food.0, food.1),
            grid_size: 10,
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let mut state = board(
            player(&[(3, 3), (2, 3), (1, 3)], Velocity::RIGHT),
            player(&[(6, 6), (7, 6)], Velocity::LEFT),
            (9, 0),
        );

        assert_eq!(advance(&mut state, &mut rng()), None);

        let one = state.player(PlayerSlot::One);
        assert_eq!(one.head(), Position::new(4, 3));
        assert_eq!(one.len(), 3);
        assert_eq!(one.snake.back(), Some(&Position::new(2, 3)));
        assert_eq!(state.player(PlayerSlot::Two).head(), Position::new(5, 6));
    }

    #[test]
    fn test_eating_grows_and_respawns_food() {
        let mut state = board(
            player(&[(3, 3), (2, 3)], Velocity::RIGHT),
            player(&[(6, 6)], Velocity::NONE),
            (4, 3),
        );

        assert_eq!(advance(&mut state, &mut rng()), None);

        let one = state.player(PlayerSlot::One);
        assert_eq!(one.len(), 3);
        assert_eq!(one.score, 1);
        assert_eq!(one.head(), Position::new(4, 3));
        assert_ne!(state.food, Position::new(4, 3));
        assert!(!state.is_occupied(state.food));
    }

    #[test]
    fn test_player_one_leaves_grid() {
        let mut state = board(
            player(&[(0, 4), (1, 4)], Velocity::LEFT),
            player(&[(6, 6)], Velocity::UP),
            (9, 9),
        );
        assert_eq!(advance(&mut state, &mut rng()), Some(PlayerSlot::Two));
    }

    #[test]
    fn test_player_two_leaves_grid() {
        let mut state = board(
            player(&[(4, 4)], Velocity::UP),
            player(&[(6, 9), (6, 8)], Velocity::DOWN),
            (0, 0),
        );
        assert_eq!(advance(&mut state, &mut rng()), Some(PlayerSlot::One));
    }

    #[test]
    fn test_leaving_through_top_edge() {
        let mut state = board(
            player(&[(5, 0), (5, 1)], Velocity::UP),
            player(&[(8, 8)], Velocity::NONE),
            (2, 2),
        );
        assert_eq!(advance(&mut state, &mut rng()), Some(PlayerSlot::Two));
    }

    #[test]
    fn test_both_leave_grid_player_one_loses() {
        let mut state = board(
            player(&[(0, 4)], Velocity::LEFT),
            player(&[(9, 4)], Velocity::RIGHT),
            (5, 5),
        );
        assert_eq!(advance(&mut state, &mut rng()), Some(PlayerSlot::Two));
    }

    #[test]
    fn test_head_to_head_player_one_loses() {
        let mut state = board(
            player(&[(4, 5), (3, 5)], Velocity::RIGHT),
            player(&[(6, 5), (7, 5)], Velocity::LEFT),
            (0, 0),
        );
        assert_eq!(advance(&mut state, &mut rng()), Some(PlayerSlot::Two));
    }

    #[test]
    fn test_running_into_opponent_body() {
        let mut state = board(
            player(&[(6, 4), (6, 3)], Velocity::RIGHT),
            player(&[(7, 5), (7, 4), (7, 3)], Velocity::DOWN),
            (0, 0),
        );
        assert_eq!(advance(&mut state, &mut rng()), Some(PlayerSlot::Two));
    }

    #[test]
    fn test_player_two_sees_player_one_move() {
        // Player one vacates (3, 5) before player two steps into it.
        let mut state = board(
            player(&[(4, 5), (3, 5)], Velocity::RIGHT),
            player(&[(3, 6), (3, 7)], Velocity::UP),
            (0, 0),
        );

        assert_eq!(advance(&mut state, &mut rng()), None);
        assert_eq!(state.player(PlayerSlot::Two).head(), Position::new(3, 5));
    }

    #[test]
    fn test_self_collision() {
        let mut state = board(
            player(&[(2, 2), (3, 2), (3, 3), (2, 3), (1, 3)], Velocity::DOWN),
            player(&[(8, 8)], Velocity::NONE),
            (0, 0),
        );
        assert_eq!(advance(&mut state, &mut rng()), Some(PlayerSlot::Two));
    }

    #[test]
    fn test_chasing_own_tail_is_allowed() {
        let mut state = board(
            player(&[(1, 0), (0, 0), (0, 1), (1, 1)], Velocity::DOWN),
            player(&[(8, 8)], Velocity::NONE),
            (5, 5),
        );

        assert_eq!(advance(&mut state, &mut rng()), None);
        assert_eq!(state.player(PlayerSlot::One).head(), Position::new(1, 1));
        assert_eq!(state.player(PlayerSlot::One).len(), 4);
    }

    #[test]
    fn test_stationary_player_is_skipped() {
        let mut state = board(
            player(&[(0, 0)], Velocity::NONE),
            player(&[(8, 8)], Velocity::NONE),
            (5, 5),
        );
        let before = state.clone();

        assert_eq!(advance(&mut state, &mut rng()), None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_length_grows_only_when_eating() {
        let mut rng = rng();

        for seed in 0..50u64 {
            let mut state = create_game(12, &mut rng);
            let mut keys = ChaCha8Rng::seed_from_u64(seed);

            for _ in 0..200 {
                for slot in PlayerSlot::ALL {
                    let code = keys.gen_range(37..=40);
                    let p = state.player_mut(slot);
                    p.vel = velocity_for_input(code, p.vel);
                }

                let before = state.clone();
                if advance(&mut state, &mut rng).is_some() {
                    break;
                }

                for slot in PlayerSlot::ALL {
                    let (old, new) = (before.player(slot), state.player(slot));
                    let ate = (new.score - old.score) as usize;
                    assert_eq!(new.len(), old.len() + ate);
                }
                assert!(!state.is_occupied(state.food));
            }
        }
    }
}
