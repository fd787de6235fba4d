use std::collections::BTreeSet;

use arrayvec::ArrayVec;
use rand::Rng;

use crate::core::{Coord, Direction};

/// The simulation capability that controllers play against.
///
/// A world owns actor positions, pills, fruit, walls, the clock and the score.
/// Controllers never mutate a world directly; the training loop asks them for
/// directions and applies those through [`World::move_pacmen`] and
/// [`World::move_ghost`].
///
/// One tick of play is driven in this order:
///
/// 1. [`World::randomly_spawn_fruit`]
/// 2. snapshot the world into a [`GameState`](crate::GameState) and decide moves
/// 3. [`World::move_pacmen`] and [`World::move_ghost`] for every ghost
/// 4. [`World::advance_clock`] and [`World::consume_items`]
/// 5. [`World::update_score`]
///
/// until [`World::check_game_over`] returns `true`.
pub trait World {
    /// Grid width in cells.
    fn width(&self) -> i32;

    /// Grid height in cells.
    fn height(&self) -> i32;

    fn pacman_coords(&self) -> &[Coord];

    fn ghost_coords(&self) -> &[Coord];

    fn pill_coords(&self) -> &BTreeSet<Coord>;

    fn fruit_coords(&self) -> &BTreeSet<Coord>;

    fn wall_coords(&self) -> &BTreeSet<Coord>;

    fn time_remaining(&self) -> u32;

    fn score(&self) -> u32;

    /// Returns `true` if an actor may stand on `coord`.
    fn is_legal_move(&self, coord: Coord) -> bool {
        self.contains(coord) && !self.wall_coords().contains(&coord)
    }

    /// Returns `true` if `coord` lies inside the grid.
    fn contains(&self, coord: Coord) -> bool {
        (0..self.width()).contains(&coord.x) && (0..self.height()).contains(&coord.y)
    }

    /// In-grid orthogonal neighbours of `coord`, walls included.
    fn adjacent_coords(&self, coord: Coord) -> ArrayVec<Coord, 4> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }

    /// Moves every pac-man one step. `directions[i]` applies to pac-man `i`.
    fn move_pacmen(&mut self, directions: &[Direction]);

    /// Moves ghost `id` one step.
    fn move_ghost(&mut self, id: usize, direction: Direction);

    /// Rolls for a fruit spawn.
    fn randomly_spawn_fruit<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized;

    /// Consumes one tick of the time budget.
    fn advance_clock(&mut self);

    /// Removes pills and fruit under pac-men.
    fn consume_items(&mut self);

    fn update_score(&mut self);

    fn check_game_over(&self) -> bool;
}
