use std::fmt;

use arrayvec::ArrayVec;
use rand::{Rng, seq::IndexedRandom as _};

use crate::{
    core::Direction,
    engine::{game_state::GameState, world::World},
};

/// Chooses ghost moves.
///
/// Ghost policies are not evolved; they form the opposition the pac-man
/// controllers are trained against.
pub trait GhostController: fmt::Debug + Send + Sync {
    /// Chooses the next direction for ghost `ghost_id`.
    fn ghost_move<W, R>(
        &self,
        ghost_id: usize,
        state: &GameState<'_>,
        world: &W,
        rng: &mut R,
    ) -> Direction
    where
        W: World + ?Sized,
        R: Rng + ?Sized;
}

/// Moves every ghost to a uniformly chosen legal neighbour.
///
/// Ghosts never stand still unless they are boxed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomGhostController;

impl GhostController for RandomGhostController {
    fn ghost_move<W, R>(
        &self,
        ghost_id: usize,
        state: &GameState<'_>,
        world: &W,
        rng: &mut R,
    ) -> Direction
    where
        W: World + ?Sized,
        R: Rng + ?Sized,
    {
        let coord = state.ghost_coords()[ghost_id];
        let legal = Direction::MOVES
            .into_iter()
            .filter(|d| world.is_legal_move(coord.moved(*d)))
            .collect::<ArrayVec<_, 4>>();
        legal.choose(rng).copied().unwrap_or(Direction::None)
    }
}
