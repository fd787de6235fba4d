//! Pac-man controller: move selection driven by an evolved state evaluator.
//!
//! # How It Works
//!
//! For every pac-man in the game state:
//!
//! 1. **Enumerate Moves** - `NONE`, `UP`, `DOWN`, `LEFT`, `RIGHT`, in that order
//! 2. **Reject Illegal Moves** - the world decides which target cells are legal
//! 3. **Score** - evaluate the tree with the pac-man placed on the target cell
//! 4. **Select** - keep the move with the strictly greatest score
//!
//! The running best starts at a score of `0` with `NONE`, so ties keep the
//! earlier move and a pac-man whose legal moves all score `<= 0` stays put.
//!
//! # Design: Greedy One-Step Lookahead
//!
//! Like a placement evaluator, the controller only looks one tick ahead: the
//! hypothetical position is scored against the current ghost, pill, and fruit
//! positions. Ghost responses are not simulated.

use gpac_engine::{Coord, Direction, GameState, World};
use rand::Rng;

use crate::{
    node::NodeCatalog,
    tree::{EvalContext, ExpressionTree, GrowParams},
};

/// Tree-shape parameters shared by every controller of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Height bounds of freshly initialized trees.
    pub generation_min_height: u32,
    pub generation_max_height: u32,
    /// Height bounds of subtrees regrown by mutation.
    pub mutation_min_height: u32,
    pub mutation_max_height: u32,
    pub premature_end_probability: f64,
    /// Upper bound for random constants in leaves.
    pub max_constant: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            generation_min_height: 2,
            generation_max_height: 5,
            mutation_min_height: 1,
            mutation_max_height: 3,
            premature_end_probability: 0.5,
            max_constant: 10.0,
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn generation_params(&self) -> GrowParams {
        GrowParams {
            min_height: self.generation_min_height,
            max_height: self.generation_max_height,
            premature_end_probability: self.premature_end_probability,
        }
    }

    #[must_use]
    pub fn mutation_params(&self) -> GrowParams {
        GrowParams {
            min_height: self.mutation_min_height,
            max_height: self.mutation_max_height,
            premature_end_probability: self.premature_end_probability,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> NodeCatalog {
        NodeCatalog {
            max_constant: self.max_constant,
        }
    }
}

/// Controls every pac-man in a world with one state evaluator tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PacmanController {
    config: ControllerConfig,
    state_evaluator: ExpressionTree,
}

impl PacmanController {
    /// Creates a controller with a freshly grown state evaluator.
    pub fn random<R>(config: ControllerConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let state_evaluator =
            ExpressionTree::random(&config.generation_params(), &config.catalog(), rng);
        Self {
            config,
            state_evaluator,
        }
    }

    #[must_use]
    pub fn from_tree(config: ControllerConfig, state_evaluator: ExpressionTree) -> Self {
        Self {
            config,
            state_evaluator,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn state_evaluator(&self) -> &ExpressionTree {
        &self.state_evaluator
    }

    pub fn state_evaluator_mut(&mut self) -> &mut ExpressionTree {
        &mut self.state_evaluator
    }

    /// Selects one direction per pac-man, in the order of
    /// [`GameState::pacman_coords`].
    pub fn best_moves<W, R>(&self, world: &W, state: &GameState<'_>, rng: &mut R) -> Vec<Direction>
    where
        W: World + ?Sized,
        R: Rng + ?Sized,
    {
        state
            .pacman_coords()
            .iter()
            .map(|pacman| self.best_move(world, state, *pacman, rng))
            .collect()
    }

    /// Selects the direction for the pac-man standing on `pacman`.
    pub fn best_move<W, R>(
        &self,
        world: &W,
        state: &GameState<'_>,
        pacman: Coord,
        rng: &mut R,
    ) -> Direction
    where
        W: World + ?Sized,
        R: Rng + ?Sized,
    {
        let mut best_score = 0.0;
        let mut best_direction = Direction::None;

        for direction in Direction::ALL {
            let target = pacman.moved(direction);
            if direction != Direction::None && !world.is_legal_move(target) {
                continue;
            }
            let score = self.evaluate_state(state, target, rng);
            if score > best_score {
                best_score = score;
                best_direction = direction;
            }
        }

        best_direction
    }

    /// Scores the game state as if the acting pac-man stood on `pacman`.
    pub fn evaluate_state<R>(&self, state: &GameState<'_>, pacman: Coord, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        let ctx = EvalContext {
            state: *state,
            pacman,
        };
        self.state_evaluator.evaluate(&ctx, rng)
    }

    /// Regrows the subtree at breadth-first `index` with a height drawn from
    /// the mutation bounds, regardless of the subtree's current height.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a node of the state evaluator.
    pub fn mutate<R>(&mut self, index: usize, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let grown = self.state_evaluator.grow(
            index,
            &self.config.mutation_params(),
            &self.config.catalog(),
            rng,
        );
        assert!(grown, "mutation point {index} is outside the tree");
    }

    /// Renders the state evaluator as a fully parenthesized infix expression.
    #[must_use]
    pub fn visualize(&self) -> String {
        self.state_evaluator.to_string()
    }
}
