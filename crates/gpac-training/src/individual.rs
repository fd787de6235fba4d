use gpac_engine::{
    Direction, GameState, GhostController, GpacWorld, RandomGhostController, Transcript, World,
};
use gpac_evaluator::controller::PacmanController;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

/// One candidate solution: a freshly generated world and the controllers
/// that play it.
///
/// The world is kept in its initial state. Every playout runs on a copy, so
/// an evaluated individual can be replayed exactly from its evaluation seed.
#[derive(Debug, Clone)]
pub struct Individual {
    world: GpacWorld,
    pacman_controller: PacmanController,
    ghost_controller: RandomGhostController,
    fitness: Option<f64>,
    eval_seed: Option<u64>,
}

impl Individual {
    #[must_use]
    pub fn new(world: GpacWorld, pacman_controller: PacmanController) -> Self {
        Self {
            world,
            pacman_controller,
            ghost_controller: RandomGhostController,
            fitness: None,
            eval_seed: None,
        }
    }

    #[must_use]
    pub fn world(&self) -> &GpacWorld {
        &self.world
    }

    #[must_use]
    pub fn pacman_controller(&self) -> &PacmanController {
        &self.pacman_controller
    }

    /// Regrows one uniformly chosen subtree of the state evaluator.
    ///
    /// Any previous fitness no longer describes the controller and is cleared.
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let point = rng.random_range(0..self.pacman_controller.state_evaluator().size());
        self.pacman_controller.mutate(point, rng);
        self.fitness = None;
        self.eval_seed = None;
    }

    /// Final score of the last playout, `None` until evaluated.
    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Plays one game to the end and records its score as fitness.
    ///
    /// `seed` drives everything random during the playout: fruit spawns,
    /// ghost moves and `rand` nodes.
    pub fn evaluate(&mut self, seed: u64) -> f64 {
        let mut world = self.world.clone();
        let mut rng = Pcg32::seed_from_u64(seed);
        let score = play_game(
            &mut world,
            &self.pacman_controller,
            &self.ghost_controller,
            &mut rng,
            None,
        );
        let fitness = f64::from(score);
        self.fitness = Some(fitness);
        self.eval_seed = Some(seed);
        fitness
    }

    /// Replays the evaluated game tick by tick.
    ///
    /// Returns `None` if the individual was never evaluated.
    #[must_use]
    pub fn transcript(&self) -> Option<Transcript> {
        let seed = self.eval_seed?;
        let mut world = self.world.clone();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut transcript = Transcript::start(&world);
        play_game(
            &mut world,
            &self.pacman_controller,
            &self.ghost_controller,
            &mut rng,
            Some(&mut transcript),
        );
        Some(transcript)
    }
}

/// Runs a game until the world reports game over and returns the final score.
///
/// Each tick:
///
/// 1. roll for a fruit spawn
/// 2. snapshot the state and decide every pac-man and ghost move from it
/// 3. apply the moves, advance the clock, consume pills and fruit
/// 4. update the score and record the frame
pub fn play_game<W, G, R>(
    world: &mut W,
    pacman_controller: &PacmanController,
    ghost_controller: &G,
    rng: &mut R,
    mut transcript: Option<&mut Transcript>,
) -> u32
where
    W: World + ?Sized,
    G: GhostController + ?Sized,
    R: Rng + ?Sized,
{
    while !world.check_game_over() {
        world.randomly_spawn_fruit(rng);

        let state = GameState::snapshot(&*world);
        let pacman_moves = pacman_controller.best_moves(&*world, &state, rng);
        let ghost_moves = (0..state.ghost_coords().len())
            .map(|id| ghost_controller.ghost_move(id, &state, &*world, rng))
            .collect::<Vec<Direction>>();

        world.move_pacmen(&pacman_moves);
        for (id, direction) in ghost_moves.into_iter().enumerate() {
            world.move_ghost(id, direction);
        }
        world.advance_clock();
        world.consume_items();
        world.update_score();

        if let Some(transcript) = transcript.as_deref_mut() {
            transcript.record(&*world);
        }
    }
    world.score()
}
