use std::path::PathBuf;

use gpac_engine::{RandomGhostController, Transcript};
use gpac_evaluator::controller::PacmanController;
use gpac_training::individual::play_game;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{config::Config, model::solution::Solution, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Run configuration (TOML); its world settings are used
    #[arg(long)]
    config: PathBuf,
    /// Solution file written by `train`
    #[arg(long)]
    solution: PathBuf,
    /// Seed for the replayed world and game; defaults to the training seed
    /// recorded in the solution. This generates a new world, not the one the
    /// solution was scored on (`train` saves that game as its transcript).
    #[arg(long)]
    pub(super) seed: Option<u64>,
    /// Where to write the game transcript
    #[arg(long)]
    transcript: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        config,
        solution,
        seed,
        transcript: transcript_path,
    } = arg;
    let (config, _) = Config::open(config)?;

    eprintln!("Loading solution from {}", solution.display());
    let solution = Solution::open(solution)?;
    let controller =
        PacmanController::from_tree(config.evolution.controller_config(), solution.to_tree()?);
    eprintln!("  Equation: {}", controller.visualize());

    let seed = seed.unwrap_or(solution.seed);
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut world = config.world.build(&mut rng);
    let mut transcript = Transcript::start(&world);
    let score = play_game(
        &mut world,
        &controller,
        &RandomGhostController,
        &mut rng,
        Some(&mut transcript),
    );

    eprintln!();
    eprintln!("Game finished");
    eprintln!("  Seed: {seed}");
    eprintln!("  Training fitness: {}", solution.fitness);
    eprintln!("  Ticks: {}", transcript.frames.len() - 1);
    eprintln!("  Score: {score}");

    if let Some(path) = transcript_path {
        util::save_json("transcript", &transcript, path)?;
        eprintln!("  Transcript: {}", path.display());
    }

    Ok(())
}
