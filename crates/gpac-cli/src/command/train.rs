use std::path::PathBuf;

use chrono::Utc;
use gpac_training::driver::GpDriver;

use crate::{config::Config, model::solution::Solution, run_log::LogFile, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Run configuration (TOML)
    #[arg(long)]
    config: PathBuf,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg { config: config_path } = arg;
    let (config, config_text) = Config::open(config_path)?;
    let seed = config.seed.resolve();
    eprintln!("Seed: {seed}");

    let mut log_file = LogFile::create(&config.output.log, config_path, &config_text, seed)?;
    let mut driver = GpDriver::new(config.evolution.clone(), config.world.clone(), seed);
    let outcome = driver.train(&mut log_file);
    log_file.finish()?;

    let solution = Solution::from_outcome(&outcome, seed, Utc::now());
    util::save_json("solution", &solution, &config.output.solution)?;
    // an outcome's best individual is always evaluated
    if let Some(transcript) = outcome.best.transcript() {
        util::save_json("transcript", &transcript, &config.output.transcript)?;
    } else {
        log::warn!("best individual has no evaluation seed; transcript not written");
    }

    eprintln!();
    eprintln!("Training completed");
    eprintln!("  Best run: {}", outcome.run);
    eprintln!("  Fitness: {}", solution.fitness);
    eprintln!("  Equation: {}", solution.equation);
    eprintln!("  Log: {}", config.output.log.display());
    eprintln!("  Solution: {}", config.output.solution.display());
    eprintln!("  Transcript: {}", config.output.transcript.display());

    Ok(())
}
