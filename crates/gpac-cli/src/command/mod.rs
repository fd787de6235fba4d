use clap::{Parser, Subcommand};

use self::{replay::ReplayArg, train::TrainArg};

mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a pac-man state evaluator
    Train(#[clap(flatten)] TrainArg),
    /// Play one game with a saved solution
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_replay_seed_is_optional_and_documented() {
        let args = CommandArgs::try_parse_from([
            "gpac",
            "replay",
            "--config",
            "run.toml",
            "--solution",
            "solution.json",
        ])
        .unwrap();
        let Mode::Replay(arg) = args.mode else {
            panic!("expected replay mode");
        };
        assert_eq!(arg.seed, None);

        let command = CommandArgs::command();
        let replay = command.find_subcommand("replay").unwrap();
        let seed = replay
            .get_arguments()
            .find(|a| a.get_id() == "seed")
            .unwrap();
        let help = seed.get_long_help().or(seed.get_help()).unwrap().to_string();
        assert!(help.contains("training seed"));
        assert!(help.contains("not the one the solution was scored on"));
    }
}
