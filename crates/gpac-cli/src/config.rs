use std::{fs, path::Path, path::PathBuf};

use anyhow::Context;
use gpac_engine::GpacWorldConfig;
use gpac_training::config::EvolutionConfig;
use rand::Rng as _;
use serde::{Deserialize, Serialize};

/// Run configuration, one TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub evolution: EvolutionConfig,
    pub seed: SeedConfig,
    pub world: GpacWorldConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Use `value` instead of a seed drawn from OS entropy.
    pub use_external: bool,
    /// Required when `use_external` is set.
    pub value: Option<u64>,
}

impl SeedConfig {
    pub fn validate(self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.use_external || self.value.is_some(),
            "seed.value is required when seed.use_external is true"
        );
        Ok(())
    }

    pub fn resolve(self) -> u64 {
        match self.value {
            Some(value) if self.use_external => value,
            _ => rand::rng().random(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub log: PathBuf,
    pub solution: PathBuf,
    pub transcript: PathBuf,
}

impl Config {
    /// Reads and validates a config file, returning it with its source text.
    pub fn open<P>(path: P) -> anyhow::Result<(Self, String)>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok((config, text))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.evolution.validate()?;
        config.world.validate()?;
        config.seed.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use gpac_training::config::{ParentSelection, SurvivalSelection, SurvivalStrategy};

    use super::*;

    const DEFAULT: &str = include_str!("../../../config/default.toml");

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::parse(DEFAULT).unwrap();
        assert_eq!(config.evolution.mu, 100);
        assert_eq!(
            config.evolution.parent_selection,
            ParentSelection::FitnessProportional
        );
        assert_eq!(config.evolution.survival_strategy, SurvivalStrategy::Plus);
        assert_eq!(
            config.evolution.survival_selection,
            SurvivalSelection::KTournament { k: 8 }
        );
        assert_eq!(config.world.ghosts, 3);
        assert_eq!(config.output.log, PathBuf::from("output/log.txt"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_world = DEFAULT.replace("width = 15", "width = 1");
        let err = Config::parse(&bad_world).unwrap_err();
        assert!(err.to_string().contains("world.width"));

        let bad_evolution = DEFAULT.replace("mu = 100", "mu = 0");
        let err = Config::parse(&bad_evolution).unwrap_err();
        assert!(err.to_string().contains("evolution.mu"));

        let missing_section = DEFAULT.replace("[seed]\nuse_external = false\nvalue = 0\n", "");
        assert!(Config::parse(&missing_section).is_err());
    }

    #[test]
    fn test_external_seed() {
        let seed = SeedConfig {
            use_external: true,
            value: Some(1234),
        };
        assert_eq!(seed.resolve(), 1234);
    }

    #[test]
    fn test_seed_value_is_required_only_when_external() {
        let entropy = DEFAULT.replace(
            "[seed]\nuse_external = false\nvalue = 0\n",
            "[seed]\nuse_external = false\n",
        );
        let config = Config::parse(&entropy).unwrap();
        assert_eq!(config.seed.value, None);

        let missing = DEFAULT.replace(
            "[seed]\nuse_external = false\nvalue = 0\n",
            "[seed]\nuse_external = true\n",
        );
        let err = Config::parse(&missing).unwrap_err();
        assert!(err.to_string().contains("seed.value is required"));

        let external = DEFAULT.replace("use_external = false", "use_external = true");
        let config = Config::parse(&external).unwrap();
        assert_eq!(config.seed.resolve(), 0);
    }
}
