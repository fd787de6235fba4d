//! Evolutionary parameters.
//!
//! Parsed from the `[evolution]` table of the run configuration. Every key is
//! required; [`EvolutionConfig::validate`] rejects values the driver cannot run
//! with before any individual is created.

use gpac_evaluator::controller::ControllerConfig;
use serde::{Deserialize, Serialize};

/// Invalid evolutionary parameter.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("evolution.{key} must be at least {min}, got {value}")]
    TooSmall {
        key: &'static str,
        min: u64,
        value: u64,
    },
    #[display("evolution.{key} must be a probability in [0, 1], got {value}")]
    NotProbability { key: &'static str, value: f64 },
    #[display("evolution.{min_key} ({min}) must not exceed evolution.{max_key} ({max})")]
    InvertedRange {
        min_key: &'static str,
        max_key: &'static str,
        min: u32,
        max: u32,
    },
    #[display("evolution.max_constant must be finite and non-negative, got {value}")]
    InvalidConstant { value: f64 },
    #[display("comma survival needs lambda ({lambda}) to be at least mu ({mu})")]
    NotEnoughChildren { mu: usize, lambda: usize },
    #[display(
        "evolution.fitness_evaluations ({budget}) must cover the initial population (mu = {mu})"
    )]
    BudgetTooSmall { budget: usize, mu: usize },
}

/// How the parent pool is drawn from the population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum ParentSelection {
    /// Roulette wheel over the whole population, with replacement.
    FitnessProportional,
    /// Roulette wheel within one of two fitness-ranked groups: the top
    /// `top_fraction` of the population is drawn from with probability
    /// `top_share`, the rest otherwise.
    OverSelection { top_fraction: f64, top_share: f64 },
}

/// Which individuals compete for survival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurvivalStrategy {
    /// Children only.
    Comma,
    /// Parents and children.
    Plus,
}

/// How survivors are chosen from the survival pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum SurvivalSelection {
    /// Best `mu` by fitness, ties kept in pool order.
    Truncation,
    /// Repeated `k`-tournaments without replacement.
    KTournament { k: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvolutionConfig {
    /// Population size.
    pub mu: usize,
    /// Children per generation.
    pub lambda: usize,
    /// Size of the parent pool children are bred from.
    pub parent_count: usize,
    pub generation_min_height: u32,
    pub generation_max_height: u32,
    pub mutation_min_height: u32,
    pub mutation_max_height: u32,
    pub premature_end_probability: f64,
    /// Per-child chance of one subtree mutation.
    pub mutation_probability: f64,
    pub max_constant: f64,
    /// Fitness evaluations per run.
    pub fitness_evaluations: usize,
    pub runs: u32,
    pub parent_selection: ParentSelection,
    pub survival_strategy: SurvivalStrategy,
    pub survival_selection: SurvivalSelection,
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let at_least = |key, min: u64, value: u64| {
            if value < min {
                Err(ConfigError::TooSmall { key, min, value })
            } else {
                Ok(())
            }
        };
        let probability = |key, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::NotProbability { key, value })
            }
        };
        let ordered = |min_key, max_key, min, max| {
            if min > max {
                Err(ConfigError::InvertedRange {
                    min_key,
                    max_key,
                    min,
                    max,
                })
            } else {
                Ok(())
            }
        };

        at_least("mu", 1, self.mu as u64)?;
        at_least("lambda", 1, self.lambda as u64)?;
        at_least("parent_count", 1, self.parent_count as u64)?;
        at_least("runs", 1, u64::from(self.runs))?;
        // initial trees are rooted in a function node
        at_least(
            "generation_min_height",
            2,
            u64::from(self.generation_min_height),
        )?;
        at_least(
            "mutation_min_height",
            1,
            u64::from(self.mutation_min_height),
        )?;
        ordered(
            "generation_min_height",
            "generation_max_height",
            self.generation_min_height,
            self.generation_max_height,
        )?;
        ordered(
            "mutation_min_height",
            "mutation_max_height",
            self.mutation_min_height,
            self.mutation_max_height,
        )?;
        probability("premature_end_probability", self.premature_end_probability)?;
        probability("mutation_probability", self.mutation_probability)?;
        if !self.max_constant.is_finite() || self.max_constant < 0.0 {
            return Err(ConfigError::InvalidConstant {
                value: self.max_constant,
            });
        }

        if let ParentSelection::OverSelection {
            top_fraction,
            top_share,
        } = self.parent_selection
        {
            probability("parent_selection.top_fraction", top_fraction)?;
            probability("parent_selection.top_share", top_share)?;
        }
        if self.survival_strategy == SurvivalStrategy::Comma && self.lambda < self.mu {
            return Err(ConfigError::NotEnoughChildren {
                mu: self.mu,
                lambda: self.lambda,
            });
        }
        if let SurvivalSelection::KTournament { k } = self.survival_selection {
            at_least("survival_selection.k", 1, k as u64)?;
        }
        if self.fitness_evaluations < self.mu {
            return Err(ConfigError::BudgetTooSmall {
                budget: self.fitness_evaluations,
                mu: self.mu,
            });
        }
        Ok(())
    }

    /// Tree-shape parameters handed to every controller.
    #[must_use]
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            generation_min_height: self.generation_min_height,
            generation_max_height: self.generation_max_height,
            mutation_min_height: self.mutation_min_height,
            mutation_max_height: self.mutation_max_height,
            premature_end_probability: self.premature_end_probability,
            max_constant: self.max_constant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVOLUTION: &str = r#"
        mu = 20
        lambda = 10
        parent_count = 10
        generation_min_height = 2
        generation_max_height = 5
        mutation_min_height = 1
        mutation_max_height = 3
        premature_end_probability = 0.5
        mutation_probability = 0.2
        max_constant = 10.0
        fitness_evaluations = 2000
        runs = 3
        parent_selection = { over-selection = { top_fraction = 0.32, top_share = 0.8 } }
        survival_strategy = "plus"
        survival_selection = { k-tournament = { k = 4 } }
    "#;

    fn config() -> EvolutionConfig {
        toml::from_str(EVOLUTION).unwrap()
    }

    #[test]
    fn test_parse_all_strategies() {
        let c = config();
        assert_eq!(
            c.parent_selection,
            ParentSelection::OverSelection {
                top_fraction: 0.32,
                top_share: 0.8
            }
        );
        assert_eq!(c.survival_strategy, SurvivalStrategy::Plus);
        assert_eq!(c.survival_selection, SurvivalSelection::KTournament { k: 4 });
        assert!(c.validate().is_ok());

        let text = EVOLUTION
            .replace(
                "{ over-selection = { top_fraction = 0.32, top_share = 0.8 } }",
                "\"fitness-proportional\"",
            )
            .replace("{ k-tournament = { k = 4 } }", "\"truncation\"");
        let c: EvolutionConfig = toml::from_str(&text).unwrap();
        assert_eq!(c.parent_selection, ParentSelection::FitnessProportional);
        assert_eq!(c.survival_selection, SurvivalSelection::Truncation);
    }

    #[test]
    fn test_missing_or_non_numeric_keys_fail() {
        let missing = EVOLUTION.replace("lambda = 10", "");
        assert!(toml::from_str::<EvolutionConfig>(&missing).is_err());
        let non_numeric = EVOLUTION.replace("lambda = 10", "lambda = \"ten\"");
        assert!(toml::from_str::<EvolutionConfig>(&non_numeric).is_err());
        let unknown = format!("{EVOLUTION}\nelite = 2\n");
        assert!(toml::from_str::<EvolutionConfig>(&unknown).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut c = config();
        c.mu = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::TooSmall { key: "mu", .. })
        ));

        let mut c = config();
        c.generation_min_height = 1;
        c.generation_max_height = 1;
        assert_eq!(
            c.validate(),
            Err(ConfigError::TooSmall {
                key: "generation_min_height",
                min: 2,
                value: 1
            })
        );

        let mut c = config();
        c.mutation_min_height = 1;
        c.mutation_max_height = 1;
        assert!(c.validate().is_ok());

        let mut c = config();
        c.generation_min_height = 6;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvertedRange {
                min_key: "generation_min_height",
                ..
            })
        ));

        let mut c = config();
        c.mutation_probability = -0.1;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NotProbability {
                key: "mutation_probability",
                ..
            })
        ));

        let mut c = config();
        c.survival_strategy = SurvivalStrategy::Comma;
        assert_eq!(
            c.validate(),
            Err(ConfigError::NotEnoughChildren { mu: 20, lambda: 10 })
        );

        let mut c = config();
        c.survival_selection = SurvivalSelection::KTournament { k: 0 };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::TooSmall {
                key: "survival_selection.k",
                ..
            })
        ));

        let mut c = config();
        c.fitness_evaluations = 19;
        assert_eq!(
            c.validate(),
            Err(ConfigError::BudgetTooSmall { budget: 19, mu: 20 })
        );
    }

    #[test]
    fn test_controller_config() {
        let c = config().controller_config();
        assert_eq!(c.generation_max_height, 5);
        assert_eq!(c.mutation_min_height, 1);
        assert_eq!(c.max_constant, 10.0);
    }
}
