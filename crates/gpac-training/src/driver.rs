//! The evolutionary loop.
//!
//! # Run Cycle
//!
//! ```text
//! initialize (mu individuals)
//!     ↓
//! evaluate ──→ terminated? ──→ end of run
//!     ↑            ↓ no
//!     │        select parents (parent_count, with replacement)
//!     │            ↓
//!     │        recombine (lambda children, subtree crossover)
//!     │            ↓
//!     │        mutate (per child, mutation_probability)
//!     │            ↓
//!     └─────── evaluate children, select survivors (mu)
//! ```
//!
//! A run ends once its fitness evaluation budget is used up. The budget is
//! checked between generations, so the last generation may finish up to
//! `lambda - 1` evaluations past it.
//!
//! # Randomness
//!
//! One [`Pcg32`] seeded at construction drives every decision of every run.
//! Before a batch of individuals is evaluated, one seed per individual is
//! drawn from it; each playout then runs on its own thread with its own
//! stream, so results do not depend on thread scheduling.
//!
//! # Example
//!
//! ```
//! use gpac_engine::GpacWorldConfig;
//! use gpac_training::{
//!     config::{EvolutionConfig, ParentSelection, SurvivalSelection, SurvivalStrategy},
//!     driver::GpDriver,
//!     observer::NoopObserver,
//! };
//!
//! let config = EvolutionConfig {
//!     mu: 6,
//!     lambda: 4,
//!     parent_count: 4,
//!     generation_min_height: 2,
//!     generation_max_height: 4,
//!     mutation_min_height: 1,
//!     mutation_max_height: 3,
//!     premature_end_probability: 0.5,
//!     mutation_probability: 0.3,
//!     max_constant: 5.0,
//!     fitness_evaluations: 20,
//!     runs: 2,
//!     parent_selection: ParentSelection::FitnessProportional,
//!     survival_strategy: SurvivalStrategy::Plus,
//!     survival_selection: SurvivalSelection::Truncation,
//! };
//! let world_config = GpacWorldConfig {
//!     width: 6,
//!     height: 6,
//!     pill_density: 0.5,
//!     wall_density: 0.1,
//!     fruit_spawn_probability: 0.05,
//!     fruit_score: 10,
//!     time_multiplier: 2,
//!     pacmen: 1,
//!     ghosts: 2,
//! };
//!
//! let mut driver = GpDriver::new(config, world_config, 42);
//! let outcome = driver.train(&mut NoopObserver);
//! assert!(outcome.best_fitness >= 0.0);
//! ```

use std::thread;

use gpac_engine::GpacWorldConfig;
use gpac_evaluator::{
    controller::{ControllerConfig, PacmanController},
    tree::ExpressionTree,
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    config::{EvolutionConfig, SurvivalStrategy},
    individual::Individual,
    observer::RunObserver,
    stats::{FitnessSummary, GenerationSummary},
};

/// Result of one run: its best individual.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run: u32,
    /// Best individual evaluated during the run (it may not have survived).
    pub best: Individual,
    pub best_fitness: f64,
    pub eval_count: usize,
    pub generations: u32,
}

#[derive(Debug)]
pub struct GpDriver {
    config: EvolutionConfig,
    world_config: GpacWorldConfig,
    controller_config: ControllerConfig,
    rng: Pcg32,
}

impl GpDriver {
    /// Creates a driver whose whole training is determined by `seed`.
    ///
    /// Both configs are expected to have passed validation.
    #[must_use]
    pub fn new(config: EvolutionConfig, world_config: GpacWorldConfig, seed: u64) -> Self {
        let controller_config = config.controller_config();
        Self {
            config,
            world_config,
            controller_config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Performs every configured run (at least one) and returns the best.
    ///
    /// Runs share the random stream; a later run replaces the best only with
    /// strictly higher fitness.
    pub fn train<O>(&mut self, observer: &mut O) -> RunOutcome
    where
        O: RunObserver + ?Sized,
    {
        let mut best = self.run(1, observer);
        for run in 2..=self.config.runs {
            let outcome = self.run(run, observer);
            if outcome.best_fitness > best.best_fitness {
                best = outcome;
            }
        }
        best
    }

    /// Performs one run until the evaluation budget is exhausted.
    pub fn run<O>(&mut self, run: u32, observer: &mut O) -> RunOutcome
    where
        O: RunObserver + ?Sized,
    {
        log::info!("run {run} started");
        observer.run_started(run);
        let mut tracker = RunTracker::default();

        let mut population = self.initialize_population();
        let evaluated = self.evaluate_population(&mut population);
        tracker.record(&population, &evaluated, observer);

        let mut generation = 0;
        loop {
            if let Some(summary) = tracker.summarize(run, generation, &population) {
                log::info!(
                    "run {run} gen {generation}: evals={} min={:.1} mean={:.2} max={:.1} best={:.1}",
                    summary.eval_count,
                    summary.fitness.min,
                    summary.fitness.mean,
                    summary.fitness.max,
                    summary.best_fitness,
                );
                observer.generation_finished(&summary);
            }

            if self.is_terminated(tracker.eval_count) {
                break;
            }
            generation += 1;

            let parents = self.select_parents(&population);
            let mut children = self.recombine(&parents);
            self.mutate(&mut children);
            let evaluated = self.evaluate_population(&mut children);
            tracker.record(&children, &evaluated, observer);
            population = self.select_survivors(population, children);
        }

        let (best_fitness, best) = tracker.best.expect("the initial population is evaluated");
        log::info!(
            "run {run} finished after {} evaluations, best fitness {best_fitness}",
            tracker.eval_count
        );
        RunOutcome {
            run,
            best,
            best_fitness,
            eval_count: tracker.eval_count,
            generations: generation,
        }
    }

    /// Creates `mu` individuals, each with a fresh world and a freshly grown
    /// controller.
    pub fn initialize_population(&mut self) -> Vec<Individual> {
        (0..self.config.mu)
            .map(|_| {
                let world = self.world_config.build(&mut self.rng);
                let controller = PacmanController::random(self.controller_config, &mut self.rng);
                Individual::new(world, controller)
            })
            .collect()
    }

    /// Plays a game for every individual without fitness, in parallel.
    ///
    /// Returns the indices of the evaluated individuals, in order.
    pub fn evaluate_population(&mut self, individuals: &mut [Individual]) -> Vec<usize> {
        let pending = individuals
            .iter()
            .enumerate()
            .filter_map(|(i, individual)| individual.fitness().is_none().then_some(i))
            .collect::<Vec<_>>();
        let seeds = pending
            .iter()
            .map(|_| self.rng.random::<u64>())
            .collect::<Vec<_>>();

        thread::scope(|s| {
            let unevaluated = individuals
                .iter_mut()
                .filter(|individual| individual.fitness().is_none());
            for (individual, seed) in unevaluated.zip(seeds) {
                s.spawn(move || {
                    individual.evaluate(seed);
                });
            }
        });

        pending
    }

    /// Draws the parent pool from an evaluated population.
    pub fn select_parents<'p>(&mut self, population: &'p [Individual]) -> Vec<&'p Individual> {
        let fitness = fitness_of(population);
        self.config
            .parent_selection
            .select(&fitness, self.config.parent_count, &mut self.rng)
            .into_iter()
            .map(|i| &population[i])
            .collect()
    }

    /// Breeds `lambda` children by subtree crossover.
    ///
    /// Both parents of a child are drawn uniformly from the pool with
    /// replacement, so a parent may be crossed with itself. Every child plays
    /// in a freshly generated world.
    ///
    /// # Panics
    ///
    /// Panics if `parents` is empty.
    pub fn recombine(&mut self, parents: &[&Individual]) -> Vec<Individual> {
        assert!(
            !parents.is_empty(),
            "recombination needs a non-empty parent pool"
        );
        (0..self.config.lambda)
            .map(|_| {
                let a = parents[self.rng.random_range(0..parents.len())];
                let b = parents[self.rng.random_range(0..parents.len())];
                let tree = subtree_crossover(
                    a.pacman_controller().state_evaluator(),
                    b.pacman_controller().state_evaluator(),
                    &mut self.rng,
                );
                let world = self.world_config.build(&mut self.rng);
                Individual::new(
                    world,
                    PacmanController::from_tree(self.controller_config, tree),
                )
            })
            .collect()
    }

    /// Mutates each child with the configured probability.
    pub fn mutate(&mut self, children: &mut [Individual]) {
        for child in children {
            if self.rng.random_bool(self.config.mutation_probability) {
                child.mutate(&mut self.rng);
            }
        }
    }

    /// Chooses the next population from the survival pool.
    ///
    /// The pool is `children` for comma survival and `population` followed by
    /// `children` for plus survival.
    ///
    /// # Panics
    ///
    /// Panics if the survival pool is empty.
    pub fn select_survivors(
        &mut self,
        population: Vec<Individual>,
        children: Vec<Individual>,
    ) -> Vec<Individual> {
        let pool = match self.config.survival_strategy {
            SurvivalStrategy::Comma => children,
            SurvivalStrategy::Plus => {
                let mut pool = population;
                pool.extend(children);
                pool
            }
        };
        assert!(!pool.is_empty(), "survival pool is empty");

        let fitness = fitness_of(&pool);
        let survivors =
            self.config
                .survival_selection
                .select(&fitness, self.config.mu, &mut self.rng);
        let mut slots = pool.into_iter().map(Some).collect::<Vec<_>>();
        survivors
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }

    #[must_use]
    pub fn is_terminated(&self, eval_count: usize) -> bool {
        eval_count >= self.config.fitness_evaluations
    }
}

/// Copies a random subtree of `b` over a random node of a copy of `a`.
///
/// Crossover points are uniform over the breadth-first node lists. The child
/// owns all of its nodes; neither parent is modified.
pub fn subtree_crossover<R>(a: &ExpressionTree, b: &ExpressionTree, rng: &mut R) -> ExpressionTree
where
    R: Rng + ?Sized,
{
    let mut child = a.clone();
    let a_point = rng.random_range(0..a.size());
    let b_point = rng.random_range(0..b.size());
    if let Some(donor) = b.subtree(b_point) {
        child.replace_subtree(a_point, donor);
    }
    child
}

fn fitness_of(individuals: &[Individual]) -> Vec<f64> {
    individuals
        .iter()
        .map(|individual| individual.fitness().unwrap_or(f64::NEG_INFINITY))
        .collect()
}

/// Per-run counters.
#[derive(Debug, Default)]
struct RunTracker {
    eval_count: usize,
    best: Option<(f64, Individual)>,
}

impl RunTracker {
    fn record<O>(&mut self, individuals: &[Individual], evaluated: &[usize], observer: &mut O)
    where
        O: RunObserver + ?Sized,
    {
        for &i in evaluated {
            let individual = &individuals[i];
            let Some(fitness) = individual.fitness() else {
                continue;
            };
            self.eval_count += 1;
            if self.best.as_ref().is_none_or(|(best, _)| fitness > *best) {
                log::debug!("eval {}: new best fitness {fitness}", self.eval_count);
                observer.improved(self.eval_count, fitness);
                self.best = Some((fitness, individual.clone()));
            }
        }
    }

    fn summarize(
        &self,
        run: u32,
        generation: u32,
        population: &[Individual],
    ) -> Option<GenerationSummary> {
        let (best_fitness, _) = self.best.as_ref()?;
        let fitness = FitnessSummary::new(population.iter().filter_map(Individual::fitness))?;
        Some(GenerationSummary {
            run,
            generation,
            eval_count: self.eval_count,
            fitness,
            best_fitness: *best_fitness,
        })
    }
}

#[cfg(test)]
mod tests {
    use gpac_evaluator::{
        node::{FunctionKind, Operand},
        tree::Node,
    };

    use super::*;
    use crate::config::{ParentSelection, SurvivalSelection};

    fn evolution_config() -> EvolutionConfig {
        EvolutionConfig {
            mu: 4,
            lambda: 4,
            parent_count: 4,
            generation_min_height: 3,
            generation_max_height: 3,
            mutation_min_height: 1,
            mutation_max_height: 2,
            premature_end_probability: 0.0,
            mutation_probability: 0.5,
            max_constant: 5.0,
            fitness_evaluations: 12,
            runs: 1,
            parent_selection: ParentSelection::FitnessProportional,
            survival_strategy: SurvivalStrategy::Plus,
            survival_selection: SurvivalSelection::Truncation,
        }
    }

    fn world_config() -> GpacWorldConfig {
        GpacWorldConfig {
            width: 6,
            height: 5,
            pill_density: 0.5,
            wall_density: 0.1,
            fruit_spawn_probability: 0.05,
            fruit_score: 10,
            time_multiplier: 2,
            pacmen: 1,
            ghosts: 2,
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        runs: Vec<u32>,
        improvements: Vec<(usize, f64)>,
        generations: Vec<GenerationSummary>,
    }

    impl RunObserver for Recorder {
        fn run_started(&mut self, run: u32) {
            self.runs.push(run);
        }

        fn improved(&mut self, eval_count: usize, best_fitness: f64) {
            self.improvements.push((eval_count, best_fitness));
        }

        fn generation_finished(&mut self, summary: &GenerationSummary) {
            self.generations.push(*summary);
        }
    }

    fn constant(value: f64) -> Node {
        Node::Leaf(Operand::Constant(value))
    }

    #[test]
    fn test_single_generation_scenario() {
        let mut driver = GpDriver::new(evolution_config(), world_config(), 2024);

        let mut population = driver.initialize_population();
        assert_eq!(population.len(), 4);
        for individual in &population {
            let tree = individual.pacman_controller().state_evaluator();
            assert_eq!(tree.height(), 3);
            assert!(tree.node_depths().iter().all(|&d| d <= 3));
        }

        let evaluated = driver.evaluate_population(&mut population);
        assert_eq!(evaluated, vec![0, 1, 2, 3]);
        for individual in &population {
            assert!(individual.fitness().unwrap().is_finite());
        }

        let survivors = driver.select_survivors(population, Vec::new());
        assert_eq!(survivors.len(), 4);
        assert!(
            survivors
                .is_sorted_by(|a, b| a.fitness().unwrap() >= b.fitness().unwrap())
        );
    }

    #[test]
    fn test_evaluation_skips_evaluated_individuals() {
        let mut driver = GpDriver::new(evolution_config(), world_config(), 1);
        let mut population = driver.initialize_population();
        driver.evaluate_population(&mut population);
        let before = population.iter().map(Individual::fitness).collect::<Vec<_>>();
        assert!(driver.evaluate_population(&mut population).is_empty());
        let after = population.iter().map(Individual::fitness).collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn test_crossover_child_is_independent_of_parents() {
        let mut rng = Pcg32::seed_from_u64(3);
        let a = ExpressionTree::new(Node::Branch {
            function: FunctionKind::Add,
            children: Box::new([constant(1.0), constant(2.0)]),
        });
        let b = ExpressionTree::new(Node::Branch {
            function: FunctionKind::Multiply,
            children: Box::new([constant(3.0), constant(4.0)]),
        });
        let (a_before, b_before) = (a.clone(), b.clone());

        for _ in 0..20 {
            let mut child = subtree_crossover(&a, &b, &mut rng);
            for index in 0..child.size() {
                child.replace_subtree(index, constant(-1.0));
            }
            assert_eq!(a, a_before);
            assert_eq!(b, b_before);
        }
    }

    #[test]
    fn test_crossover_takes_material_from_both_parents() {
        let mut rng = Pcg32::seed_from_u64(4);
        let a = ExpressionTree::new(Node::Branch {
            function: FunctionKind::Add,
            children: Box::new([constant(1.0), constant(1.0)]),
        });
        let b = ExpressionTree::new(constant(2.0));
        let children = (0..50)
            .map(|_| subtree_crossover(&a, &b, &mut rng))
            .collect::<Vec<_>>();
        // replacing the root yields b, replacing a leaf keeps a's root
        assert!(children.iter().any(|c| *c == b));
        assert!(
            children
                .iter()
                .any(|c| c.root().is_branch() && c.to_string().contains('2'))
        );
    }

    #[test]
    #[should_panic(expected = "non-empty parent pool")]
    fn test_recombine_empty_parent_pool_panics() {
        let mut driver = GpDriver::new(evolution_config(), world_config(), 5);
        driver.recombine(&[]);
    }

    #[test]
    fn test_recombine_and_mutate_produce_unevaluated_children() {
        let mut driver = GpDriver::new(evolution_config(), world_config(), 6);
        let mut population = driver.initialize_population();
        driver.evaluate_population(&mut population);
        let parents = driver.select_parents(&population);
        assert_eq!(parents.len(), 4);
        let mut children = driver.recombine(&parents);
        driver.mutate(&mut children);
        assert_eq!(children.len(), 4);
        assert!(children.iter().all(|c| c.fitness().is_none()));
    }

    #[test]
    fn test_comma_survival_keeps_only_children() {
        let config = EvolutionConfig {
            survival_strategy: SurvivalStrategy::Comma,
            lambda: 6,
            ..evolution_config()
        };
        let mut driver = GpDriver::new(config, world_config(), 7);
        let mut population = driver.initialize_population();
        driver.evaluate_population(&mut population);
        let parents = driver.select_parents(&population);
        let mut children = driver.recombine(&parents);
        driver.evaluate_population(&mut children);
        let child_fitness = children.iter().map(Individual::fitness).collect::<Vec<_>>();

        let survivors = driver.select_survivors(population, children);
        assert_eq!(survivors.len(), 4);
        assert!(survivors.iter().all(|s| child_fitness.contains(&s.fitness())));
    }

    #[test]
    fn test_run_respects_budget_and_reports_progress() {
        let mut driver = GpDriver::new(evolution_config(), world_config(), 8);
        let mut recorder = Recorder::default();
        let outcome = driver.run(1, &mut recorder);

        assert_eq!(recorder.runs, vec![1]);
        // 4 initial evaluations, then 4 per generation
        assert_eq!(outcome.eval_count, 12);
        assert_eq!(outcome.generations, 2);
        assert_eq!(recorder.generations.len(), 3);
        assert_eq!(recorder.improvements.first().map(|i| i.0), Some(1));
        assert!(
            recorder
                .improvements
                .windows(2)
                .all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1)
        );
        assert_eq!(
            recorder.improvements.last().map(|i| i.1),
            Some(outcome.best_fitness)
        );
        assert_eq!(outcome.best.fitness(), Some(outcome.best_fitness));
        for summary in &recorder.generations {
            assert!(summary.fitness.max <= summary.best_fitness);
        }
    }

    #[test]
    fn test_training_is_reproducible() {
        let config = EvolutionConfig {
            runs: 2,
            ..evolution_config()
        };
        let mut a = GpDriver::new(config.clone(), world_config(), 9);
        let mut b = GpDriver::new(config, world_config(), 9);
        let mut recorder_a = Recorder::default();
        let mut recorder_b = Recorder::default();
        let outcome_a = a.train(&mut recorder_a);
        let outcome_b = b.train(&mut recorder_b);

        assert_eq!(recorder_a.runs, vec![1, 2]);
        assert_eq!(recorder_a.improvements, recorder_b.improvements);
        assert_eq!(outcome_a.best_fitness, outcome_b.best_fitness);
        assert_eq!(
            outcome_a.best.pacman_controller(),
            outcome_b.best.pacman_controller()
        );
    }
}
