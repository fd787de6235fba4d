//! Parent and survival selection.
//!
//! Selection works on fitness slices and returns indices into them, so the
//! same code serves the population (parent selection) and the survival pool.
//!
//! # Parent Selection (with replacement)
//!
//! - **Fitness proportional** - roulette wheel weighted by fitness
//! - **Over-selection** - roulette wheel within a fitness-ranked top group or
//!   the remainder
//!
//! Negative fitness counts as zero weight. When every weight in a group is
//! zero the draw is uniform.
//!
//! # Survival Selection (without replacement)
//!
//! - **Truncation** - stable sort by fitness, descending, keep the first `mu`
//! - **k-tournament** - sample `k` of the remaining pool, keep the fittest
//!   (the first drawn on ties), repeat until `mu` are kept

use rand::{
    Rng,
    distr::{Distribution as _, weighted::WeightedIndex},
    seq::index,
};

use crate::config::{ParentSelection, SurvivalSelection};

impl ParentSelection {
    /// Draws `count` parent indices.
    pub fn select<R>(&self, fitness: &[f64], count: usize, rng: &mut R) -> Vec<usize>
    where
        R: Rng + ?Sized,
    {
        match *self {
            Self::FitnessProportional => fitness_proportional(fitness, count, rng),
            Self::OverSelection {
                top_fraction,
                top_share,
            } => over_selection(fitness, count, top_fraction, top_share, rng),
        }
    }
}

impl SurvivalSelection {
    /// Picks `mu` distinct survivor indices, best first for truncation and in
    /// tournament order otherwise.
    pub fn select<R>(&self, fitness: &[f64], mu: usize, rng: &mut R) -> Vec<usize>
    where
        R: Rng + ?Sized,
    {
        match *self {
            Self::Truncation => truncation(fitness, mu),
            Self::KTournament { k } => k_tournament(fitness, mu, k, rng),
        }
    }
}

/// Roulette wheel over a fixed set of candidates.
#[derive(Debug)]
struct Roulette {
    candidates: Vec<usize>,
    weights: Option<WeightedIndex<f64>>,
}

impl Roulette {
    fn new(fitness: &[f64], candidates: Vec<usize>) -> Self {
        assert!(!candidates.is_empty(), "cannot select from an empty pool");
        // fails when every weight is zero, leaving a uniform draw
        let weights = WeightedIndex::new(candidates.iter().map(|&i| fitness[i].max(0.0))).ok();
        Self {
            candidates,
            weights,
        }
    }

    fn spin<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let slot = match &self.weights {
            Some(weights) => weights.sample(rng),
            None => rng.random_range(0..self.candidates.len()),
        };
        self.candidates[slot]
    }
}

pub fn fitness_proportional<R>(fitness: &[f64], count: usize, rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let roulette = Roulette::new(fitness, (0..fitness.len()).collect());
    (0..count).map(|_| roulette.spin(rng)).collect()
}

pub fn over_selection<R>(
    fitness: &[f64],
    count: usize,
    top_fraction: f64,
    top_share: f64,
    rng: &mut R,
) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let ranked = ranked(fitness);
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let top_len = ((ranked.len() as f64 * top_fraction).ceil() as usize).clamp(1, ranked.len());
    let (top, rest) = ranked.split_at(top_len);

    let top = Roulette::new(fitness, top.to_vec());
    if rest.is_empty() {
        return (0..count).map(|_| top.spin(rng)).collect();
    }
    let rest = Roulette::new(fitness, rest.to_vec());
    (0..count)
        .map(|_| {
            if rng.random_bool(top_share) {
                top.spin(rng)
            } else {
                rest.spin(rng)
            }
        })
        .collect()
}

#[must_use]
pub fn truncation(fitness: &[f64], mu: usize) -> Vec<usize> {
    let mut survivors = ranked(fitness);
    survivors.truncate(mu);
    survivors
}

pub fn k_tournament<R>(fitness: &[f64], mu: usize, k: usize, rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    assert!(k > 0, "tournament size must be positive");
    let mut remaining = (0..fitness.len()).collect::<Vec<_>>();
    let mut survivors = Vec::with_capacity(mu);
    while survivors.len() < mu && !remaining.is_empty() {
        let size = k.min(remaining.len());
        let winner = index::sample(rng, remaining.len(), size)
            .into_iter()
            .reduce(|best, pos| {
                if fitness[remaining[pos]] > fitness[remaining[best]] {
                    pos
                } else {
                    best
                }
            });
        if let Some(pos) = winner {
            survivors.push(remaining.remove(pos));
        }
    }
    survivors
}

/// Indices sorted by fitness, descending; equal fitness keeps index order.
fn ranked(fitness: &[f64]) -> Vec<usize> {
    let mut order = (0..fitness.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
    order
}
