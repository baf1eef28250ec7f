//! Breeding operators: tournament selection, single-point crossover, and
//! bit-flip mutation.
//!
//! All operators draw randomness from a single seeded generator threaded
//! through the run, so identical inputs produce identical runs.

use rand::prelude::*;

use crate::engine::population::{Individual, Population};
use crate::error::BreedError;
use crate::schema::EvolutionConfig;

/// Seeded random number generator driving all breeding operators.
pub struct PatternRng {
    rng: StdRng,
}

impl PatternRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with a random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Tournament selection: draw `tournament_size` individuals uniformly
    /// at random (with replacement) and return the fittest, first seen
    /// winning ties.
    pub fn select<'a>(
        &mut self,
        population: &'a Population,
        tournament_size: usize,
    ) -> Result<&'a Individual, BreedError> {
        if tournament_size == 0 || population.is_empty() {
            return Err(BreedError::SelectionFailed);
        }

        let mut winner: Option<&Individual> = None;
        for _ in 0..tournament_size {
            let idx = self.rng.gen_range(0..population.len());
            let candidate = population.get(idx).ok_or(BreedError::SelectionFailed)?;
            winner = match winner {
                Some(current) if candidate.fitness() > current.fitness() => Some(candidate),
                Some(current) => Some(current),
                None => Some(candidate),
            };
        }
        winner.ok_or(BreedError::SelectionFailed)
    }

    /// Single-point crossover at a uniformly chosen point in `[0, L)`.
    pub fn crossover(&mut self, parent1: &[u8], parent2: &[u8]) -> Result<Vec<u8>, BreedError> {
        if parent1.len() != parent2.len() {
            return Err(BreedError::InvalidPatternLength {
                left: parent1.len(),
                right: parent2.len(),
            });
        }
        if parent1.is_empty() {
            return Ok(Vec::new());
        }

        let point = self.rng.gen_range(0..parent1.len());
        Ok(crossover_at(parent1, parent2, point))
    }

    /// Bit-flip mutation: each byte independently has one uniformly chosen
    /// bit flipped with probability `mutation_rate`. Length-preserving.
    pub fn mutate(&mut self, pattern: &[u8], mutation_rate: f64) -> Vec<u8> {
        pattern
            .iter()
            .map(|&byte| {
                if self.rng.r#gen::<f64>() < mutation_rate {
                    byte ^ (1u8 << self.rng.gen_range(0..8))
                } else {
                    byte
                }
            })
            .collect()
    }

    /// Produce the next generation from the current one.
    ///
    /// Slot 0 preserves a copy of the current best individual when elitism
    /// is enabled; every other slot is a mutated child of two tournament
    /// winners, crossed over with probability `crossover_rate`.
    pub fn breed(
        &mut self,
        population: &Population,
        config: &EvolutionConfig,
    ) -> Result<Vec<Individual>, BreedError> {
        if population.is_empty() {
            return Err(BreedError::EmptyPopulation);
        }

        let mut next = Vec::with_capacity(population.len());
        if config.elitism {
            // The clone keeps its cached fitness, so the elite slot is
            // never re-evaluated.
            let best = population.best().ok_or(BreedError::EmptyPopulation)?;
            next.push(best.clone());
        }

        while next.len() < population.len() {
            let parent1 = self.select(population, config.tournament_size)?;
            let parent2 = self.select(population, config.tournament_size)?;

            let child = if self.rng.r#gen::<f64>() < config.crossover_rate {
                self.crossover(parent1.pattern(), parent2.pattern())?
            } else {
                parent1.pattern().to_vec()
            };

            next.push(Individual::new(self.mutate(&child, config.mutation_rate)));
        }

        Ok(next)
    }
}

/// Child pattern `parent1[..point] ++ parent2[point..]`.
///
/// Callers must pass equal-length parents and `point < L`.
pub fn crossover_at(parent1: &[u8], parent2: &[u8], point: usize) -> Vec<u8> {
    let mut child = Vec::with_capacity(parent1.len());
    child.extend_from_slice(&parent1[..point]);
    child.extend_from_slice(&parent2[point..]);
    child
}
