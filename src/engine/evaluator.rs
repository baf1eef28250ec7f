//! Fitness, diversity, and convergence measures.

use rayon::prelude::*;

use crate::engine::population::Population;
use crate::engine::synthesis::Synthesizer;
use crate::schema::SynthesizerConfig;

/// Scores individuals and populations.
///
/// Fitness is the synthesis confidence of a pattern; diversity and
/// convergence are population-wide measures.
pub struct FitnessEvaluator {
    synthesizer: Synthesizer,
}

impl FitnessEvaluator {
    /// Create an evaluator around a synthesizer configuration.
    pub fn new(config: SynthesizerConfig) -> Self {
        Self {
            synthesizer: Synthesizer::new(config),
        }
    }

    /// Fitness of a single pattern.
    pub fn fitness(&self, pattern: &[u8]) -> f64 {
        self.synthesizer.synthesize(pattern).confidence
    }

    /// Fill the fitness cache for every unevaluated individual.
    ///
    /// Patterns are immutable, so individuals that already carry a score
    /// (the elite slot) are skipped.
    pub fn evaluate_population(&self, population: &mut Population) {
        population.as_mut_slice().par_iter_mut().for_each(|ind| {
            if ind.cached_fitness().is_none() {
                let fitness = self.fitness(ind.pattern());
                ind.set_fitness(fitness);
            }
        });
    }
}

/// Mean pairwise normalized Hamming distance across the population.
///
/// Distance counts differing bytes position-wise; the result is always in
/// [0, 1] and 0.0 for populations smaller than 2.
pub fn diversity(population: &Population) -> f64 {
    if population.len() < 2 || population.pattern_len() == 0 {
        return 0.0;
    }

    let patterns: Vec<&[u8]> = population.iter().map(|ind| ind.pattern()).collect();
    let len = population.pattern_len() as f64;
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..patterns.len() {
        for j in (i + 1)..patterns.len() {
            total += hamming_distance(patterns[i], patterns[j]) as f64 / len;
            pairs += 1;
        }
    }
    (total / pairs as f64).clamp(0.0, 1.0)
}

/// How close the best fitness is to the target: `best / max(target, best)`
/// for positive best fitness, else 0. Reaches 1.0 exactly when the target
/// is met.
pub fn convergence(best_fitness: f64, min_fitness: f64) -> f64 {
    if best_fitness <= 0.0 {
        return 0.0;
    }
    (best_fitness / min_fitness.max(best_fitness)).clamp(0.0, 1.0)
}

/// Number of byte positions that differ, up to the shorter length.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}
