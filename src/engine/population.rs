//! Population store: one generation of candidate patterns.

use crate::engine::breeder::PatternRng;
use crate::error::{BreedError, EvolutionError};

/// A candidate pattern plus its cached fitness.
///
/// Patterns are immutable once created, so the cache is filled at most
/// once; breeding produces fresh individuals with an empty cache.
#[derive(Debug, Clone)]
pub struct Individual {
    pattern: Vec<u8>,
    fitness: Option<f64>,
}

impl Individual {
    /// Wrap a pattern with no fitness computed yet.
    pub fn new(pattern: Vec<u8>) -> Self {
        Self {
            pattern,
            fitness: None,
        }
    }

    /// The candidate pattern.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Cached fitness, or 0.0 when not yet evaluated.
    pub fn fitness(&self) -> f64 {
        self.fitness.unwrap_or(0.0)
    }

    /// Raw cache contents.
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Record the evaluated fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }
}

/// One generation's worth of individuals.
///
/// All individuals share the seed pattern's length, and the size stays
/// constant across generations of a run.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
    pattern_len: usize,
}

impl Population {
    /// Create the initial population from a seed pattern.
    ///
    /// Slot 0 is an exact copy of the seed; the remaining slots are
    /// independently mutated copies, keeping the initial population
    /// correlated with the seed rather than uniform noise.
    pub fn seed(
        pattern: &[u8],
        size: usize,
        mutation_rate: f64,
        rng: &mut PatternRng,
    ) -> Result<Self, EvolutionError> {
        if pattern.is_empty() {
            return Err(EvolutionError::NoInitialPattern);
        }
        if size == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }

        let mut individuals = Vec::with_capacity(size);
        individuals.push(Individual::new(pattern.to_vec()));
        for _ in 1..size {
            individuals.push(Individual::new(rng.mutate(pattern, mutation_rate)));
        }

        Ok(Self {
            individuals,
            pattern_len: pattern.len(),
        })
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population holds no individuals.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Shared pattern length for this run.
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    /// Individual at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    /// Iterate over individuals.
    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.individuals.iter()
    }

    /// Mutable view over individuals, for fitness evaluation.
    pub fn as_mut_slice(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Highest-fitness individual by cached fitness; ties resolve to the
    /// first seen. `None` only for an empty population.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().fold(None, |best, candidate| {
            match best {
                Some(b) if candidate.fitness() > b.fitness() => Some(candidate),
                Some(b) => Some(b),
                None => Some(candidate),
            }
        })
    }

    /// Atomically swap in the next generation.
    ///
    /// The replacement is checked before anything is committed, so a
    /// failed breed step never leaves a partial generation behind.
    pub fn replace(&mut self, next: Vec<Individual>) -> Result<(), BreedError> {
        if next.is_empty() {
            return Err(BreedError::EmptyPopulation);
        }
        if next.len() != self.individuals.len() {
            return Err(BreedError::PopulationSizeChanged {
                expected: self.individuals.len(),
                got: next.len(),
            });
        }
        if let Some(bad) = next.iter().find(|ind| ind.pattern().len() != self.pattern_len) {
            return Err(BreedError::InvalidPatternLength {
                left: self.pattern_len,
                right: bad.pattern().len(),
            });
        }

        self.individuals = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_population() {
        let mut rng = PatternRng::new(42);
        let pop = Population::seed(b"test pattern", 10, 0.1, &mut rng).unwrap();

        assert_eq!(pop.len(), 10);
        assert_eq!(pop.pattern_len(), 12);
        // Slot 0 is the elitism anchor: an exact copy of the seed.
        assert_eq!(pop.get(0).unwrap().pattern(), b"test pattern");
        for ind in pop.iter() {
            assert_eq!(ind.pattern().len(), 12);
        }
    }

    #[test]
    fn test_seed_rejects_empty_pattern() {
        let mut rng = PatternRng::new(42);
        assert!(matches!(
            Population::seed(b"", 10, 0.1, &mut rng),
            Err(EvolutionError::NoInitialPattern)
        ));
    }

    #[test]
    fn test_seed_rejects_zero_size() {
        let mut rng = PatternRng::new(42);
        assert!(matches!(
            Population::seed(b"seed", 0, 0.1, &mut rng),
            Err(EvolutionError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_best_prefers_first_on_tie() {
        let mut rng = PatternRng::new(42);
        let mut pop = Population::seed(b"abcd", 3, 0.0, &mut rng).unwrap();
        for ind in pop.as_mut_slice() {
            ind.set_fitness(0.5);
        }
        let best = pop.best().unwrap();
        assert!(std::ptr::eq(best, pop.get(0).unwrap()));
    }

    #[test]
    fn test_best_picks_highest_fitness() {
        let mut rng = PatternRng::new(42);
        let mut pop = Population::seed(b"abcd", 3, 0.5, &mut rng).unwrap();
        pop.as_mut_slice()[0].set_fitness(0.2);
        pop.as_mut_slice()[1].set_fitness(0.9);
        pop.as_mut_slice()[2].set_fitness(0.4);
        assert_eq!(pop.best().unwrap().fitness(), 0.9);
    }

    #[test]
    fn test_replace_rejects_size_change() {
        let mut rng = PatternRng::new(42);
        let mut pop = Population::seed(b"abcd", 3, 0.1, &mut rng).unwrap();
        let next = vec![Individual::new(b"abcd".to_vec())];
        assert!(matches!(
            pop.replace(next),
            Err(BreedError::PopulationSizeChanged { expected: 3, got: 1 })
        ));
        // Nothing committed.
        assert_eq!(pop.len(), 3);
    }

    #[test]
    fn test_replace_rejects_length_mismatch() {
        let mut rng = PatternRng::new(42);
        let mut pop = Population::seed(b"abcd", 2, 0.1, &mut rng).unwrap();
        let next = vec![
            Individual::new(b"abcd".to_vec()),
            Individual::new(b"abcde".to_vec()),
        ];
        assert!(matches!(
            pop.replace(next),
            Err(BreedError::InvalidPatternLength { left: 4, right: 5 })
        ));
    }
}
