//! Run configuration for the evolution engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EvolutionError;

/// Top-level configuration for one evolution run.
///
/// Supplied once at run start and immutable for the run's duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of individuals per generation. Constant across the run.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Per-byte probability of flipping one bit during mutation (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Probability that a child is produced by crossover rather than
    /// cloning its first parent (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Hard generation limit for the run.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Target fitness; the run converges once best fitness reaches it.
    #[serde(default = "default_min_fitness")]
    pub min_fitness: f64,
    /// Preserve the best individual unchanged into the next generation.
    #[serde(default = "default_elitism")]
    pub elitism: bool,
    /// Number of candidates drawn per tournament selection.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Feature synthesis settings used for fitness evaluation.
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,
    /// Random seed for reproducibility. `None` draws from entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            max_generations: default_max_generations(),
            min_fitness: default_min_fitness(),
            elitism: default_elitism(),
            tournament_size: default_tournament_size(),
            synthesizer: SynthesizerConfig::default(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    32
}
fn default_mutation_rate() -> f64 {
    0.05
}
fn default_crossover_rate() -> f64 {
    0.8
}
fn default_max_generations() -> usize {
    100
}
fn default_min_fitness() -> f64 {
    0.95
}
fn default_elitism() -> bool {
    true
}
fn default_tournament_size() -> usize {
    3
}

impl EvolutionConfig {
    /// Validate the configuration before a run starts.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        if self.population_size == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }
        if self.population_size < 2 {
            return Err(EvolutionError::InvalidConfig(
                "population size must be at least 2".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvolutionError::InvalidConfig(format!(
                "mutation rate {} outside [0, 1]",
                self.mutation_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(EvolutionError::InvalidConfig(format!(
                "crossover rate {} outside [0, 1]",
                self.crossover_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.min_fitness) {
            return Err(EvolutionError::InvalidConfig(format!(
                "min fitness {} outside [0, 1]",
                self.min_fitness
            )));
        }
        if self.max_generations == 0 {
            return Err(EvolutionError::InvalidConfig(
                "max generations must be non-zero".into(),
            ));
        }
        if self.synthesizer.feature_count == 0 {
            return Err(EvolutionError::InvalidConfig(
                "feature count must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Feature synthesis settings.
///
/// Fixes the feature-vector length and the seeded noise stream, so that
/// synthesis is a pure function of pattern content plus this configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    /// Number of features derived from a pattern. Independent of pattern
    /// length.
    #[serde(default = "default_feature_count")]
    pub feature_count: usize,
    /// Seed for the noise stream mixed into the feature transform.
    #[serde(default = "default_noise_seed")]
    pub noise_seed: u64,
    /// Standard deviation of the Gaussian noise component.
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: f64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            feature_count: default_feature_count(),
            noise_seed: default_noise_seed(),
            noise_amplitude: default_noise_amplitude(),
        }
    }
}

fn default_feature_count() -> usize {
    16
}
fn default_noise_seed() -> u64 {
    0x5eed_cafe
}
fn default_noise_amplitude() -> f64 {
    0.1
}

/// Settings for the cancellable real-time mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealTimeConfig {
    /// Minimum wall-clock time between progress callbacks, in milliseconds.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Run-level wall-clock budget in milliseconds. 0 means unbounded.
    #[serde(default)]
    pub max_runtime_ms: u64,
    /// Run the generation loop on a dedicated background thread.
    #[serde(default = "default_threaded")]
    pub threaded: bool,
}

impl Default for RealTimeConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            max_runtime_ms: 0,
            threaded: default_threaded(),
        }
    }
}

fn default_update_interval_ms() -> u64 {
    100
}
fn default_threaded() -> bool {
    true
}

impl RealTimeConfig {
    /// Callback interval as a `Duration`.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    /// Runtime budget, or `None` when unbounded.
    pub fn max_runtime(&self) -> Option<Duration> {
        (self.max_runtime_ms > 0).then(|| Duration::from_millis(self.max_runtime_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_population_rejected() {
        let config = EvolutionConfig {
            population_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EvolutionError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_out_of_range_rates_rejected() {
        let config = EvolutionConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EvolutionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.population_size, config.population_size);
        assert_eq!(parsed.min_fitness, config.min_fitness);
    }

    #[test]
    fn test_realtime_defaults() {
        let rt = RealTimeConfig::default();
        assert_eq!(rt.update_interval(), Duration::from_millis(100));
        assert!(rt.max_runtime().is_none());
        assert!(rt.threaded);
    }
}
