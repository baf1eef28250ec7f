//! State snapshots and run results.

use serde::{Deserialize, Serialize};

use crate::error::EvolutionError;

/// Metrics bundle produced by feature synthesis for one pattern.
///
/// All scalar fields are within [0, 1]; `confidence` is the weighted
/// combination 0.3 * coherence + 0.4 * stability + 0.3 * evolution
/// potential, clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisState {
    /// Derived feature values, each in [0, 1].
    pub features: Vec<f64>,
    /// Combined quality score; the fitness of the source pattern.
    pub confidence: f64,
    /// Mean pairwise similarity across features.
    pub coherence: f64,
    /// `exp(-variance(features))`.
    pub stability: f64,
    /// Fraction of features distinct from all earlier features.
    pub evolution_potential: f64,
}

/// Per-generation snapshot of an evolution run.
///
/// Created at generation 0 from the seed pattern, updated once per
/// generation by the controller, and handed to callers as an immutable
/// copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionState {
    /// Completed generation count.
    pub generation: usize,
    /// Best fitness seen so far.
    pub fitness: f64,
    /// Mean pairwise normalized Hamming distance of the population.
    pub diversity: f64,
    /// Proximity of best fitness to the configured target.
    pub convergence: f64,
    /// Best pattern seen so far.
    pub current_best: Vec<u8>,
}

impl EvolutionState {
    /// Generation-zero state for a fresh run.
    pub fn initial(seed: &[u8]) -> Self {
        Self {
            generation: 0,
            fitness: 0.0,
            diversity: 0.0,
            convergence: 0.0,
            current_best: seed.to_vec(),
        }
    }

    /// Post-condition check on a naturally completed run.
    ///
    /// A violation here signals a bug in the breeding/metrics pipeline,
    /// not a recoverable user error.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        self.validate_metrics()?;
        if self.generation == 0 {
            return Err(EvolutionError::InvalidEvolutionState(
                "completed run reported zero generations".into(),
            ));
        }
        Ok(())
    }

    /// Range check on the metrics alone.
    ///
    /// Cancelled runs may legitimately stop at generation 0, so they skip
    /// the generation-count post-condition but still check ranges.
    pub fn validate_metrics(&self) -> Result<(), EvolutionError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.fitness) {
            return Err(EvolutionError::InvalidEvolutionState(format!(
                "fitness {} outside [0, 1]",
                self.fitness
            )));
        }
        if !in_unit(self.diversity) {
            return Err(EvolutionError::InvalidEvolutionState(format!(
                "diversity {} outside [0, 1]",
                self.diversity
            )));
        }
        if !in_unit(self.convergence) {
            return Err(EvolutionError::InvalidEvolutionState(format!(
                "convergence {} outside [0, 1]",
                self.convergence
            )));
        }
        Ok(())
    }
}

/// Controller lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No active run.
    Idle,
    /// Initial population created, loop not yet started.
    Seeded,
    /// Generation loop in progress.
    Running,
    /// Best fitness reached the configured target.
    Converged,
    /// Generation limit reached.
    Exhausted,
    /// Run stopped before natural termination.
    Cancelled,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Best fitness reached the target.
    Converged,
    /// Generation limit reached.
    Exhausted,
    /// Cancellation flag observed at a generation boundary.
    Cancelled,
    /// Wall-clock budget exceeded.
    RuntimeExpired,
}

impl StopReason {
    /// Terminal phase this reason maps to.
    pub fn phase(&self) -> Phase {
        match self {
            StopReason::Converged => Phase::Converged,
            StopReason::Exhausted => Phase::Exhausted,
            StopReason::Cancelled | StopReason::RuntimeExpired => Phase::Cancelled,
        }
    }
}

/// Per-generation traces for analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    /// Best fitness after each generation.
    pub best_fitness: Vec<f64>,
    /// Mean population fitness after each generation.
    pub mean_fitness: Vec<f64>,
    /// Population diversity after each generation.
    pub diversity: Vec<f64>,
    /// Convergence measure after each generation.
    pub convergence: Vec<f64>,
}

/// Statistics from a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations completed.
    pub generations: usize,
    /// Total fitness evaluations performed.
    pub total_evaluations: u64,
    /// Wall-clock time taken, in seconds.
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
}

/// Final outcome of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Final state snapshot.
    pub state: EvolutionState,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Run statistics.
    pub stats: EvolutionStats,
    /// Per-generation traces.
    pub history: EvolutionHistory,
}
