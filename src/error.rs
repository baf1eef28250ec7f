//! Error taxonomy for evolution runs.

use crate::schema::EvolutionState;

/// Errors from the breeding operators.
///
/// These indicate internal-consistency faults: given the population
/// invariants they should never occur during a healthy run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BreedError {
    #[error("tournament selection failed (empty population or zero tournament size)")]
    SelectionFailed,
    #[error("pattern length mismatch: {left} != {right}")]
    InvalidPatternLength { left: usize, right: usize },
    #[error("population collapsed to zero individuals")]
    EmptyPopulation,
    #[error("replacement generation has {got} individuals, expected {expected}")]
    PopulationSizeChanged { expected: usize, got: usize },
}

/// Error returned by a real-time progress callback. Aborts the run.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

/// Errors surfaced by the evolution controller.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    /// The seed pattern was empty.
    #[error("seed pattern is empty")]
    NoInitialPattern,
    /// The configured population size was zero.
    #[error("population size must be non-zero")]
    EmptyPopulation,
    /// A configuration value was out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A second run was requested while one was in progress.
    #[error("an evolution run is already in progress")]
    AlreadyRunning,
    /// A breeding step failed; the last consistent state is attached.
    #[error("run aborted at generation {}: {}", state.generation, source)]
    Aborted {
        #[source]
        source: BreedError,
        state: EvolutionState,
    },
    /// A progress callback failed; the last consistent state is attached.
    #[error("callback failed at generation {}: {}", state.generation, source)]
    Callback {
        #[source]
        source: CallbackError,
        state: EvolutionState,
    },
    /// Post-condition violation on a completed run. Signals a bug in the
    /// breeding/metrics pipeline and is never a normal outcome.
    #[error("invalid evolution state: {0}")]
    InvalidEvolutionState(String),
    /// The background thread could not be spawned.
    #[error("failed to spawn evolution thread")]
    Spawn(#[source] std::io::Error),
    /// The background thread panicked before producing a result.
    #[error("background evolution task panicked")]
    TaskPanicked,
}
