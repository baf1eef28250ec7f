//! Pattern evolution engine.
//!
//! Evolves a population of fixed-length byte patterns toward higher
//! fitness using genetic-algorithm mechanics, where fitness is the
//! confidence score of a deterministic feature-synthesis step.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, state snapshots, and run results
//! - `engine`: Synthesis, breeding operators, evaluation, and the
//!   evolution controller
//!
//! # Example
//!
//! ```rust,no_run
//! use pattern_evolve::{EvolutionConfig, EvolutionController};
//!
//! let controller = EvolutionController::new();
//! let config = EvolutionConfig {
//!     population_size: 32,
//!     max_generations: 50,
//!     min_fitness: 0.95,
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let result = controller.evolve(b"test pattern", config).unwrap();
//! println!(
//!     "stopped after {} generations with fitness {:.3}",
//!     result.state.generation, result.state.fitness
//! );
//! ```
//!
//! Runs with a fixed `random_seed` are fully reproducible: a single
//! seeded generator drives seeding, selection, crossover, and mutation.

pub mod engine;
pub mod error;
pub mod schema;

// Re-export commonly used types
pub use engine::{EvolutionController, ProgressCallback, RealtimeHandle, Synthesizer};
pub use error::{BreedError, CallbackError, EvolutionError};
pub use schema::{
    EvolutionConfig, EvolutionResult, EvolutionState, RealTimeConfig, StopReason, SynthesisState,
    SynthesizerConfig,
};
