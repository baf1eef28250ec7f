//! Pattern evolution machinery.
//!
//! The engine is split into small, stateless-where-possible pieces:
//!
//! - **Synthesis** (`synthesis`): maps byte patterns to bounded metric
//!   bundles; the confidence score doubles as fitness
//! - **Population** (`population`): one generation of candidates with
//!   cached fitness
//! - **Breeding** (`breeder`): tournament selection, single-point
//!   crossover, bit-flip mutation
//! - **Evaluation** (`evaluator`): fitness, diversity, and convergence
//! - **Control** (`controller`): the generation loop, blocking and
//!   real-time
//!
//! # Example
//!
//! ```rust,no_run
//! use pattern_evolve::engine::EvolutionController;
//! use pattern_evolve::schema::EvolutionConfig;
//!
//! let controller = EvolutionController::new();
//! let config = EvolutionConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//! let result = controller.evolve(b"test pattern", config).unwrap();
//! println!(
//!     "generation {}: fitness = {:.3}",
//!     result.state.generation, result.state.fitness
//! );
//! ```

mod breeder;
mod controller;
mod evaluator;
mod population;
mod synthesis;

pub use breeder::{PatternRng, crossover_at};
pub use controller::{EvolutionController, ProgressCallback, RealtimeHandle};
pub use evaluator::{FitnessEvaluator, convergence, diversity, hamming_distance};
pub use population::{Individual, Population};
pub use synthesis::Synthesizer;
