//! Configuration and reporting types for pattern evolution runs.

mod config;
mod state;

pub use config::{EvolutionConfig, RealTimeConfig, SynthesizerConfig};
pub use state::{
    EvolutionHistory, EvolutionResult, EvolutionState, EvolutionStats, Phase, StopReason,
    SynthesisState,
};
