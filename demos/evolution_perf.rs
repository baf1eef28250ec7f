//! Quick evolution performance test

use pattern_evolve::{EvolutionConfig, EvolutionController, SynthesizerConfig};
use std::time::Instant;

fn main() {
    println!("=== Evolution Performance Test ===\n");

    let controller = EvolutionController::new();

    // Test different pattern lengths
    for pattern_len in [16, 64, 256] {
        println!("Pattern length: {} bytes", pattern_len);

        let seed = vec![0x5Au8; pattern_len];
        let config = EvolutionConfig {
            population_size: 20,
            max_generations: 10,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            min_fitness: 1.0,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let result = controller.evolve(&seed, config).unwrap();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", result.state.generation);
        println!("  Evaluations:    {}", total_evals);
        println!("  Elapsed:        {:.3}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best fitness:   {:.4}", result.state.fitness);
        println!();
    }

    println!("=== Scalability Test (fixed 64-byte pattern) ===\n");

    // Test different population sizes
    let seed = vec![0x5Au8; 64];
    for pop_size in [10, 20, 40, 80] {
        let config = EvolutionConfig {
            population_size: pop_size,
            max_generations: 5,
            min_fitness: 1.0,
            synthesizer: SynthesizerConfig {
                feature_count: 32,
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let result = controller.evolve(&seed, config).unwrap();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!(
            "Population {}: {} evals in {:.3}s ({:.1} evals/sec)",
            pop_size,
            total_evals,
            elapsed.as_secs_f64(),
            evals_per_sec
        );
    }
}
