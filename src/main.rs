//! Pattern evolution CLI - Run evolution from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use pattern_evolve::{EvolutionConfig, EvolutionController, EvolutionResult, RealTimeConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [seed-text] [--realtime]", args[0]);
        eprintln!();
        eprintln!("Evolve a byte pattern from a JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to evolution configuration file");
        eprintln!("  seed-text    Seed pattern (default: \"test pattern\")");
        eprintln!("  --realtime   Stream progress snapshots while evolving");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let realtime = args.iter().any(|a| a == "--realtime");
    let seed: Vec<u8> = args
        .get(2)
        .filter(|a| !a.starts_with("--"))
        .map(|s| s.clone().into_bytes())
        .unwrap_or_else(|| b"test pattern".to_vec());

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("Pattern Evolution");
    println!("=================");
    println!("Seed length:     {} bytes", seed.len());
    println!("Population:      {}", config.population_size);
    println!("Max generations: {}", config.max_generations);
    println!("Fitness target:  {}", config.min_fitness);
    println!();

    let controller = EvolutionController::new();

    let result = if realtime {
        run_realtime(&controller, &seed, config)
    } else {
        controller.evolve(&seed, config)
    };

    match result {
        Ok(result) => print_result(&result),
        Err(e) => {
            eprintln!("Evolution failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_realtime(
    controller: &EvolutionController,
    seed: &[u8],
    config: EvolutionConfig,
) -> Result<EvolutionResult, pattern_evolve::EvolutionError> {
    static UPDATES: AtomicUsize = AtomicUsize::new(0);

    let rt = RealTimeConfig::default();
    let handle = controller.evolve_realtime(
        seed,
        config,
        rt,
        Box::new(|state, _best| {
            let n = UPDATES.fetch_add(1, Ordering::Relaxed) + 1;
            println!(
                "  update {}: generation {}, fitness={:.4}, diversity={:.4}, convergence={:.4}",
                n, state.generation, state.fitness, state.diversity, state.convergence
            );
            Ok(())
        }),
    )?;
    handle.join()
}

fn print_result(result: &EvolutionResult) {
    println!("Finished: {:?}", result.stop_reason);
    println!("  Generations:   {}", result.state.generation);
    println!("  Best fitness:  {:.4}", result.state.fitness);
    println!("  Diversity:     {:.4}", result.state.diversity);
    println!("  Convergence:   {:.4}", result.state.convergence);
    println!("  Evaluations:   {}", result.stats.total_evaluations);
    println!("  Elapsed:       {:.2}s", result.stats.elapsed_seconds);
    println!("  Evals/sec:     {:.1}", result.stats.evaluations_per_second);
    println!(
        "  Best pattern:  {}",
        result
            .state
            .current_best
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>()
    );
}

fn print_example_config() {
    let config = EvolutionConfig {
        random_seed: Some(42),
        ..Default::default()
    };
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
