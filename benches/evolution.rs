//! Benchmarks for synthesis and generation stepping.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use pattern_evolve::{
    EvolutionConfig, EvolutionController, Synthesizer, SynthesizerConfig,
    engine::{FitnessEvaluator, PatternRng, Population, diversity},
};

fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize");

    let synth = Synthesizer::new(SynthesizerConfig::default());
    for len in [16, 64, 256, 1024] {
        let pattern = vec![0xA5u8; len];
        group.bench_with_input(BenchmarkId::from_parameter(len), &pattern, |b, pattern| {
            b.iter(|| black_box(synth.synthesize(black_box(pattern))));
        });
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");

    for pop_size in [10, 50, 200] {
        let config = EvolutionConfig {
            population_size: pop_size,
            random_seed: Some(42),
            ..Default::default()
        };
        let seed = vec![0x3Cu8; 64];

        group.bench_with_input(
            BenchmarkId::from_parameter(pop_size),
            &config,
            |b, config| {
                let evaluator = FitnessEvaluator::new(config.synthesizer.clone());
                b.iter(|| {
                    let mut rng = PatternRng::new(42);
                    let mut pop =
                        Population::seed(&seed, config.population_size, 0.1, &mut rng).unwrap();
                    evaluator.evaluate_population(&mut pop);
                    let next = rng.breed(&pop, config).unwrap();
                    pop.replace(next).unwrap();
                    evaluator.evaluate_population(&mut pop);
                    black_box(diversity(&pop))
                });
            },
        );
    }

    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    c.bench_function("evolve_10gen_pop20", |b| {
        let controller = EvolutionController::new();
        let config = EvolutionConfig {
            population_size: 20,
            max_generations: 10,
            min_fitness: 1.0,
            random_seed: Some(42),
            ..Default::default()
        };
        b.iter(|| {
            black_box(
                controller
                    .evolve(black_box(b"benchmark pattern"), config.clone())
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, bench_synthesize, bench_generation, bench_full_run);
criterion_main!(benches);
