//! Evolution controller: seeds a population and drives the
//! breed / evaluate / update-best loop to termination.
//!
//! Two execution modes share one generation loop: a blocking call on the
//! caller's thread, and a cancellable real-time mode with periodic
//! progress callbacks, optionally on a dedicated background thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};

use crate::engine::breeder::PatternRng;
use crate::engine::evaluator::{FitnessEvaluator, convergence, diversity};
use crate::engine::population::Population;
use crate::error::{CallbackError, EvolutionError};
use crate::schema::{
    EvolutionConfig, EvolutionHistory, EvolutionResult, EvolutionState, EvolutionStats, Phase,
    RealTimeConfig, StopReason,
};

/// Progress callback for real-time runs.
///
/// Receives an immutable state snapshot and the best pattern so far.
/// Returning an error aborts the run.
pub type ProgressCallback =
    Box<dyn FnMut(&EvolutionState, &[u8]) -> Result<(), CallbackError> + Send>;

/// Orchestrates evolution runs.
///
/// At most one run may be live per controller; a second call while one is
/// in progress fails fast with `AlreadyRunning` instead of blocking.
#[derive(Default)]
pub struct EvolutionController {
    running: Arc<AtomicBool>,
}

impl EvolutionController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is currently live.
    pub fn phase(&self) -> Phase {
        if self.running.load(Ordering::Acquire) {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    /// Evolve `seed` toward the configured fitness target, blocking until
    /// convergence or generation exhaustion.
    pub fn evolve(
        &self,
        seed: &[u8],
        config: EvolutionConfig,
    ) -> Result<EvolutionResult, EvolutionError> {
        let _guard = self.acquire()?;
        let mut run = Run::new(seed, config)?;

        let reason = loop {
            if let Some(reason) = run.stop_reason() {
                break reason;
            }
            run.step()?;
        };

        run.finish(reason)
    }

    /// Start a cancellable real-time run.
    ///
    /// In threaded mode the generation loop runs on a dedicated background
    /// thread and the returned handle is live; otherwise the loop runs
    /// synchronously here and the handle is already complete. In both
    /// modes `callback` fires at most once per update interval plus
    /// exactly once at termination.
    pub fn evolve_realtime(
        &self,
        seed: &[u8],
        config: EvolutionConfig,
        rt: RealTimeConfig,
        callback: ProgressCallback,
    ) -> Result<RealtimeHandle, EvolutionError> {
        let guard = self.acquire()?;
        let run = Run::new(seed, config)?;
        let cancel = Arc::new(AtomicBool::new(false));

        if rt.threaded {
            let thread_cancel = Arc::clone(&cancel);
            let handle = thread::Builder::new()
                .name("evolution".into())
                .spawn(move || {
                    let _guard = guard;
                    run_realtime(run, &rt, &thread_cancel, callback)
                })
                .map_err(EvolutionError::Spawn)?;
            Ok(RealtimeHandle {
                cancel,
                inner: HandleInner::Thread(handle),
            })
        } else {
            let result = run_realtime(run, &rt, &cancel, callback);
            drop(guard);
            Ok(RealtimeHandle {
                cancel,
                inner: HandleInner::Complete(result),
            })
        }
    }

    /// Flip the running flag, failing fast if a run is already live.
    fn acquire(&self) -> Result<RunGuard, EvolutionError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EvolutionError::AlreadyRunning);
        }
        Ok(RunGuard {
            running: Arc::clone(&self.running),
        })
    }
}

/// Clears the controller's running flag when the run ends, however it
/// ends.
struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Handle to a real-time run.
///
/// Joining before dropping the controller is required; `stop` only
/// requests cancellation and never interrupts an in-flight generation.
pub struct RealtimeHandle {
    cancel: Arc<AtomicBool>,
    inner: HandleInner,
}

enum HandleInner {
    Thread(thread::JoinHandle<Result<EvolutionResult, EvolutionError>>),
    Complete(Result<EvolutionResult, EvolutionError>),
}

impl RealtimeHandle {
    /// Request cancellation. The loop observes the flag at the next
    /// generation boundary; the current generation always completes.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Whether the run has terminated.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            HandleInner::Thread(handle) => handle.is_finished(),
            HandleInner::Complete(_) => true,
        }
    }

    /// Wait for termination and return the final result.
    pub fn join(self) -> Result<EvolutionResult, EvolutionError> {
        match self.inner {
            HandleInner::Thread(handle) => {
                handle.join().map_err(|_| EvolutionError::TaskPanicked)?
            }
            HandleInner::Complete(result) => result,
        }
    }
}

/// Shared generation loop for real-time runs.
fn run_realtime(
    mut run: Run,
    rt: &RealTimeConfig,
    cancel: &AtomicBool,
    mut callback: ProgressCallback,
) -> Result<EvolutionResult, EvolutionError> {
    let started = Instant::now();
    let interval = rt.update_interval();
    let mut last_update = Instant::now();

    let reason = loop {
        // Cancellation and budget are checked only at generation
        // boundaries; an in-flight generation always completes.
        if cancel.load(Ordering::Acquire) {
            break StopReason::Cancelled;
        }
        if let Some(budget) = rt.max_runtime()
            && started.elapsed() >= budget
        {
            break StopReason::RuntimeExpired;
        }
        if let Some(reason) = run.stop_reason() {
            break reason;
        }

        if let Err(err) = run.step() {
            // Terminal notification still fires so the caller observes
            // the last consistent state.
            let best = run.state.current_best.clone();
            let _ = callback(&run.state, &best);
            return Err(err);
        }

        if last_update.elapsed() >= interval {
            let best = run.state.current_best.clone();
            callback(&run.state, &best).map_err(|source| EvolutionError::Callback {
                source,
                state: run.state.clone(),
            })?;
            last_update = Instant::now();
        }
    };

    // Exactly one final callback, whatever the termination reason.
    let best = run.state.current_best.clone();
    callback(&run.state, &best).map_err(|source| EvolutionError::Callback {
        source,
        state: run.state.clone(),
    })?;

    run.finish(reason)
}

/// One evolution run: population, state, and the rng that drives it.
struct Run {
    config: EvolutionConfig,
    evaluator: FitnessEvaluator,
    rng: PatternRng,
    population: Population,
    state: EvolutionState,
    history: EvolutionHistory,
    phase: Phase,
    started: Instant,
    evaluations: u64,
}

impl Run {
    /// Validate inputs, seed the initial population, and evaluate it.
    fn new(seed: &[u8], config: EvolutionConfig) -> Result<Self, EvolutionError> {
        if seed.is_empty() {
            return Err(EvolutionError::NoInitialPattern);
        }
        config.validate()?;

        let rng_seed = config.random_seed.unwrap_or_else(rand::random);
        let mut rng = PatternRng::new(rng_seed);
        let mut population =
            Population::seed(seed, config.population_size, config.mutation_rate, &mut rng)?;

        let evaluator = FitnessEvaluator::new(config.synthesizer.clone());
        evaluator.evaluate_population(&mut population);

        info!(
            "evolution run started: L={}, population={}, max_generations={}, seed={}",
            seed.len(),
            config.population_size,
            config.max_generations,
            rng_seed
        );

        Ok(Self {
            config,
            evaluator,
            rng,
            population,
            state: EvolutionState::initial(seed),
            history: EvolutionHistory::default(),
            phase: Phase::Seeded,
            started: Instant::now(),
            evaluations: 0,
        })
    }

    /// Breed, evaluate, and fold the next generation into the state.
    fn step(&mut self) -> Result<(), EvolutionError> {
        self.phase = Phase::Running;
        let next = self
            .rng
            .breed(&self.population, &self.config)
            .map_err(|source| self.abort(source))?;
        self.population
            .replace(next)
            .map_err(|source| self.abort(source))?;

        self.evaluator.evaluate_population(&mut self.population);
        self.evaluations += self.population.len() as u64;

        if let Some(best) = self.population.best()
            && best.fitness() > self.state.fitness
        {
            self.state.fitness = best.fitness();
            self.state.current_best = best.pattern().to_vec();
        }

        self.state.diversity = diversity(&self.population);
        self.state.convergence = convergence(self.state.fitness, self.config.min_fitness);
        self.state.generation += 1;

        let mean_fitness = self.population.iter().map(|ind| ind.fitness()).sum::<f64>()
            / self.population.len() as f64;
        self.history.best_fitness.push(self.state.fitness);
        self.history.mean_fitness.push(mean_fitness);
        self.history.diversity.push(self.state.diversity);
        self.history.convergence.push(self.state.convergence);

        debug!(
            "generation {}: fitness={:.4}, diversity={:.4}, convergence={:.4}",
            self.state.generation, self.state.fitness, self.state.diversity, self.state.convergence
        );

        Ok(())
    }

    /// Natural termination check, convergence winning over exhaustion.
    fn stop_reason(&self) -> Option<StopReason> {
        if self.state.convergence >= 1.0 {
            return Some(StopReason::Converged);
        }
        if self.state.generation >= self.config.max_generations {
            return Some(StopReason::Exhausted);
        }
        None
    }

    /// Wrap a breeding fault with the last consistent state.
    fn abort(&self, source: crate::error::BreedError) -> EvolutionError {
        warn!(
            "aborting run at generation {}: {}",
            self.state.generation, source
        );
        EvolutionError::Aborted {
            source,
            state: self.state.clone(),
        }
    }

    /// Post-condition check and result assembly.
    fn finish(mut self, stop_reason: StopReason) -> Result<EvolutionResult, EvolutionError> {
        self.phase = stop_reason.phase();
        match stop_reason {
            // Natural termination must have run at least one generation.
            StopReason::Converged | StopReason::Exhausted => self.state.validate()?,
            // Cancellation can land before the first generation.
            StopReason::Cancelled | StopReason::RuntimeExpired => self.state.validate_metrics()?,
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let stats = EvolutionStats {
            generations: self.state.generation,
            total_evaluations: self.evaluations + self.config.population_size as u64,
            elapsed_seconds: elapsed,
            evaluations_per_second: if elapsed > 0.0 {
                (self.evaluations + self.config.population_size as u64) as f64 / elapsed
            } else {
                0.0
            },
        };

        info!(
            "evolution run finished in phase {:?} after {} generations, fitness={:.4}",
            self.phase, self.state.generation, self.state.fitness
        );

        Ok(EvolutionResult {
            state: self.state,
            stop_reason,
            stats,
            history: self.history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn config(max_generations: usize) -> EvolutionConfig {
        EvolutionConfig {
            population_size: 10,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            max_generations,
            min_fitness: 0.95,
            random_seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_blocking_run_within_bounds() {
        let controller = EvolutionController::new();
        let result = controller.evolve(b"test pattern", config(5)).unwrap();

        assert!(result.state.generation > 0);
        assert!(result.state.generation <= 5);
        assert!((0.0..=1.0).contains(&result.state.fitness));
        assert!((0.0..=1.0).contains(&result.state.diversity));
        assert!((0.0..=1.0).contains(&result.state.convergence));
        assert_eq!(result.state.current_best.len(), 12);
        assert!(matches!(
            result.stop_reason,
            StopReason::Converged | StopReason::Exhausted
        ));
    }

    #[test]
    fn test_empty_seed_fails() {
        let controller = EvolutionController::new();
        assert!(matches!(
            controller.evolve(b"", config(5)),
            Err(EvolutionError::NoInitialPattern)
        ));
    }

    #[test]
    fn test_zero_population_fails_before_any_generation() {
        let controller = EvolutionController::new();
        let config = EvolutionConfig {
            population_size: 0,
            ..config(5)
        };
        assert!(matches!(
            controller.evolve(b"seed", config),
            Err(EvolutionError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_elitism_monotonic_best_fitness() {
        let controller = EvolutionController::new();
        let config = EvolutionConfig {
            max_generations: 20,
            min_fitness: 1.0,
            ..config(20)
        };
        let result = controller.evolve(b"monotone fitness", config).unwrap();

        let mut previous = 0.0;
        for &best in &result.history.best_fitness {
            assert!(best >= previous);
            previous = best;
        }
    }

    #[test]
    fn test_runs_are_reproducible() {
        let controller = EvolutionController::new();
        let a = controller.evolve(b"test pattern", config(8)).unwrap();
        let b = controller.evolve(b"test pattern", config(8)).unwrap();

        assert_eq!(a.state.generation, b.state.generation);
        assert_eq!(a.state.fitness, b.state.fitness);
        assert_eq!(a.state.current_best, b.state.current_best);
    }

    #[test]
    fn test_history_length_matches_generations() {
        let controller = EvolutionController::new();
        let result = controller.evolve(b"test pattern", config(6)).unwrap();
        assert_eq!(result.history.best_fitness.len(), result.state.generation);
        assert_eq!(result.history.diversity.len(), result.state.generation);
    }

    #[test]
    fn test_realtime_unthreaded_final_callback() {
        let controller = EvolutionController::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));

        let cb_calls = Arc::clone(&calls);
        let cb_seen = Arc::clone(&seen);
        let rt = RealTimeConfig {
            update_interval_ms: 10_000,
            max_runtime_ms: 0,
            threaded: false,
        };
        let handle = controller
            .evolve_realtime(
                b"test pattern",
                config(4),
                rt,
                Box::new(move |state, best| {
                    cb_calls.fetch_add(1, Ordering::SeqCst);
                    *cb_seen.lock().unwrap() = Some((state.clone(), best.to_vec()));
                    Ok(())
                }),
            )
            .unwrap();

        assert!(handle.is_finished());
        let result = handle.join().unwrap();

        // Interval far exceeds the run time, so only the guaranteed final
        // callback fires, carrying the terminal state.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let (state, best) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(state.generation, result.state.generation);
        assert_eq!(best, result.state.current_best);
    }

    #[test]
    fn test_realtime_threaded_stop() {
        let controller = EvolutionController::new();
        let rt = RealTimeConfig {
            update_interval_ms: 1,
            max_runtime_ms: 0,
            threaded: true,
        };
        let config = EvolutionConfig {
            max_generations: 1_000_000,
            min_fitness: 1.0,
            ..config(1)
        };

        let handle = controller
            .evolve_realtime(b"test pattern", config, rt, Box::new(|_, _| Ok(())))
            .unwrap();

        handle.stop();
        let result = handle.join().unwrap();
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert!(result.state.generation < 1_000_000);
    }

    #[test]
    fn test_realtime_max_runtime_expires() {
        let controller = EvolutionController::new();
        let rt = RealTimeConfig {
            update_interval_ms: 5,
            max_runtime_ms: 50,
            threaded: true,
        };
        let config = EvolutionConfig {
            max_generations: usize::MAX,
            min_fitness: 1.0,
            ..config(1)
        };

        let handle = controller
            .evolve_realtime(b"test pattern", config, rt, Box::new(|_, _| Ok(())))
            .unwrap();
        let result = handle.join().unwrap();
        assert_eq!(result.stop_reason, StopReason::RuntimeExpired);
    }

    #[test]
    fn test_callback_error_aborts_run() {
        let controller = EvolutionController::new();
        let rt = RealTimeConfig {
            update_interval_ms: 0,
            max_runtime_ms: 0,
            threaded: false,
        };
        let config = EvolutionConfig {
            max_generations: 100,
            min_fitness: 1.0,
            ..config(1)
        };

        let handle = controller
            .evolve_realtime(
                b"test pattern",
                config,
                rt,
                Box::new(|_, _| Err(CallbackError("observer gave up".into()))),
            )
            .unwrap();
        assert!(matches!(
            handle.join(),
            Err(EvolutionError::Callback { .. })
        ));
    }

    #[test]
    fn test_second_realtime_call_fails_fast() {
        let controller = EvolutionController::new();
        let rt = RealTimeConfig {
            update_interval_ms: 1_000,
            max_runtime_ms: 0,
            threaded: true,
        };
        let config = EvolutionConfig {
            max_generations: 1_000_000,
            min_fitness: 1.0,
            ..config(1)
        };

        let handle = controller
            .evolve_realtime(b"test pattern", config.clone(), rt, Box::new(|_, _| Ok(())))
            .unwrap();

        assert!(matches!(
            controller.evolve(b"test pattern", config),
            Err(EvolutionError::AlreadyRunning)
        ));

        handle.stop();
        handle.join().unwrap();

        // Idle again after the join.
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn test_realtime_periodic_callbacks() {
        // A run bounded only by wall clock, with a callback interval a
        // third of the budget, must report progress more than once.
        let controller = EvolutionController::new();
        let rt = RealTimeConfig {
            update_interval_ms: 20,
            max_runtime_ms: 120,
            threaded: true,
        };
        let config = EvolutionConfig {
            max_generations: usize::MAX,
            min_fitness: 1.0,
            ..config(1)
        };

        let calls = Arc::new(AtomicUsize::new(0));
        let cb_calls = Arc::clone(&calls);
        let handle = controller
            .evolve_realtime(
                b"test pattern",
                config,
                rt,
                Box::new(move |_, _| {
                    cb_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();
        let result = handle.join().unwrap();

        assert_eq!(result.stop_reason, StopReason::RuntimeExpired);
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_stop_before_join_completes_in_flight_generation() {
        let controller = EvolutionController::new();
        let rt = RealTimeConfig {
            update_interval_ms: 1,
            max_runtime_ms: 0,
            threaded: true,
        };
        let config = EvolutionConfig {
            max_generations: 1_000_000,
            min_fitness: 1.0,
            ..config(1)
        };

        let handle = controller
            .evolve_realtime(b"test pattern", config, rt, Box::new(|_, _| Ok(())))
            .unwrap();
        std::thread::sleep(Duration::from_millis(20));
        handle.stop();
        let result = handle.join().unwrap();

        // Cancellation is generation-granular: whatever ran, the final
        // state is consistent and validated.
        assert!(result.state.generation > 0);
        assert_eq!(result.stop_reason, StopReason::Cancelled);
    }
}
