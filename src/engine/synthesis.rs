//! Feature synthesis: maps byte patterns to bounded metric bundles.
//!
//! Synthesis is a pure function of pattern content and synthesizer
//! configuration. The noise stream is derived from the configured seed on
//! every call, so identical inputs always produce identical outputs.

use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::schema::{SynthesisState, SynthesizerConfig};

/// Confidence weights for coherence, stability, and evolution potential.
const COHERENCE_WEIGHT: f64 = 0.3;
const STABILITY_WEIGHT: f64 = 0.4;
const POTENTIAL_WEIGHT: f64 = 0.3;

/// Two features closer than this count as equivalent when measuring
/// evolution potential.
const DISTINCT_THRESHOLD: f64 = 0.01;

/// Derives feature vectors and quality metrics from byte patterns.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: SynthesizerConfig,
}

impl Synthesizer {
    /// Create a synthesizer with the given configuration.
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    /// Synthesize the metrics bundle for a pattern.
    ///
    /// Never fails on malformed input: an empty pattern yields degenerate
    /// but valid metrics.
    pub fn synthesize(&self, pattern: &[u8]) -> SynthesisState {
        let features = self.feature_vector(pattern);

        let coherence = coherence(&features);
        let stability = stability(&features);
        let evolution_potential = evolution_potential(&features);

        let confidence = (COHERENCE_WEIGHT * coherence
            + STABILITY_WEIGHT * stability
            + POTENTIAL_WEIGHT * evolution_potential)
            .clamp(0.0, 1.0);

        SynthesisState {
            features,
            confidence,
            coherence,
            stability,
            evolution_potential,
        }
    }

    /// Combine pattern bytes with seeded noise through a bounded nonlinear
    /// transform.
    ///
    /// Feature `i` folds every byte at stride `feature_count`, mixes in a
    /// Gaussian noise term, takes the Pythagorean magnitude of the two, and
    /// remaps it through a sine into [0, 1].
    fn feature_vector(&self, pattern: &[u8]) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.config.noise_seed);
        let count = self.config.feature_count;

        (0..count)
            .map(|i| {
                let value = stride_mean(pattern, i, count);
                let noise: f64 = rng.sample::<f64, _>(StandardNormal) * self.config.noise_amplitude;
                let magnitude = (value * value + noise * noise).sqrt();
                (0.5 + 0.5 * (magnitude * std::f64::consts::PI).sin()).clamp(0.0, 1.0)
            })
            .collect()
    }
}

/// Mean of the bytes at positions `offset`, `offset + stride`, ...,
/// normalized to [0, 1]. Zero for an empty pattern.
fn stride_mean(pattern: &[u8], offset: usize, stride: usize) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    let mut idx = offset;
    while idx < pattern.len() {
        sum += pattern[idx] as f64 / 255.0;
        n += 1;
        idx += stride;
    }
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Mean pairwise similarity `1 - |a - b|` across all feature pairs.
/// Defaults to 1.0 for fewer than 2 features.
fn coherence(features: &[f64]) -> f64 {
    if features.len() < 2 {
        return 1.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..features.len() {
        for j in (i + 1)..features.len() {
            total += 1.0 - (features[i] - features[j]).abs();
            pairs += 1;
        }
    }
    (total / pairs as f64).clamp(0.0, 1.0)
}

/// `exp(-variance(features))`. Defaults to 1.0 for fewer than 2 features.
fn stability(features: &[f64]) -> f64 {
    if features.len() < 2 {
        return 1.0;
    }

    let mean = features.iter().sum::<f64>() / features.len() as f64;
    let variance =
        features.iter().map(|f| (f - mean) * (f - mean)).sum::<f64>() / features.len() as f64;
    (-variance).exp().clamp(0.0, 1.0)
}

/// Fraction of features that differ from every earlier feature by more
/// than the distinctness threshold. The first feature always counts.
fn evolution_potential(features: &[f64]) -> f64 {
    if features.is_empty() {
        return 0.0;
    }

    let distinct = features
        .iter()
        .enumerate()
        .filter(|&(i, f)| {
            features[..i]
                .iter()
                .all(|earlier| (f - earlier).abs() > DISTINCT_THRESHOLD)
        })
        .count();
    distinct as f64 / features.len() as f64
}
