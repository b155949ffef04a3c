//! Genome vector operations for the genetic algorithm.
//!
//! A genome is the flattened form of a
//! [`LinearPolicy`](flappy_evaluator::policy::LinearPolicy): one signed weight
//! per sensor feature followed by the bias. The functions here implement the
//! initialization, crossover, mutation and normalization steps used by
//! [`PopulationEvolver`](crate::genetic::PopulationEvolver).
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws uniform weights in `[-max, max]`
//! - **Crossover**: [`blx_alpha`] implements the BLX-α operator
//! - **Mutation**: [`mutate`] applies Gaussian noise
//! - **Normalization**: [`normalize_l1`] scales the genome to unit L1 norm
//!
//! ## Signed Weights
//!
//! Features such as the offset from the gap center push the decision in
//! either direction, so weights range over `[-max_weight, max_weight]` rather
//! than being restricted to positive values.
//!
//! ## L1 Normalization
//!
//! A policy jumps when its linear term is positive, so multiplying the whole
//! genome (bias included) by a positive constant never changes behavior.
//! Normalizing to `Σ|wᵢ| = 1` removes these duplicates from the search space.

use rand::Rng;
use rand_distr::{Normal, NormalError};

/// Creates a genome by applying a function to each index.
///
/// ```
/// use flappy_training::weights;
///
/// let genome = weights::from_fn(|i| if i % 2 == 0 { 1.0 } else { -1.0 }, 4);
/// assert_eq!(genome, vec![1.0, -1.0, 1.0, -1.0]);
/// ```
pub fn from_fn<F>(f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    (0..len).map(f).collect()
}

/// Generates a genome with each weight uniform in `[-max_weight, max_weight]`.
pub fn random<R>(rng: &mut R, max_weight: f32, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(-max_weight..=max_weight), len)
}

/// Performs BLX-α (blend crossover) between two parent genomes.
///
/// For parents `x1` and `x2` at position `i`:
///
/// 1. Compute `d = |x2 - x1|`
/// 2. Expand range: `[min - α·d, max + α·d]`
/// 3. Sample uniformly from the expanded range
/// 4. Clamp to `[-max_weight, max_weight]`
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn blx_alpha<R>(p1: &[f32], p2: &[f32], alpha: f32, max_weight: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    p1.iter()
        .zip(p2)
        .map(|(&x1, &x2)| {
            let min = x1.min(x2);
            let max = x1.max(x2);
            let d = max - min;
            rng.random_range(min - alpha * d..=max + alpha * d)
                .clamp(-max_weight, max_weight)
        })
        .collect()
}

/// Applies Gaussian mutation in place.
///
/// Each weight is perturbed with probability `rate` by a sample of
/// `N(0, sigma)` and clamped to `[-max_weight, max_weight]`.
///
/// Fails when `sigma` is negative or not finite.
pub fn mutate<R>(
    genome: &mut [f32],
    sigma: f32,
    max_weight: f32,
    rate: f32,
    rng: &mut R,
) -> Result<(), NormalError>
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma)?;
    let rate = f64::from(rate.clamp(0.0, 1.0));
    for w in genome {
        if rng.random_bool(rate) {
            *w = (*w + rng.sample(normal)).clamp(-max_weight, max_weight);
        }
    }
    Ok(())
}

/// Scales a genome so that the absolute values of its weights sum to 1.0.
///
/// An all-zero genome is left unchanged.
///
/// ```
/// use flappy_training::weights;
///
/// let mut genome = vec![2.0, -1.0, 1.0];
/// weights::normalize_l1(&mut genome);
/// assert_eq!(genome, vec![0.5, -0.25, 0.25]);
/// ```
pub fn normalize_l1(genome: &mut [f32]) {
    let sum: f32 = genome.iter().map(|w| w.abs()).sum();
    if sum > 0.0 {
        for w in genome {
            *w /= sum;
        }
    }
}
