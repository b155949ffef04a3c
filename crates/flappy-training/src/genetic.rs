//! Genetic algorithm over linear-policy genomes.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate Fitness** - The whole population flies through batch sessions
//!    (one per seed) and each individual receives its mean fitness
//! 2. **Elite Selection** - Top performers are copied unchanged
//! 3. **Tournament Selection** - Parents are the fittest of K random picks
//! 4. **Crossover (BLX-α)** - Parents are blended into a child genome
//! 5. **Mutation** - Gaussian noise is added to some genes
//! 6. **Normalization** - Child genomes are L1-normalized
//!
//! # Key Components
//!
//! - [`Individual`] - A genome and its fitness
//! - [`Population`] - Individuals that share a feature set
//! - [`PopulationEvolver`] - Selection, crossover and mutation parameters
//!
//! # Determinism
//!
//! Every random choice comes from the caller's RNG, and sessions are seeded
//! explicitly, so a training run is reproducible from its seeds.
//!
//! # Example
//!
//! ```
//! use flappy_engine::{FeatureSet, GameConfig, SimSeed};
//! use flappy_evaluator::session_evaluator::BatchEvaluator;
//! use flappy_training::genetic::{Population, PopulationEvolver};
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
//! let evaluator = BatchEvaluator::new(GameConfig::default(), FeatureSet::basic(), 300);
//! let seeds = [SimSeed::from_bytes([3; 16])];
//! let evolver = PopulationEvolver {
//!     elite_count: 1,
//!     max_weight: 1.0,
//!     tournament_size: 2,
//!     mutation_sigma: 0.1,
//!     blx_alpha: 0.2,
//!     mutation_rate: 0.3,
//! };
//!
//! let mut population = Population::random(FeatureSet::basic(), 6, &mut rng, 1.0);
//! for _ in 0..2 {
//!     population.evaluate_fitness(&evaluator, &seeds).unwrap();
//!     population = evolver.evolve(&population, &mut rng).unwrap();
//! }
//! assert_eq!(population.individuals().len(), 6);
//! ```
//!
//! # Current Limitations
//!
//! - **No automatic parameter adaptation**: callers switch evolvers between
//!   phases themselves
//! - **No diversity maintenance** beyond elitism and tournament selection

use flappy_engine::{FeatureSet, GameConfig, SessionError, SimSeed};
use flappy_evaluator::{
    policy::{LinearPolicy, PolicyError},
    session_evaluator::{BatchEvaluator, PopulationEvaluation},
};
use rand::{Rng, seq::IndexedRandom};
use rand_distr::NormalError;

use crate::weights;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid genome: {_0}")]
    Policy(PolicyError),
    #[display("evaluation failed: {_0}")]
    Session(SessionError),
    #[display("invalid mutation parameters: {_0}")]
    Mutation(NormalError),
}

/// A candidate policy: its genome and the fitness it last achieved.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genome: Vec<f32>,
    fitness: f32,
}

impl Individual {
    /// Creates an individual with random, L1-normalized genes.
    pub fn random<R>(rng: &mut R, max_weight: f32, genome_len: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut genome = weights::random(rng, max_weight, genome_len);
        weights::normalize_l1(&mut genome);
        Self::from_genome(genome)
    }

    /// Creates an unevaluated individual from an existing genome.
    #[must_use]
    pub fn from_genome(genome: Vec<f32>) -> Self {
        Self {
            genome,
            fitness: f32::MIN,
        }
    }

    #[must_use]
    pub fn genome(&self) -> &[f32] {
        &self.genome
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Minimum, maximum and mean fitness of a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl FitnessStats {
    /// Returns `None` for an empty input.
    #[expect(clippy::cast_precision_loss)]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut count = 0_usize;
        let mut sum = 0.0;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f32,
        })
    }
}

/// Individuals evaluated together on the same feature set.
#[derive(Debug, Clone)]
pub struct Population {
    features: FeatureSet,
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates a population of `count` random individuals.
    #[must_use]
    pub fn random<R>(features: FeatureSet, count: usize, rng: &mut R, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        let genome_len = LinearPolicy::genome_len(&features);
        let individuals = (0..count)
            .map(|_| Individual::random(rng, max_weight, genome_len))
            .collect();
        Self {
            features,
            individuals,
        }
    }

    /// Replaces the last individual with `genome`.
    ///
    /// Used to inject a known policy into an otherwise random population.
    pub fn inject(&mut self, genome: Vec<f32>) -> Result<(), PolicyError> {
        let expected = LinearPolicy::genome_len(&self.features);
        if genome.len() != expected {
            return Err(PolicyError::WeightCount {
                expected,
                actual: genome.len(),
            });
        }
        let individual = Individual::from_genome(genome);
        match self.individuals.last_mut() {
            Some(last) => *last = individual,
            None => self.individuals.push(individual),
        }
        Ok(())
    }

    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Individuals, best first after [`Population::evaluate_fitness`].
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Builds the policy of every individual, in population order.
    pub fn policies(&self, config: &GameConfig) -> Result<Vec<LinearPolicy>, PolicyError> {
        self.individuals
            .iter()
            .map(|ind| LinearPolicy::from_genome(&self.features, config, &ind.genome))
            .collect()
    }

    /// Evaluates every individual and sorts the population best first.
    ///
    /// The population plays one batch session per seed; an individual's
    /// fitness is its mean over all sessions.
    pub fn evaluate_fitness(
        &mut self,
        evaluator: &BatchEvaluator,
        seeds: &[SimSeed],
    ) -> Result<PopulationEvaluation, TrainingError> {
        let policies = self.policies(evaluator.config())?;
        let evaluation = evaluator.evaluate_population(&policies, seeds)?;
        for (ind, fitness) in self.individuals.iter_mut().zip(evaluation.fitness()) {
            ind.fitness = fitness;
        }

        // sort by fitness descending
        self.individuals
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        if let Some(best) = self.individuals.first() {
            log::debug!(
                "evaluated {} individuals over {} sessions, best fitness {:.3}",
                self.individuals.len(),
                seeds.len(),
                best.fitness
            );
        }
        Ok(evaluation)
    }

    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().map(|ind| ind.fitness))
    }
}

/// Controls how one generation turns into the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged (elitism)
    pub elite_count: usize,
    /// Genes are clamped to `[-max_weight, max_weight]`
    pub max_weight: f32,
    /// Tournament size for selection (larger = stronger selection pressure)
    pub tournament_size: usize,
    /// Standard deviation for Gaussian mutation noise
    pub mutation_sigma: f32,
    /// BLX-α crossover parameter
    pub blx_alpha: f32,
    /// Probability of mutating each gene
    pub mutation_rate: f32,
}

impl PopulationEvolver {
    /// Creates the next generation.
    ///
    /// 1. Copies the top `elite_count` individuals unchanged
    /// 2. Fills the rest through tournament selection, crossover and mutation
    /// 3. L1-normalizes every child
    ///
    /// The population must be sorted best first, as left by
    /// [`Population::evaluate_fitness`].
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Result<Population, TrainingError>
    where
        R: Rng + ?Sized,
    {
        let individuals = &population.individuals;
        assert!(individuals.is_sorted_by(|a, b| a.fitness >= b.fitness));

        let elite_count = self.elite_count.min(individuals.len());
        let mut next_individuals = individuals[..elite_count].to_vec();
        while next_individuals.len() < individuals.len() {
            let (Some(p1), Some(p2)) = (
                tournament_select(individuals, self.tournament_size, rng),
                tournament_select(individuals, self.tournament_size, rng),
            ) else {
                break;
            };

            let mut child =
                weights::blx_alpha(&p1.genome, &p2.genome, self.blx_alpha, self.max_weight, rng);
            weights::mutate(
                &mut child,
                self.mutation_sigma,
                self.max_weight,
                self.mutation_rate,
                rng,
            )?;
            weights::normalize_l1(&mut child);
            next_individuals.push(Individual::from_genome(child));
        }

        Ok(Population {
            features: population.features.clone(),
            individuals: next_individuals,
        })
    }
}

/// Picks `tournament_size` distinct individuals and returns the fittest.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual>
where
    R: Rng + ?Sized,
{
    population
        .choose_multiple(rng, tournament_size.max(1))
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
}
