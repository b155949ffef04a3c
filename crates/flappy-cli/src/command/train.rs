use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use flappy_engine::{FeatureSet, GameConfig, SimSeed};
use flappy_evaluator::{policy, session_evaluator::BatchEvaluator};
use flappy_training::genetic::{Population, PopulationEvolver};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    command::WorldArg,
    model::{ai_model::AiModel, history::GenerationRecord},
    util::Output,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
enum EvolutionPhase {
    #[default]
    Exploration,
    Transition,
    Convergence,
}

impl EvolutionPhase {
    fn from_generation(generation: usize) -> Self {
        match generation {
            0..30 => Self::Exploration,
            30..80 => Self::Transition,
            _ => Self::Convergence,
        }
    }
}

const ELITE_COUNT: usize = 2;
const TOURNAMENT_SIZE: usize = 2;

const fn max_weight_by_phase(phase: EvolutionPhase) -> f32 {
    match phase {
        EvolutionPhase::Exploration => 0.5,
        EvolutionPhase::Transition => 0.8,
        EvolutionPhase::Convergence => 1.0,
    }
}

const MUTATION_RATE: f32 = 0.3;
const fn mutation_sigma_by_phase(phase: EvolutionPhase) -> f32 {
    match phase {
        EvolutionPhase::Exploration => 0.1,
        EvolutionPhase::Transition => 0.05,
        EvolutionPhase::Convergence => 0.02,
    }
}

const BLX_ALPHA: f32 = 0.2;

const fn evolver_by_phase(phase: EvolutionPhase) -> PopulationEvolver {
    PopulationEvolver {
        elite_count: ELITE_COUNT,
        tournament_size: TOURNAMENT_SIZE,
        max_weight: max_weight_by_phase(phase),
        mutation_sigma: mutation_sigma_by_phase(phase),
        blx_alpha: BLX_ALPHA,
        mutation_rate: MUTATION_RATE,
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of generations to evolve
    #[arg(long, default_value_t = 200)]
    generations: usize,
    /// Individuals per generation
    #[arg(long, default_value_t = 30)]
    population: usize,
    /// Batch sessions per generation; fitness is averaged over them
    #[arg(long, default_value_t = 3)]
    sessions: usize,
    /// Steps after which a batch session is cut off
    #[arg(long, default_value_t = 5000)]
    step_limit: u64,
    /// Sensor inputs: basic, head, extended, full, or a comma-separated list
    #[arg(long, default_value = "basic")]
    features: FeatureSet,
    /// Seed the first generation with the hand-written gap follower
    #[arg(long)]
    baseline: bool,
    /// Name stored in the model file
    #[arg(long, default_value = "trained")]
    name: String,
    /// Output file path for the model
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write per-generation statistics to this file as JSON lines
    #[arg(long)]
    history: Option<PathBuf>,
    #[clap(flatten)]
    world: WorldArg,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        generations,
        population: population_count,
        sessions,
        step_limit,
        features,
        baseline,
        name,
        output,
        history,
        world,
    } = arg;
    anyhow::ensure!(*population_count > 0, "population must not be empty");
    anyhow::ensure!(*sessions > 0, "at least one session per generation is needed");

    let config = world.config_or(GameConfig::default())?;
    let seed = world.seed();
    log::info!("training {name} on [{features}] with master seed {seed}");

    let evaluator = BatchEvaluator::new(config.clone(), features.clone(), *step_limit);
    let mut history_output = history.clone().map(Output::create).transpose()?;
    let mut rng = Pcg32::from_seed(seed.to_bytes());

    let mut population = Population::random(
        features.clone(),
        *population_count,
        &mut rng,
        max_weight_by_phase(EvolutionPhase::default()),
    );
    if *baseline {
        let follower = policy::gap_follower(features, &config)
            .context("--baseline needs rel_y_to_gap in the feature set")?;
        let mut genome = follower.weights().to_vec();
        genome.push(follower.bias());
        population.inject(genome)?;
    }

    for generation in 0..*generations {
        let phase = EvolutionPhase::from_generation(generation);
        eprintln!("Generation #{generation} ({phase}):");
        let evolver = evolver_by_phase(phase);
        let seeds: Vec<SimSeed> = (0..*sessions).map(|_| rng.random()).collect();
        let evaluation = population.evaluate_fitness(&evaluator, &seeds)?;
        let fitness_stats = population
            .compute_fitness_stats()
            .context("population is empty")?;

        eprintln!("  Best Individuals:");
        for (i, ind) in population.individuals().iter().take(5).enumerate() {
            eprintln!("  {i:2}: {:.3?} => {:.3}", ind.genome(), ind.fitness());
        }
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:  {:.3}", fitness_stats.min);
        eprintln!("    Max:  {:.3}", fitness_stats.max);
        eprintln!("    Mean: {:.3}", fitness_stats.mean);
        log::info!(
            "generation {generation}: best score {}, {:.1} survivors, {:.0} steps",
            evaluation.best_score(),
            evaluation.mean_survivors(),
            evaluation.mean_steps()
        );

        if let Some(history_output) = &mut history_output {
            history_output.write_json_line(&GenerationRecord {
                generation,
                phase: phase.to_string(),
                best_fitness: fitness_stats.max,
                mean_fitness: fitness_stats.mean,
                best_score: evaluation.best_score(),
                survivors: evaluation.mean_survivors(),
                steps: evaluation.mean_steps(),
            })?;
        }

        if generation + 1 < *generations {
            population = evolver.evolve(&population, &mut rng)?;
        }
    }

    eprintln!("Training completed.");

    let best_individual = population.best().context("population is empty")?;
    let Some((&bias, weights)) = best_individual.genome().split_last() else {
        anyhow::bail!("best individual has an empty genome");
    };
    let model = AiModel {
        name: name.clone(),
        trained_at: Utc::now(),
        final_fitness: best_individual.fitness(),
        features: features.clone(),
        weights: weights.to_vec(),
        bias,
        config,
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    eprintln!("  Weights: {} features", model.weights.len());
    if let Some(history_output) = &history_output {
        eprintln!("  History: {}", history_output.display_path());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_follow_generations() {
        assert_eq!(EvolutionPhase::from_generation(0), EvolutionPhase::Exploration);
        assert_eq!(EvolutionPhase::from_generation(30), EvolutionPhase::Transition);
        assert_eq!(EvolutionPhase::from_generation(80), EvolutionPhase::Convergence);
        assert_eq!(EvolutionPhase::Transition.to_string(), "Transition");
    }

    #[test]
    fn test_evolver_tightens_over_phases() {
        let early = evolver_by_phase(EvolutionPhase::Exploration);
        let late = evolver_by_phase(EvolutionPhase::Convergence);
        assert!(early.mutation_sigma > late.mutation_sigma);
        assert!(early.max_weight < late.max_weight);
    }
}
