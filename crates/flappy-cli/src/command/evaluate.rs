use std::path::PathBuf;

use anyhow::Context as _;
use flappy_engine::{FeatureSet, GameConfig, SimSeed};
use flappy_evaluator::{
    policy::{self, LinearPolicy},
    session_evaluator::BatchEvaluator,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{command::WorldArg, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Path to the model file (JSON format)
    #[arg(required_unless_present = "baseline")]
    model_path: Option<PathBuf>,
    /// Also evaluate the hand-written gap follower for comparison
    #[arg(long)]
    baseline: bool,
    /// Number of seeded sessions
    #[arg(long, default_value_t = 10)]
    sessions: usize,
    /// Steps after which a session is cut off
    #[arg(long, default_value_t = 10_000)]
    step_limit: u64,
    #[clap(flatten)]
    world: WorldArg,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        model_path,
        baseline,
        sessions,
        step_limit,
        world,
    } = arg;
    anyhow::ensure!(*sessions > 0, "at least one session is needed");

    let model = model_path
        .as_ref()
        .map(util::read_ai_model_file)
        .transpose()?;
    let fallback = model
        .as_ref()
        .map_or_else(GameConfig::default, |model| model.config.clone());
    let config = world.config_or(fallback)?;
    let features = model
        .as_ref()
        .map_or_else(FeatureSet::basic, |model| model.features.clone());

    let mut names = vec![];
    let mut policies: Vec<LinearPolicy> = vec![];
    if let Some(model) = &model {
        names.push(model.name.clone());
        policies.push(model.to_policy(&config)?);
    }
    if *baseline {
        let follower = policy::gap_follower(&features, &config)
            .context("--baseline needs rel_y_to_gap in the feature set")?;
        names.push("gap-follower".to_owned());
        policies.push(follower);
    }

    let master_seed = world.seed();
    let mut rng = Pcg32::from_seed(master_seed.to_bytes());
    let seeds: Vec<SimSeed> = (0..*sessions).map(|_| rng.random()).collect();
    log::info!(
        "evaluating {} policies over {sessions} sessions (master seed {master_seed})",
        policies.len()
    );

    let evaluator = BatchEvaluator::new(config, features, *step_limit);
    let evaluation = evaluator.evaluate_population(&policies, &seeds)?;

    println!("Sessions:");
    for session in evaluation.sessions() {
        let end = if session.terminated {
            "all crashed"
        } else {
            "step limit"
        };
        println!("  {} ({end} after {} steps)", session.seed, session.steps);
        for (name, agent) in names.iter().zip(&session.agents) {
            println!(
                "    {name:>16}: score {:4}, alive {:6} steps, fitness {:10.3}",
                agent.score, agent.alive_steps, agent.fitness
            );
        }
    }

    println!("Mean fitness:");
    for (name, fitness) in names.iter().zip(evaluation.fitness()) {
        println!("  {name:>16}: {fitness:.3}");
    }
    println!("Best score: {}", evaluation.best_score());
    println!("Mean survivors: {:.2}", evaluation.mean_survivors());
    println!("Mean steps: {:.1}", evaluation.mean_steps());

    Ok(())
}
