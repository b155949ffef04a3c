use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flappy_engine::{GameConfig, SimSeed};
use rand::Rng as _;

use crate::util;

use self::{evaluate::EvaluateArg, play::ManualPlayArg, train::TrainArg};

mod evaluate;
mod play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Fly through the gates yourself
    #[command(name = "play")]
    ManualPlay(#[clap(flatten)] play::ManualPlayArg),
    /// Watch a trained model fly
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] play::AutoPlayArg),
    /// Train a linear policy using a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Score a model over seeded headless sessions
    Evaluate(#[clap(flatten)] EvaluateArg),
}

impl Mode {
    /// Terminal UI modes only log warnings so log lines don't tear the screen.
    fn default_log_filter(&self) -> &'static str {
        match self {
            Mode::ManualPlay(_) | Mode::AutoPlay(_) => "warn",
            Mode::Train(_) | Mode::Evaluate(_) => "info",
        }
    }
}

/// World options shared by every command.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct WorldArg {
    /// Game constants as JSON; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulation seed (32 hex digits); random when omitted
    #[arg(long)]
    seed: Option<SimSeed>,
}

impl WorldArg {
    /// Reads `--config` if given, otherwise returns `fallback`.
    pub(crate) fn config_or(&self, fallback: GameConfig) -> anyhow::Result<GameConfig> {
        let config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => fallback,
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn seed(&self) -> SimSeed {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let mode = args
        .mode
        .unwrap_or(Mode::ManualPlay(ManualPlayArg::default()));
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(mode.default_log_filter()),
    )
    .init();

    match mode {
        Mode::ManualPlay(arg) => play::run_manual(&arg)?,
        Mode::AutoPlay(arg) => play::run_auto(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}
