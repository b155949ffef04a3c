use std::path::PathBuf;

use flappy_engine::GameConfig;

use crate::{
    command::{WorldArg, play::app::PlayApp},
    tui::Tui,
    util,
};

mod app;
mod screens;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ManualPlayArg {
    #[clap(flatten)]
    world: WorldArg,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Path to the model file (JSON format)
    model_path: PathBuf,
    /// Run in turbo mode
    #[clap(long, default_value_t = false)]
    turbo: bool,
    #[clap(flatten)]
    world: WorldArg,
}

pub(crate) fn run_manual(arg: &ManualPlayArg) -> anyhow::Result<()> {
    let ManualPlayArg { world } = arg;

    let config = world.config_or(GameConfig::default())?;
    let seed = world.seed();
    log::info!("starting manual play with seed {seed}");

    let mut app = PlayApp::manual(config, seed)?;
    Tui::new().run(&mut app)?;
    app.finish()
}

pub(crate) fn run_auto(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        model_path,
        turbo,
        world,
    } = arg;

    let model = util::read_ai_model_file(model_path)?;
    let config = world.config_or(model.config.clone())?;
    let seed = world.seed();
    log::info!("auto-playing model {} with seed {seed}", model.name);

    let mut app = PlayApp::auto(&model, config, seed, *turbo)?;
    Tui::new().run(&mut app)?;
    app.finish()
}
