use crossterm::event::Event;
use flappy_engine::{GameConfig, SessionError, SimSeed};
use ratatui::Frame;

use crate::{
    command::play::screens::{auto::AutoPlayScreen, manual::ManualPlayScreen},
    model::ai_model::AiModel,
};

mod auto;
mod manual;

#[derive(Debug)]
pub enum Screen {
    Manual(ManualPlayScreen),
    Auto(AutoPlayScreen),
}

impl Screen {
    pub fn manual(config: GameConfig, seed: SimSeed) -> anyhow::Result<Self> {
        Ok(Screen::Manual(ManualPlayScreen::new(config, seed)?))
    }

    pub fn auto(
        model: &AiModel,
        config: GameConfig,
        seed: SimSeed,
        turbo: bool,
    ) -> anyhow::Result<Self> {
        let screen = AutoPlayScreen::new(model, config, seed, turbo)?;
        Ok(Screen::Auto(screen))
    }

    pub fn is_playing(&self) -> bool {
        match self {
            Screen::Manual(screen) => screen.is_playing(),
            Screen::Auto(screen) => screen.is_playing(),
        }
    }

    pub fn should_exit(&self) -> bool {
        match self {
            Screen::Manual(screen) => screen.is_exiting(),
            Screen::Auto(screen) => screen.is_exiting(),
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        match self {
            Screen::Manual(screen) => screen.draw(frame),
            Screen::Auto(screen) => screen.draw(frame),
        }
    }

    pub(crate) fn handle_event(&mut self, event: &Event) {
        match self {
            Screen::Manual(screen) => screen.handle_event(event),
            Screen::Auto(screen) => screen.handle_event(event),
        }
    }

    pub fn update(&mut self) -> Result<(), SessionError> {
        match self {
            Screen::Manual(screen) => screen.update(),
            Screen::Auto(screen) => screen.update(),
        }
    }
}
