use crossterm::event::Event;
use flappy_engine::{GameConfig, SessionError, SimSeed};
use ratatui::Frame;

use crate::{
    command::play::screens::Screen,
    model::ai_model::AiModel,
    tui::{App, Tui},
};

/// Simulation steps per second, also used as the redraw rate.
const FPS: u32 = 60;

#[derive(Debug)]
pub struct PlayApp {
    screen: Screen,
    failure: Option<SessionError>,
}

impl PlayApp {
    pub fn manual(config: GameConfig, seed: SimSeed) -> anyhow::Result<Self> {
        Ok(Self {
            screen: Screen::manual(config, seed)?,
            failure: None,
        })
    }

    pub fn auto(
        model: &AiModel,
        config: GameConfig,
        seed: SimSeed,
        turbo: bool,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            screen: Screen::auto(model, config, seed, turbo)?,
            failure: None,
        })
    }

    /// Reports the error that stopped the session, if any.
    pub fn finish(self) -> anyhow::Result<()> {
        match self.failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_frame_rate(f64::from(FPS));
        tui.set_tick_rate(f64::from(FPS));
    }

    fn should_exit(&self) -> bool {
        self.failure.is_some() || self.screen.should_exit()
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        self.screen.handle_event(&event);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn update(&mut self, _tui: &mut Tui) {
        if self.screen.is_playing()
            && let Err(err) = self.screen.update()
        {
            log::error!("simulation stopped: {err}");
            self.failure = Some(err);
        }
    }
}
