use crossterm::event::{Event, KeyCode};
use flappy_engine::{GameConfig, SensoryEncoder, Session, SessionError, SimSeed};
use flappy_evaluator::policy::LinearPolicy;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::{
    model::ai_model::AiModel,
    ui::widgets::{FlightStats, PlayState, SessionDisplay},
};

/// Steps simulated per tick while turbo is on.
const TURBO_STEPS: usize = 16;

#[derive(Debug)]
pub struct AutoPlayScreen {
    session: Session<LinearPolicy>,
    model_name: String,
    state: PlayState,
    best_score: u32,
    turbo: bool,
    is_exiting: bool,
}

impl AutoPlayScreen {
    pub fn new(
        model: &AiModel,
        config: GameConfig,
        seed: SimSeed,
        turbo: bool,
    ) -> anyhow::Result<Self> {
        let policy = model.to_policy(&config)?;
        let encoder = SensoryEncoder::new(model.features.clone());
        Ok(Self {
            session: Session::manual(config, encoder, policy, seed)?,
            model_name: model.name.clone(),
            state: PlayState::Playing,
            best_score: 0,
            turbo,
            is_exiting: false,
        })
    }

    pub fn is_playing(&self) -> bool {
        !self.is_exiting && self.state.is_playing()
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let stats = FlightStats::from_session(&self.session, self.best_score);
        let session_display = SessionDisplay::new(&self.session, stats, self.state)
            .turbo(self.turbo)
            .title(&self.model_name);
        let turbo_text = if self.turbo {
            "T (Turbo: ON)"
        } else {
            "T (Turbo: OFF)"
        };
        let help_text = match self.state {
            PlayState::Playing => format!("Controls: {turbo_text} | P (Pause) | Q (Quit)"),
            PlayState::Paused => "Controls: P (Resume) | Q (Quit)".to_owned(),
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(29), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help_text, help_area);
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Some(event) = event.as_key_event() {
            match event.code {
                KeyCode::Char('t') => self.turbo = !self.turbo,
                KeyCode::Char('p') => self.state = self.state.toggled(),
                KeyCode::Char('q') => self.is_exiting = true,
                _ => {}
            }
        }
    }

    pub fn update(&mut self) -> Result<(), SessionError> {
        let steps = if self.turbo { TURBO_STEPS } else { 1 };
        for _ in 0..steps {
            self.best_score = self.best_score.max(self.session.best_score());
            let report = self.session.step(&mut ())?;
            if report.reset {
                log::debug!("model crashed after {} steps", report.step);
            }
        }
        self.best_score = self.best_score.max(self.session.best_score());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use flappy_engine::FeatureSet;
    use flappy_evaluator::policy;

    use super::*;

    fn follower_model() -> AiModel {
        let config = GameConfig::default();
        let features = FeatureSet::basic();
        let policy = policy::gap_follower(&features, &config).unwrap();
        AiModel {
            name: "gap-follower".to_owned(),
            trained_at: DateTime::UNIX_EPOCH,
            final_fitness: 0.0,
            features,
            weights: policy.weights().to_vec(),
            bias: policy.bias(),
            config,
        }
    }

    #[test]
    fn test_turbo_runs_several_steps_per_tick() {
        let model = follower_model();
        let mut screen =
            AutoPlayScreen::new(&model, model.config.clone(), SimSeed::from_bytes([2; 16]), false)
                .unwrap();
        screen.update().unwrap();
        assert_eq!(screen.session.steps(), 1);

        screen.handle_event(&Event::Key(KeyCode::Char('t').into()));
        screen.update().unwrap();
        assert_eq!(screen.session.steps(), 1 + TURBO_STEPS as u64);
    }

    #[test]
    fn test_follower_model_scores() {
        let model = follower_model();
        let mut screen =
            AutoPlayScreen::new(&model, model.config.clone(), SimSeed::from_bytes([2; 16]), true)
                .unwrap();
        for _ in 0..100 {
            screen.update().unwrap();
        }
        assert_eq!(screen.session.resets(), 0);
        assert!(screen.best_score >= 5);
    }
}
