use crossterm::event::{Event, KeyCode};
use flappy_engine::{GameConfig, HumanInput, SensoryEncoder, Session, SessionError, SimSeed};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::ui::widgets::{FlightStats, PlayState, SessionDisplay};

#[derive(Debug)]
pub struct ManualPlayScreen {
    session: Session<HumanInput>,
    state: PlayState,
    best_score: u32,
    is_exiting: bool,
}

impl ManualPlayScreen {
    pub fn new(config: GameConfig, seed: SimSeed) -> Result<Self, SessionError> {
        let encoder = SensoryEncoder::default();
        let input = HumanInput::new(encoder.arity());
        Ok(Self {
            session: Session::manual(config, encoder, input, seed)?,
            state: PlayState::Playing,
            best_score: 0,
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
        let session_display = SessionDisplay::new(&self.session, stats, self.state);
        let help_text = match self.state {
            PlayState::Playing => "Controls: Space/↑ (Flap) | R (Restart) | P (Pause) | Q (Quit)",
            PlayState::Paused => "Controls: P (Resume) | Q (Quit)",
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
        let is_playing = self.is_playing();

        if let Some(event) = event.as_key_event() {
            match event.code {
                KeyCode::Char(' ') | KeyCode::Up if is_playing => self.flap(),
                KeyCode::Char('r') if is_playing => self.restart(),
                KeyCode::Char('p') => self.state = self.state.toggled(),
                KeyCode::Char('q') => self.is_exiting = true,
                _ => {}
            }
        }
    }

    /// Latches a jump request; the next step consumes it.
    fn flap(&mut self) {
        let player = self.session.active_agents().next().map(|(id, _)| id);
        if let Some(input) = player.and_then(|id| self.session.decider_mut(id)) {
            input.press();
        }
    }

    fn restart(&mut self) {
        self.best_score = self.best_score.max(self.session.best_score());
        self.session.reset();
    }

    pub fn update(&mut self) -> Result<(), SessionError> {
        // a crash resets the session score, so record it first
        self.best_score = self.best_score.max(self.session.best_score());
        let report = self.session.step(&mut ())?;
        if report.reset {
            log::debug!("crashed after {} steps", report.step);
        }
        self.best_score = self.best_score.max(self.session.best_score());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen() -> ManualPlayScreen {
        ManualPlayScreen::new(GameConfig::default(), SimSeed::from_bytes([5; 16])).unwrap()
    }

    #[test]
    fn test_flap_lifts_the_agent() {
        let mut idle = screen();
        let mut flapping = screen();
        flapping.handle_event(&key(KeyCode::Char(' ')));
        for _ in 0..5 {
            idle.update().unwrap();
            flapping.update().unwrap();
        }
        let y = |screen: &ManualPlayScreen| screen.session.agents()[0].y();
        assert!(y(&flapping) < y(&idle));
    }

    #[test]
    fn test_pause_stops_updates_and_quit_exits() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Char('p')));
        assert!(!screen.is_playing());
        screen.handle_event(&key(KeyCode::Char('p')));
        assert!(screen.is_playing());
        screen.handle_event(&key(KeyCode::Char('q')));
        assert!(screen.is_exiting());
        assert!(!screen.is_playing());
    }

    #[test]
    fn test_restart_counts_a_reset() {
        let mut screen = screen();
        for _ in 0..10 {
            screen.update().unwrap();
        }
        screen.handle_event(&key(KeyCode::Char('r')));
        assert_eq!(screen.session.steps(), 0);
        assert_eq!(screen.session.resets(), 1);
    }
}
