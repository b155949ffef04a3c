use flappy_engine::{DecisionFunction, Session};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{FieldDisplay, FlightStats, StatsDisplay, color, style};

/// Whether the simulation clock is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PlayState {
    Playing,
    Paused,
}

impl PlayState {
    pub fn toggled(self) -> Self {
        match self {
            PlayState::Playing => PlayState::Paused,
            PlayState::Paused => PlayState::Playing,
        }
    }
}

/// Play field and stats panel side by side.
#[derive(Debug)]
pub struct SessionDisplay<'a, D> {
    session: &'a Session<D>,
    stats: FlightStats,
    state: PlayState,
    turbo: bool,
    title: Option<&'a str>,
}

impl<'a, D> SessionDisplay<'a, D>
where
    D: DecisionFunction,
{
    pub fn new(session: &'a Session<D>, stats: FlightStats, state: PlayState) -> Self {
        Self {
            session,
            stats,
            state,
            turbo: false,
            title: None,
        }
    }

    pub fn turbo(self, turbo: bool) -> Self {
        Self { turbo, ..self }
    }

    /// Shown in the border of the play field.
    pub fn title(self, title: &'a str) -> Self {
        Self {
            title: Some(title),
            ..self
        }
    }
}

impl<D> Widget for SessionDisplay<'_, D>
where
    D: DecisionFunction,
{
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl<D> Widget for &SessionDisplay<'_, D>
where
    D: DecisionFunction,
{
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let border_style = match self.state {
            PlayState::Playing if self.turbo => color::MAGENTA,
            PlayState::Playing => color::WHITE,
            PlayState::Paused => color::YELLOW,
        };

        let field_block = {
            let block = Block::bordered()
                .border_style(border_style)
                .style(style::DEFAULT);
            match self.title {
                Some(title) => block.title(Line::from(title).centered()),
                None => block,
            }
        };
        let field = FieldDisplay::new(self.session.config().field, self.session.render_states())
            .block(field_block);
        let stats = StatsDisplay::new(self.stats).block(
            Block::bordered()
                .title(Line::from("STATS").centered())
                .padding(Padding::horizontal(1))
                .border_style(border_style)
                .style(style::DEFAULT),
        );

        let [field_column, stats_column] = Layout::horizontal([
            Constraint::Length(field.width()),
            Constraint::Length(stats.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let [field_area] = Layout::vertical([Constraint::Length(field.height())]).areas(field_column);
        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(stats_column);

        let field_width = field.width();
        field.render(field_area, buf);
        stats.render(stats_area, buf);

        if self.state.is_paused() {
            let style = Style::new().fg(color::BLACK).bg(color::YELLOW);
            let block = Block::new().style(style);
            let text = Text::styled("PAUSED", style).centered();
            let area = field_area.centered(Constraint::Length(field_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
