use std::iter;

use flappy_engine::{DecisionFunction, Session};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::style;

/// Values shown in the stats panel, captured from a session between steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightStats {
    pub score: u32,
    /// Best score across resets; the session itself forgets it on reset.
    pub best_score: u32,
    pub steps: u64,
    pub resets: u64,
    pub velocity: f32,
}

impl FlightStats {
    pub fn from_session<D>(session: &Session<D>, best_score: u32) -> Self
    where
        D: DecisionFunction,
    {
        let velocity = session
            .active_agents()
            .next()
            .map_or(0.0, |(_, agent)| agent.velocity());
        Self {
            score: session.best_score(),
            best_score: best_score.max(session.best_score()),
            steps: session.steps(),
            resets: session.resets(),
            velocity,
        }
    }
}

pub struct StatsDisplay<'a> {
    stats: FlightStats,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new(stats: FlightStats) -> Self {
        Self { stats, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        16 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        // ROWS is a short constant table
        #[expect(clippy::cast_possible_truncation)]
        let rows = ROWS.len() as u16;
        rows + super::block_vertical_margin(self.block.as_ref())
    }
}

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(&'static dyn Fn(&FlightStats) -> String),
    LabelValue(&'static str, &'static dyn Fn(&FlightStats) -> String),
}

const ROWS: &[Row] = &[
    Row::FullLabel("SCORE:"),
    Row::FullValue(&|stats| stats.score.to_string()),
    Row::FullLabel("BEST:"),
    Row::FullValue(&|stats| stats.best_score.to_string()),
    Row::Empty,
    Row::LabelValue("STEP:", &|stats| stats.steps.to_string()),
    Row::LabelValue("RESETS:", &|stats| stats.resets.to_string()),
    Row::LabelValue("SPEED:", &|stats| format!("{:+.2}", -stats.velocity)),
];

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;

        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value(&self.stats), style)
                        .right_aligned()
                        .render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                    Line::styled(value(&self.stats), style)
                        .right_aligned()
                        .render(area, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use flappy_engine::{ConstantDecision, GameConfig, SensoryEncoder, SimSeed};

    use super::*;

    #[test]
    fn test_best_score_survives_reset() {
        let encoder = SensoryEncoder::default();
        let decider = ConstantDecision::never_jump(encoder.arity());
        let mut session = Session::manual(
            GameConfig::default(),
            encoder,
            decider,
            SimSeed::from_bytes([1; 16]),
        )
        .unwrap();
        for _ in 0..10 {
            session.step(&mut ()).unwrap();
        }
        let stats = FlightStats::from_session(&session, 7);
        assert_eq!(stats.score, 0);
        assert_eq!(stats.best_score, 7);
        assert_eq!(stats.steps, 10);
        assert!(stats.velocity > 0.0);
    }

    #[test]
    fn test_render_lists_values() {
        let stats = FlightStats {
            score: 3,
            best_score: 12,
            steps: 420,
            resets: 2,
            velocity: -1.5,
        };
        let display = StatsDisplay::new(stats);
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        let lines: Vec<String> = (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect())
            .collect();
        assert_eq!(lines[0].trim(), "SCORE:");
        assert_eq!(lines[1].trim(), "3");
        assert_eq!(lines[3].trim(), "12");
        assert!(lines[5].starts_with("STEP:") && lines[5].ends_with("420"));
        assert!(lines[7].ends_with("+1.50"));
    }
}
