use flappy_engine::{EntityKind, FieldConfig, Rect as WorldRect, RenderState, Tint};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{color, style};

/// Terminal cells used to show the play field.
///
/// With the default 240×135 field every cell covers 3×5 world units, which
/// roughly matches the aspect ratio of a terminal character.
const COLUMNS: u16 = 80;
const ROWS: u16 = 27;

/// Wing positions, indexed by the agent's animation frame.
const AGENT_FRAMES: [&str; 3] = ["▀", "█", "▄"];

/// Rasterizes the render states of a session onto a fixed character grid.
#[derive(Debug)]
pub struct FieldDisplay<'a> {
    field: FieldConfig,
    entities: Vec<(EntityKind, RenderState)>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> FieldDisplay<'a> {
    pub fn new<I>(field: FieldConfig, entities: I) -> Self
    where
        I: IntoIterator<Item = (EntityKind, RenderState)>,
    {
        Self {
            field,
            entities: entities.into_iter().collect(),
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        COLUMNS + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        ROWS + super::block_vertical_margin(self.block.as_ref())
    }

    /// World-space rectangle covered by the terminal cell at (`col`, `row`).
    fn cell_rect(&self, col: u16, row: u16) -> WorldRect {
        let width = self.field.width / f32::from(COLUMNS);
        let height = self.field.height / f32::from(ROWS);
        WorldRect::new(
            f32::from(col) * width,
            f32::from(row) * height,
            width,
            height,
        )
    }

    fn cell_appearance(&self, cell: &WorldRect) -> (&'static str, Style) {
        let mut appearance = (" ", style::SKY);
        // obstacles come before agents, so agents are drawn on top
        for (kind, state) in &self.entities {
            let rect = WorldRect::new(state.x, state.y, state.width, state.height);
            match kind {
                EntityKind::Obstacle(_) if contains(&rect, cell.center_x(), cell.center_y()) => {
                    let is_edge = cell.x < rect.x || cell.right() > rect.right();
                    appearance = (" ", if is_edge { style::PIPE_EDGE } else { style::PIPE });
                }
                EntityKind::Agent(_) if rect.overlaps(cell) => {
                    let frame = usize::from(state.visual_index) % AGENT_FRAMES.len();
                    let agent_style = Style::new().fg(tint_color(state.tint)).bg(color::SKY);
                    appearance = (AGENT_FRAMES[frame], agent_style);
                }
                EntityKind::Obstacle(_) | EntityKind::Agent(_) => {}
            }
        }
        appearance
    }
}

fn contains(rect: &WorldRect, x: f32, y: f32) -> bool {
    x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom()
}

fn tint_color(tint: Tint) -> Color {
    Color::Rgb(tint.r, tint.g, tint.b)
}

impl Widget for FieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &FieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        for row in 0..ROWS.min(area.height) {
            for col in 0..COLUMNS.min(area.width) {
                let (symbol, style) = self.cell_appearance(&self.cell_rect(col, row));
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(symbol).set_style(style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use flappy_engine::{ConstantDecision, GameConfig, ObstacleHalf, Session, SensoryEncoder, SimSeed};

    use super::*;

    fn render(display: &FieldDisplay<'_>) -> Buffer {
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        buf
    }

    #[test]
    fn test_agent_and_obstacle_are_drawn() {
        let config = GameConfig::default();
        let encoder = SensoryEncoder::default();
        let decider = ConstantDecision::never_jump(encoder.arity());
        let session =
            Session::manual(config.clone(), encoder, decider, SimSeed::from_bytes([3; 16])).unwrap();

        let pipe = RenderState {
            x: 118.0,
            y: 0.0,
            width: 21.0,
            height: 40.0,
            visual_index: 0,
            tint: Tint::WHITE,
        };
        let mut entities: Vec<_> = session.render_states().collect();
        let tint = session.agents()[0].tint();
        entities.push((EntityKind::Obstacle(ObstacleHalf::Top), pipe));
        let display = FieldDisplay::new(config.field, entities);
        let buf = render(&display);

        // agent spawns centered at (40, 67.5)
        assert!(AGENT_FRAMES.contains(&buf[(13, 13)].symbol()));
        assert_eq!(buf[(13, 13)].fg, tint_color(tint));
        assert_eq!(buf[(45, 2)].bg, color::PIPE);
        assert_eq!(buf[(39, 2)].bg, color::PIPE_EDGE);
        assert_eq!(buf[(38, 2)].bg, color::SKY);
        assert_eq!(buf[(45, 10)].bg, color::SKY);
        assert_eq!(buf[(70, 20)].bg, color::SKY);
    }

    #[test]
    fn test_block_adds_margins() {
        let display = FieldDisplay::new(FieldConfig::default(), []).block(BlockWidget::bordered());
        assert_eq!(display.width(), COLUMNS + 2);
        assert_eq!(display.height(), ROWS + 2);
        let buf = render(&display);
        assert_eq!(buf[(1, 1)].bg, color::SKY);
    }
}
