use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{field_display::*, session_display::*, stats_display::*};

mod field_display;
mod session_display;
mod stats_display;

mod color {
    use ratatui::style::Color;

    pub const SKY: Color = Color::Rgb(24, 32, 56);
    pub const PIPE: Color = Color::Rgb(64, 176, 72);
    pub const PIPE_EDGE: Color = Color::Rgb(32, 112, 40);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const MAGENTA: Color = Color::Rgb(255, 0, 255);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
}

pub mod style {
    use ratatui::style::{Color, Style};

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    const fn bg_only(color: Color) -> Style {
        Style::new().fg(color).bg(color)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const SKY: Style = bg_only(color::SKY);
    pub const PIPE: Style = bg_only(color::PIPE);
    pub const PIPE_EDGE: Style = bg_only(color::PIPE_EDGE);
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
