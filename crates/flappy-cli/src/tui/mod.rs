//! Minimal terminal runtime: fixed-rate simulation ticks, throttled redraws.
//!
//! ```text
//! loop until App::should_exit
//!   ├─ tick due     → App::update
//!   ├─ redraw due   → App::draw
//!   └─ input ready  → App::handle_event
//! ```

use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;

use self::event_loop::{EventLoop, TuiEvent};

mod event_loop;

/// Application driven by [`Tui::run`].
pub trait App {
    /// Called once before the first event; configure rates here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances application state by one tick.
    fn update(&mut self, tui: &mut Tui);
}

#[derive(Debug, Default)]
pub struct Tui {
    events: EventLoop,
}

impl Tui {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many times per second [`App::update`] is called.
    pub fn set_tick_rate(&mut self, rate: f64) {
        self.events
            .set_tick_interval(Some(Duration::from_secs_f64(rate.recip())));
    }

    /// Caps redraws at `rate` frames per second; state changes in between are batched.
    pub fn set_frame_rate(&mut self, rate: f64) {
        self.events
            .set_frame_interval(Duration::from_secs_f64(rate.recip()));
    }

    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Render => {
                        terminal.draw(|frame| app.draw(frame))?;
                    }
                    TuiEvent::Input(event) => app.handle_event(&mut self, event),
                }
            }
            Ok(())
        })
    }
}
