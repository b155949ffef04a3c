use std::time::{Duration, Instant};

use crossterm::event::{self, Event};

#[derive(Debug, Clone)]
pub(super) enum TuiEvent {
    Tick,
    Render,
    Input(Event),
}

/// Schedules ticks, redraws and input polling.
///
/// A redraw happens only when something changed since the last one (a tick or
/// an input event) and at least one frame interval has passed.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    frame_interval: Duration,
    last_tick: Instant,
    last_render: Option<Instant>,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self {
            tick_interval: None,
            frame_interval: Duration::ZERO,
            last_tick: Instant::now(),
            last_render: None,
            dirty: true,
        }
    }
}

impl EventLoop {
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    pub(super) fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval;
    }

    fn next_tick_at(&self) -> Option<Instant> {
        self.tick_interval.map(|interval| self.last_tick + interval)
    }

    fn next_render_at(&self, now: Instant) -> Option<Instant> {
        if !self.dirty {
            return None;
        }
        Some(
            self.last_render
                .map_or(now, |last| last + self.frame_interval),
        )
    }

    /// Blocks until the next tick, redraw or input event.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if self.next_tick_at().is_some_and(|at| at <= now) {
                self.last_tick = now;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }
            if self.next_render_at(now).is_some_and(|at| at <= now) {
                self.last_render = Some(now);
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            let deadline = [self.next_tick_at(), self.next_render_at(now)]
                .into_iter()
                .flatten()
                .min();
            let ready = match deadline {
                Some(at) => event::poll(at.saturating_duration_since(now))?,
                None => true,
            };
            if ready {
                self.dirty = true;
                return Ok(TuiEvent::Input(event::read()?));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_only_when_dirty() {
        let mut events = EventLoop::default();
        let now = Instant::now();
        assert_eq!(events.next_render_at(now), Some(now));

        events.dirty = false;
        events.last_render = Some(now);
        assert_eq!(events.next_render_at(now), None);

        events.set_frame_interval(Duration::from_millis(16));
        events.dirty = true;
        assert_eq!(
            events.next_render_at(now),
            Some(now + Duration::from_millis(16))
        );
    }

    #[test]
    fn test_ticks_disabled_by_default() {
        let mut events = EventLoop::default();
        assert_eq!(events.next_tick_at(), None);
        events.set_tick_interval(Some(Duration::from_millis(10)));
        assert_eq!(
            events.next_tick_at(),
            Some(events.last_tick + Duration::from_millis(10))
        );
    }
}
