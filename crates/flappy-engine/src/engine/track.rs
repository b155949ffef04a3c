use rand::Rng as _;
use rand_pcg::Pcg32;

use crate::{
    FieldConfig, InvariantViolation, SimSeed, TrackConfig,
    core::obstacle::{Obstacle, ObstacleHalf},
};

/// RNG stream used for gate placement.
const TRACK_STREAM: u64 = 0;

/// The pair of obstacles an agent has to fly between.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    top: Obstacle,
    bottom: Obstacle,
}

impl Gate {
    #[must_use]
    pub fn top(&self) -> &Obstacle {
        &self.top
    }

    #[must_use]
    pub fn bottom(&self) -> &Obstacle {
        &self.bottom
    }

    /// Both halves, top first.
    #[must_use]
    pub fn obstacles(&self) -> [&Obstacle; 2] {
        [&self.top, &self.bottom]
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.top.x()
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.top.width()
    }

    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.top.collider().center_x()
    }

    /// Top edge of the passable opening.
    #[must_use]
    pub fn opening_top(&self) -> f32 {
        self.top.collider().bottom()
    }

    /// Bottom edge of the passable opening.
    #[must_use]
    pub fn opening_bottom(&self) -> f32 {
        self.bottom.y()
    }

    #[must_use]
    pub fn center_y(&self) -> f32 {
        f32::midpoint(self.opening_top(), self.opening_bottom())
    }
}

/// Scrolling source of gates.
///
/// The track owns exactly one [`Gate`] and recycles it forever: when the
/// top obstacle has fully left the field, both halves jump back to the
/// right edge and the gate height is re-rolled from the configured snap
/// points. Snap points are drawn uniformly from a PCG generator seeded by a
/// [`SimSeed`], so two tracks with the same seed produce the same gates.
///
/// The bottom obstacle is always exactly `gap` below the top one, at the
/// same x. [`ObstacleTrack::check_invariant`] reports a violation of either
/// property.
///
/// # Example
///
/// ```
/// use flappy_engine::{GameConfig, ObstacleTrack, SimSeed};
///
/// let config = GameConfig::default();
/// let mut track = ObstacleTrack::new(&config.field, &config.track, SimSeed::from_bytes([1; 16]));
///
/// assert!((track.current_gate().x() - 240.0).abs() < f32::EPSILON);
/// track.advance();
/// assert!((track.current_gate().x() - 239.0).abs() < f32::EPSILON);
/// track.check_invariant().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ObstacleTrack {
    gate: Gate,
    origin: f32,
    gap: f32,
    scroll_speed: f32,
    snap_points: Vec<f32>,
    rng: Pcg32,
    recycled_gates: u64,
}

impl ObstacleTrack {
    /// Creates a track with its first gate at the right edge of the field.
    ///
    /// `track.snap_points` must not be empty; see [`crate::GameConfig::validate`].
    #[must_use]
    pub fn new(field: &FieldConfig, track: &TrackConfig, seed: SimSeed) -> Self {
        let origin = field.width;
        let mut rng = seed.rng(TRACK_STREAM);
        let y = pick_snap_point(&mut rng, &track.snap_points);
        let gate = Gate {
            top: Obstacle::new(
                ObstacleHalf::Top,
                origin,
                y,
                track.obstacle_width,
                track.obstacle_height,
            ),
            bottom: Obstacle::new(
                ObstacleHalf::Bottom,
                origin,
                y + track.gap,
                track.obstacle_width,
                track.obstacle_height,
            ),
        };
        Self {
            gate,
            origin,
            gap: track.gap,
            scroll_speed: track.scroll_speed,
            snap_points: track.snap_points.clone(),
            rng,
            recycled_gates: 0,
        }
    }

    #[must_use]
    pub fn current_gate(&self) -> &Gate {
        &self.gate
    }

    /// Number of times the gate has been recycled since the last reset.
    #[must_use]
    pub fn recycled_gates(&self) -> u64 {
        self.recycled_gates
    }

    /// Scrolls the gate by one step.
    ///
    /// Returns `true` if the gate left the field during this step and was
    /// moved back to the origin with a new height.
    pub fn advance(&mut self) -> bool {
        self.gate.top.advance(self.scroll_speed);
        self.gate.bottom.advance(self.scroll_speed);
        if !self.gate.top.is_off_screen() {
            return false;
        }
        self.gate.top.reset_position(self.origin);
        self.gate.bottom.reset_position(self.origin);
        self.reroll_height();
        self.recycled_gates += 1;
        log::debug!(
            "gate recycled (#{}) at y={}",
            self.recycled_gates,
            self.gate.top.y()
        );
        true
    }

    /// Places a fresh gate at the origin.
    pub fn reset(&mut self) {
        self.gate.top.reset_position(self.origin);
        self.gate.bottom.reset_position(self.origin);
        self.reroll_height();
        self.recycled_gates = 0;
    }

    fn reroll_height(&mut self) {
        let y = pick_snap_point(&mut self.rng, &self.snap_points);
        self.gate.top.set_vertical_offset(y);
        self.gate.bottom.set_vertical_offset(y + self.gap);
    }

    #[expect(clippy::float_cmp)]
    pub fn check_invariant(&self) -> Result<(), InvariantViolation> {
        let Gate { top, bottom } = &self.gate;
        if bottom.y() != top.y() + self.gap {
            return Err(InvariantViolation::GapMismatch {
                expected: self.gap,
                actual: bottom.y() - top.y(),
            });
        }
        if bottom.x() != top.x() {
            return Err(InvariantViolation::MisalignedGate {
                top_x: top.x(),
                bottom_x: bottom.x(),
            });
        }
        Ok(())
    }
}

fn pick_snap_point(rng: &mut Pcg32, snap_points: &[f32]) -> f32 {
    if snap_points.is_empty() {
        return 0.0;
    }
    snap_points[rng.random_range(0..snap_points.len())]
}

#[cfg(test)]
mod tests {
    use crate::GameConfig;

    use super::*;

    fn track_with(config: &GameConfig, seed: u8) -> ObstacleTrack {
        ObstacleTrack::new(&config.field, &config.track, SimSeed::from_bytes([seed; 16]))
    }

    #[test]
    fn test_first_gate_at_origin_with_gap() {
        let config = GameConfig::default();
        let track = track_with(&config, 3);
        let gate = track.current_gate();
        assert!((gate.x() - config.field.width).abs() < f32::EPSILON);
        assert!(config.track.snap_points.contains(&gate.top().y()));
        assert!((gate.bottom().y() - gate.top().y() - config.track.gap).abs() < f32::EPSILON);
        assert!((gate.opening_bottom() - gate.opening_top() - 50.0).abs() < f32::EPSILON);
        track.check_invariant().unwrap();
    }

    #[test]
    fn test_recycles_once_fully_off_screen() {
        let config = GameConfig::default();
        let mut track = track_with(&config, 5);

        // x goes 240 -> -20 in 260 steps; right edge is then exactly at 0
        for _ in 0..260 {
            assert!(!track.advance());
        }
        assert!((track.current_gate().x() + 20.0).abs() < f32::EPSILON);

        assert!(track.advance());
        let gate = track.current_gate();
        assert!((gate.x() - config.field.width).abs() < f32::EPSILON);
        assert!((gate.bottom().x() - config.field.width).abs() < f32::EPSILON);
        assert!(config.track.snap_points.contains(&gate.top().y()));
        assert_eq!(track.recycled_gates(), 1);
        track.check_invariant().unwrap();
    }

    #[test]
    fn test_gap_preserved_over_many_recycles() {
        let config = GameConfig::default();
        let mut track = track_with(&config, 9);
        let mut heights = Vec::new();
        for _ in 0..100_000 {
            if track.advance() {
                heights.push(track.current_gate().top().y());
            }
            track.check_invariant().unwrap();
        }
        assert!(heights.len() > 300);
        for snap in &config.track.snap_points {
            assert!(heights.contains(snap), "snap point {snap} never drawn");
        }
    }

    #[test]
    fn test_same_seed_same_gates() {
        let config = GameConfig::default();
        let mut a = track_with(&config, 11);
        let mut b = track_with(&config, 11);
        for _ in 0..5_000 {
            a.advance();
            b.advance();
            assert_eq!(a.current_gate(), b.current_gate());
        }
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let config = GameConfig::default();
        let mut track = track_with(&config, 2);
        for _ in 0..400 {
            track.advance();
        }
        track.reset();
        assert!((track.current_gate().x() - config.field.width).abs() < f32::EPSILON);
        assert_eq!(track.recycled_gates(), 0);
        track.check_invariant().unwrap();
    }

    #[test]
    fn test_gap_mismatch_is_reported() {
        let config = GameConfig::default();
        let mut track = track_with(&config, 1);
        track.gate.bottom.set_vertical_offset(track.gate.top.y() + 1.0);
        assert!(matches!(
            track.check_invariant(),
            Err(InvariantViolation::GapMismatch { .. })
        ));

        let mut track = track_with(&config, 1);
        track.gate.bottom.advance(1.0);
        assert!(matches!(
            track.check_invariant(),
            Err(InvariantViolation::MisalignedGate { .. })
        ));
    }
}
