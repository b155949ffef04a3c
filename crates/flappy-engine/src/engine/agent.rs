use serde::{Deserialize, Serialize};

use crate::{
    AgentConfig, GameConfig, ObstacleTrack,
    core::{rect::Rect, sensor::SensorReadings},
};

/// Lifecycle state of an agent.
///
/// `Colliding` lasts for the single step on which a collision was signalled.
/// `Dead` is assigned by the session when the agent leaves the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum AgentStatus {
    Alive,
    Colliding,
    Dead,
}

/// Cosmetic color multiplier applied to an agent's sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
}

/// Step-counting cooldown; `active` while the counter is non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cooldown(u32);

impl Cooldown {
    fn start(&mut self, steps: u32) {
        self.0 = steps;
    }

    /// Counts one step down. Returns `true` on the step the cooldown expires.
    fn tick(&mut self) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        self.0 == 0
    }

    fn is_active(self) -> bool {
        self.0 > 0
    }
}

/// A controllable flier.
///
/// The agent holds its physics state and three cooldowns:
///
/// - **jump**: minimum number of steps between two accepted jumps
/// - **hit**: invulnerability window after a collision, so a persistent
///   overlap is reported once per window instead of every step
/// - **score**: suppresses scoring while the agent is still inside the gate
///   it just scored on
///
/// # Per-step Update
///
/// [`Agent::update`] performs, in order:
///
/// 1. readings relative to the current gate
/// 2. hit/score cooldown countdown
/// 3. gravity, velocity clamp and position integration
/// 4. collision test against both obstacles (skipped inside the hit window)
/// 5. scoring when strictly inside the gate's horizontal span
/// 6. out-of-bounds test (debounced by the same hit window)
/// 7. jump cooldown countdown
///
/// # Example
///
/// ```
/// use flappy_engine::{Agent, GameConfig, ObstacleTrack, SimSeed};
///
/// let config = GameConfig::default();
/// let track = ObstacleTrack::new(&config.field, &config.track, SimSeed::from_bytes([0; 16]));
/// let mut agent = Agent::new(&config);
///
/// let collided = agent.update(&track);
/// assert!(!collided);
/// assert!(agent.velocity() > 0.0); // gravity pulls down
///
/// agent.jump();
/// agent.update(&track);
/// assert!(agent.velocity() < 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Agent {
    params: AgentConfig,
    play_height: f32,
    spawn: (f32, f32),
    collider: Rect,
    velocity: f32,
    score: u32,
    status: AgentStatus,
    can_jump: bool,
    jump_cooldown: Cooldown,
    hit_cooldown: Cooldown,
    can_score: bool,
    score_cooldown: Cooldown,
    animation_phase: f32,
    tint: Tint,
    readings: SensorReadings,
}

impl Agent {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let spawn = (config.spawn_x(), config.spawn_y());
        Self {
            params: config.agent,
            play_height: config.field.height,
            spawn,
            collider: Rect::new(spawn.0, spawn.1, config.agent.width, config.agent.height),
            velocity: 0.0,
            score: 0,
            status: AgentStatus::Alive,
            can_jump: true,
            jump_cooldown: Cooldown::default(),
            hit_cooldown: Cooldown::default(),
            can_score: true,
            score_cooldown: Cooldown::default(),
            animation_phase: 0.0,
            tint: Tint::WHITE,
            readings: SensorReadings::default(),
        }
    }

    /// Returns the agent to its spawn state with a new tint.
    pub fn reset(&mut self, tint: Tint) {
        self.collider.x = self.spawn.0;
        self.collider.y = self.spawn.1;
        self.velocity = 0.0;
        self.score = 0;
        self.status = AgentStatus::Alive;
        self.can_jump = true;
        self.jump_cooldown = Cooldown::default();
        self.hit_cooldown = Cooldown::default();
        self.can_score = true;
        self.score_cooldown = Cooldown::default();
        self.animation_phase = 0.0;
        self.tint = tint;
        self.readings = SensorReadings::default();
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.collider.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.collider.y
    }

    #[must_use]
    pub fn collider(&self) -> &Rect {
        &self.collider
    }

    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn status(&self) -> AgentStatus {
        self.status
    }

    #[must_use]
    pub fn can_jump(&self) -> bool {
        self.can_jump
    }

    /// Returns `true` while collisions are being ignored.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.hit_cooldown.is_active()
    }

    #[must_use]
    pub fn tint(&self) -> Tint {
        self.tint
    }

    pub fn set_tint(&mut self, tint: Tint) {
        self.tint = tint;
    }

    /// Current sprite frame index.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn animation_frame(&self) -> u8 {
        self.animation_phase.floor() as u8
    }

    /// Readings captured during the last [`Agent::update`].
    #[must_use]
    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }

    pub(crate) fn mark_dead(&mut self) {
        self.status = AgentStatus::Dead;
    }

    /// Applies the jump impulse if the jump cooldown has elapsed.
    ///
    /// Jumping while on cooldown is silently ignored.
    pub fn jump(&mut self) {
        if !self.can_jump {
            return;
        }
        self.velocity -= self.params.jump_impulse;
        self.can_jump = false;
        self.jump_cooldown.start(self.params.jump_cooldown);
    }

    /// Advances the agent by one step against the current gate.
    ///
    /// Returns `true` if a collision (obstacle or out of bounds) was signalled.
    pub fn update(&mut self, track: &ObstacleTrack) -> bool {
        self.sense(track);
        self.advance_animation();

        self.hit_cooldown.tick();
        if self.score_cooldown.tick() {
            self.can_score = true;
        }

        let max_v = self.params.max_velocity;
        self.velocity = (self.velocity + self.params.gravity).clamp(-max_v, max_v);
        self.collider.y += self.velocity;

        let gate = track.current_gate();
        let mut collision = false;
        if !self.hit_cooldown.is_active()
            && gate
                .obstacles()
                .iter()
                .any(|obstacle| self.collider.overlaps(obstacle.collider()))
        {
            collision = true;
            self.hit_cooldown.start(self.params.hit_cooldown);
        }

        if self.can_score && gate.x() < self.x() && self.x() < gate.x() + gate.width() {
            self.score += 1;
            self.can_score = false;
            self.score_cooldown.start(self.params.score_cooldown);
        }

        if !self.hit_cooldown.is_active() && self.is_out_of_bounds() {
            collision = true;
            self.hit_cooldown.start(self.params.hit_cooldown);
        }

        if self.jump_cooldown.tick() {
            self.can_jump = true;
        }

        self.status = if collision {
            AgentStatus::Colliding
        } else {
            AgentStatus::Alive
        };
        self.readings.velocity = self.velocity;
        self.readings.score = self.score;
        self.readings.collision = collision;
        collision
    }

    fn sense(&mut self, track: &ObstacleTrack) {
        let gate = track.current_gate();
        let center_y = self.collider.center_y();
        let dx = gate.center_x() - self.collider.center_x();
        let dy = gate.center_y() - center_y;
        self.readings = SensorReadings {
            y: center_y,
            velocity: self.velocity,
            score: self.score,
            collision: false,
            distance_to_gate: dx.hypot(dy),
            distance_to_gate_x: dx,
            gap_center_y: gate.center_y(),
            rel_y_to_gap: center_y - gate.center_y(),
        };
    }

    fn advance_animation(&mut self) {
        self.animation_phase += self.params.animation_speed;
        if self.animation_phase >= f32::from(self.params.animation_frames) {
            self.animation_phase = 0.0;
        }
    }

    fn is_out_of_bounds(&self) -> bool {
        let half_height = self.params.height / 2.0;
        self.y() < -half_height || self.y() > self.play_height + half_height
    }
}

#[cfg(test)]
mod tests {
    use crate::{SimSeed, TrackConfig};

    use super::*;

    fn setup(track: TrackConfig) -> (GameConfig, ObstacleTrack) {
        let config = GameConfig {
            track,
            ..GameConfig::default()
        };
        let seed = SimSeed::from_bytes([4; 16]);
        let obstacles = ObstacleTrack::new(&config.field, &config.track, seed);
        (config, obstacles)
    }

    #[test]
    fn test_velocity_clamped_for_any_jump_pattern() {
        let (config, track) = setup(TrackConfig::default());
        let max_v = config.agent.max_velocity;
        let mut agent = Agent::new(&config);
        // pseudo-random but fixed jump pattern
        let mut state = 0x2545_f491_u32;
        for _ in 0..2_000 {
            agent.update(&track);
            assert!((-max_v..=max_v).contains(&agent.velocity()));
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if state % 3 == 0 {
                agent.jump();
            }
        }
    }

    #[test]
    fn test_jump_rate_limited() {
        let (config, track) = setup(TrackConfig::default());
        let mut agent = Agent::new(&config);
        assert!(agent.can_jump());
        agent.jump();
        let after_first = agent.velocity();
        agent.jump();
        assert!((agent.velocity() - after_first).abs() < f32::EPSILON);
        assert!(!agent.can_jump());

        for _ in 1..config.agent.jump_cooldown {
            agent.update(&track);
            assert!(!agent.can_jump());
        }
        agent.update(&track);
        assert!(agent.can_jump());
    }

    #[test]
    fn test_readings_relative_to_gate() {
        let (config, track) = setup(TrackConfig {
            snap_points: vec![-48.0],
            ..TrackConfig::default()
        });
        let mut agent = Agent::new(&config);
        agent.update(&track);
        let readings = agent.readings();
        // opening spans [32, 82]
        assert!((readings.gap_center_y - 57.0).abs() < 1e-4);
        assert!((readings.y - 67.5).abs() < 1e-4);
        assert!((readings.rel_y_to_gap - 10.5).abs() < 1e-4);
        // gate center 250, agent center 40
        assert!((readings.distance_to_gate_x - 210.0).abs() < 1e-4);
        assert!((readings.distance_to_gate - 210.0_f32.hypot(10.5)).abs() < 1e-3);
        assert!(!readings.collision);
    }

    #[test]
    fn test_one_point_per_gate() {
        // a gate wide open around the flight path
        let (config, mut track) = setup(TrackConfig {
            snap_points: vec![-80.0],
            gap: 300.0,
            ..TrackConfig::default()
        });
        let mut agent = Agent::new(&config);
        let mut scores = Vec::new();
        for _ in 0..1_000 {
            track.advance();
            let before = agent.score();
            agent.update(&track);
            assert!(agent.score() >= before);
            scores.push(agent.score());
            if agent.velocity() > 0.0 {
                agent.jump();
            }
        }
        // the gate passes the agent x every 261 steps
        assert_eq!(agent.score(), 4);
        assert!(scores.windows(2).all(|w| w[1] - w[0] <= 1));
    }

    #[test]
    fn test_collision_debounced_by_hit_window() {
        let (config, track) = setup(TrackConfig::default());
        let hit = config.agent.hit_cooldown as usize;
        let mut agent = Agent::new(&config);

        let mut collisions = Vec::new();
        for step in 0..200 {
            if agent.update(&track) {
                collisions.push(step);
                assert!(agent.status().is_colliding());
            } else {
                assert!(agent.status().is_alive());
            }
        }
        // falling through the floor keeps the agent out of bounds
        assert!(collisions.len() >= 3);
        for pair in collisions.windows(2) {
            assert_eq!(pair[1] - pair[0], hit);
        }
    }

    #[test]
    fn test_animation_cycles_through_frames() {
        let (config, track) = setup(TrackConfig::default());
        let mut agent = Agent::new(&config);
        let frames: Vec<u8> = (0..8)
            .map(|_| {
                agent.update(&track);
                agent.animation_frame()
            })
            .collect();
        assert_eq!(frames, [0, 1, 1, 2, 2, 0, 0, 1]);
    }

    #[test]
    fn test_reset_restores_spawn() {
        let (config, track) = setup(TrackConfig::default());
        let mut agent = Agent::new(&config);
        for _ in 0..100 {
            agent.update(&track);
        }
        agent.reset(Tint { r: 1, g: 2, b: 3 });
        assert!((agent.y() - config.spawn_y()).abs() < f32::EPSILON);
        assert!(agent.velocity().abs() < f32::EPSILON);
        assert_eq!(agent.score(), 0);
        assert!(agent.can_jump());
        assert!(!agent.is_invulnerable());
        assert_eq!(agent.tint(), Tint { r: 1, g: 2, b: 3 });
    }
}
