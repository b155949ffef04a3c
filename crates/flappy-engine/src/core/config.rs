use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete set of simulation constants.
///
/// All timers are measured in simulation steps; the host decides how many steps
/// run per second. Every field has a default matching the classic 240×135 play
/// field, so a partial JSON document only needs to name the values it overrides:
///
/// ```
/// use flappy_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "agent": { "gravity": 0.2 } }"#).unwrap();
/// assert!((config.agent.gravity - 0.2).abs() < f32::EPSILON);
/// assert!((config.field.width - 240.0).abs() < f32::EPSILON);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub agent: AgentConfig,
    pub track: TrackConfig,
}

/// Dimensions of the visible play field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 240.0,
            height: 135.0,
        }
    }
}

/// Physics, collider and timer constants shared by every agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub width: f32,
    pub height: f32,
    /// Added to the velocity every step (positive is downward).
    pub gravity: f32,
    /// Subtracted from the velocity by a jump.
    pub jump_impulse: f32,
    pub max_velocity: f32,
    /// Steps after a jump before the next jump is accepted.
    pub jump_cooldown: u32,
    /// Invulnerability window after a collision.
    pub hit_cooldown: u32,
    /// Steps after a score before scoring is re-armed.
    pub score_cooldown: u32,
    pub animation_frames: u8,
    pub animation_speed: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            width: 17.0,
            height: 12.0,
            gravity: 0.1,
            jump_impulse: 5.0,
            max_velocity: 2.0,
            jump_cooldown: 30,
            hit_cooldown: 30,
            score_cooldown: 30,
            animation_frames: 3,
            animation_speed: 0.5,
        }
    }
}

/// Obstacle geometry and scrolling.
///
/// A gate is two obstacles stacked vertically: the top one at a snap point
/// and the bottom one `gap` below it. The passable opening is therefore
/// `gap - obstacle_height` tall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    /// Vertical offset between the top edges of the two obstacles of a gate.
    pub gap: f32,
    pub scroll_speed: f32,
    /// Allowed top-obstacle offsets; one is drawn uniformly per gate.
    pub snap_points: Vec<f32>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            obstacle_width: 20.0,
            obstacle_height: 80.0,
            gap: 130.0,
            scroll_speed: 1.0,
            snap_points: vec![-48.0, -32.0, -16.0, 0.0],
        }
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

impl AgentConfig {
    /// Jump cooldown at which an agent that jumps as often as allowed keeps
    /// a constant altitude.
    ///
    /// A jump is always clamped to `-max_velocity`, after which gravity needs
    /// `2 * max_velocity / gravity` steps to reach `+max_velocity` again; one
    /// more step closes the cycle with zero net displacement. Shorter cooldowns
    /// let agents climb, longer ones make them sink.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn hover_jump_cooldown(&self) -> u32 {
        (2.0 * self.max_velocity / self.gravity).round() as u32 + 1
    }
}

impl GameConfig {
    /// Checks that the constants describe a consistent world.
    ///
    /// Sessions call this before the first step, so a bad configuration
    /// is reported at construction instead of surfacing as odd physics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("field.width", self.field.width)?;
        check_positive("field.height", self.field.height)?;

        let agent = &self.agent;
        check_positive("agent.width", agent.width)?;
        check_positive("agent.height", agent.height)?;
        check_positive("agent.gravity", agent.gravity)?;
        check_positive("agent.jump_impulse", agent.jump_impulse)?;
        check_positive("agent.max_velocity", agent.max_velocity)?;
        check_positive("agent.animation_speed", agent.animation_speed)?;
        for (name, value) in [
            ("agent.jump_cooldown", agent.jump_cooldown),
            ("agent.hit_cooldown", agent.hit_cooldown),
            ("agent.score_cooldown", agent.score_cooldown),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCooldown { name });
            }
        }
        if agent.animation_frames == 0 {
            return Err(ConfigError::NoAnimationFrames);
        }

        let track = &self.track;
        check_positive("track.obstacle_width", track.obstacle_width)?;
        check_positive("track.obstacle_height", track.obstacle_height)?;
        check_positive("track.gap", track.gap)?;
        check_positive("track.scroll_speed", track.scroll_speed)?;
        if track.snap_points.is_empty() {
            return Err(ConfigError::EmptySnapPoints);
        }
        if let Some(&value) = track.snap_points.iter().find(|p| !p.is_finite()) {
            return Err(ConfigError::NonFiniteSnapPoint { value });
        }
        if track.gap <= track.obstacle_height {
            return Err(ConfigError::GapTooSmall {
                gap: track.gap,
                obstacle_height: track.obstacle_height,
            });
        }

        // one gate crossing must fit inside a single scoring window
        let crossing_steps = (track.obstacle_width / track.scroll_speed).ceil();
        #[expect(clippy::cast_precision_loss)]
        let cooldown = agent.score_cooldown as f32;
        if cooldown < crossing_steps {
            return Err(ConfigError::ScoreCooldownTooShort {
                cooldown: agent.score_cooldown,
                crossing_steps,
            });
        }
        Ok(())
    }

    /// Horizontal position of every agent.
    #[must_use]
    pub fn spawn_x(&self) -> f32 {
        self.field.width / 6.0 - self.agent.width / 2.0
    }

    /// Top edge of an agent at spawn (vertically centered).
    #[must_use]
    pub fn spawn_y(&self) -> f32 {
        self.field.height / 2.0 - self.agent.height / 2.0
    }

    /// Height of the passable opening between the two obstacles of a gate.
    #[must_use]
    pub fn opening_height(&self) -> f32 {
        self.track.gap - self.track.obstacle_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_spawn_position() {
        let config = GameConfig::default();
        assert!((config.spawn_x() - 31.5).abs() < f32::EPSILON);
        assert!((config.spawn_y() - 61.5).abs() < f32::EPSILON);
        assert!((config.opening_height() - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hover_jump_cooldown() {
        let agent = AgentConfig::default();
        assert_eq!(agent.hover_jump_cooldown(), 41);
        assert!(agent.jump_cooldown < agent.hover_jump_cooldown());
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let mut config = GameConfig::default();
        config.field.height = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "field.height",
                ..
            })
        ));

        let mut config = GameConfig::default();
        config.agent.gravity = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "agent.gravity",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_empty_snap_points() {
        let mut config = GameConfig::default();
        config.track.snap_points.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptySnapPoints)
        ));
    }

    #[test]
    fn test_rejects_closed_gate() {
        let mut config = GameConfig::default();
        config.track.gap = config.track.obstacle_height;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GapTooSmall { .. })
        ));
    }

    #[test]
    fn test_rejects_score_cooldown_shorter_than_crossing() {
        let mut config = GameConfig::default();
        config.agent.score_cooldown = 19;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScoreCooldownTooShort { cooldown: 19, .. })
        ));
        config.agent.score_cooldown = 20;
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_zero_cooldown() {
        let mut config = GameConfig::default();
        config.agent.hit_cooldown = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCooldown {
                name: "agent.hit_cooldown"
            })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "track": { "snap_points": [-48.0] } }"#).unwrap();
        assert_eq!(config.track.snap_points, vec![-48.0]);
        assert_eq!(config.agent, AgentConfig::default());
        assert_eq!(config.field, FieldConfig::default());
    }
}
