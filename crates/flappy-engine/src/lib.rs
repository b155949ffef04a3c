//! Deterministic side-scrolling gate-runner simulation.
//!
//! Agents fall under gravity, jump on command, and must fly through gates
//! that scroll in from the right. The crate contains only the simulation:
//! rendering, input devices, and learning algorithms plug in through
//! [`DecisionFunction`], [`FitnessSink`], and [`Session::render_states`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[display("{name} must be at least one step")]
    ZeroCooldown { name: &'static str },
    #[display("agent.animation_frames must be at least one")]
    NoAnimationFrames,
    #[display("track.snap_points must not be empty")]
    EmptySnapPoints,
    #[display("track.snap_points contains non-finite value {value}")]
    NonFiniteSnapPoint { value: f32 },
    #[display("track.gap ({gap}) must exceed track.obstacle_height ({obstacle_height})")]
    GapTooSmall { gap: f32, obstacle_height: f32 },
    #[display(
        "agent.score_cooldown ({cooldown}) is shorter than one gate crossing ({crossing_steps} steps)"
    )]
    ScoreCooldownTooShort { cooldown: u32, crossing_steps: f32 },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvariantViolation {
    #[display("gate gap is {actual}, expected {expected}")]
    GapMismatch { expected: f32, actual: f32 },
    #[display("gate halves misaligned: top at x={top_x}, bottom at x={bottom_x}")]
    MisalignedGate { top_x: f32, bottom_x: f32 },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DecisionError {
    #[display("expected {expected} inputs, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[display("activation is not finite ({value})")]
    NonFinite { value: f32 },
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    #[display("invalid configuration: {_0}")]
    #[from]
    Config(ConfigError),
    #[display("decision function of agent {agent} takes {actual} inputs, encoder produces {expected}")]
    ArityMismatch {
        agent: AgentId,
        expected: usize,
        actual: usize,
    },
    #[display("session needs at least one agent")]
    EmptyPopulation,
    #[display("simulation invariant violated: {_0}")]
    #[from]
    Invariant(InvariantViolation),
    #[display("session already terminated after {steps} steps")]
    Terminated { steps: u64 },
}
