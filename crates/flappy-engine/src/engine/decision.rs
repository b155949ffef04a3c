use crate::{DecisionError, core::sensor::SensorySnapshot};

/// Activation above which a decision is read as "jump".
pub const JUMP_THRESHOLD: f32 = 0.5;

/// Maps a sensory snapshot to a jump activation.
///
/// Implementations include human input, constant policies, and learned
/// policies. The session calls [`DecisionFunction::decide`] once per living
/// agent per step and jumps when the result exceeds [`JUMP_THRESHOLD`]. An
/// error is treated as "no jump" for that step; it never stops the session.
pub trait DecisionFunction {
    /// Number of inputs this function expects in every snapshot.
    fn input_arity(&self) -> usize;

    fn decide(&mut self, snapshot: &SensorySnapshot) -> Result<f32, DecisionError>;
}

impl<T> DecisionFunction for Box<T>
where
    T: DecisionFunction + ?Sized,
{
    fn input_arity(&self) -> usize {
        (**self).input_arity()
    }

    fn decide(&mut self, snapshot: &SensorySnapshot) -> Result<f32, DecisionError> {
        (**self).decide(snapshot)
    }
}

/// Always returns the same activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantDecision {
    arity: usize,
    activation: f32,
}

impl ConstantDecision {
    #[must_use]
    pub const fn new(arity: usize, activation: f32) -> Self {
        Self { arity, activation }
    }

    #[must_use]
    pub const fn always_jump(arity: usize) -> Self {
        Self::new(arity, 1.0)
    }

    #[must_use]
    pub const fn never_jump(arity: usize) -> Self {
        Self::new(arity, 0.0)
    }
}

impl DecisionFunction for ConstantDecision {
    fn input_arity(&self) -> usize {
        self.arity
    }

    fn decide(&mut self, _snapshot: &SensorySnapshot) -> Result<f32, DecisionError> {
        Ok(self.activation)
    }
}

/// Decision function driven by a human player.
///
/// A key press is latched by [`HumanInput::press`] and consumed by the next
/// decision, so a press that happens between two steps is never lost.
///
/// ```
/// use flappy_engine::{DecisionFunction, FeatureSet, HumanInput, SensoryEncoder, SensorReadings};
///
/// let encoder = SensoryEncoder::new(FeatureSet::basic());
/// let snapshot = encoder.encode(&SensorReadings::default());
/// let mut input = HumanInput::new(encoder.arity());
///
/// input.press();
/// assert!(input.decide(&snapshot).unwrap() > 0.5);
/// assert!(input.decide(&snapshot).unwrap() < 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HumanInput {
    arity: usize,
    pressed: bool,
}

impl HumanInput {
    #[must_use]
    pub const fn new(arity: usize) -> Self {
        Self {
            arity,
            pressed: false,
        }
    }

    pub fn press(&mut self) {
        self.pressed = true;
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl DecisionFunction for HumanInput {
    fn input_arity(&self) -> usize {
        self.arity
    }

    fn decide(&mut self, _snapshot: &SensorySnapshot) -> Result<f32, DecisionError> {
        Ok(if std::mem::take(&mut self.pressed) {
            1.0
        } else {
            0.0
        })
    }
}
