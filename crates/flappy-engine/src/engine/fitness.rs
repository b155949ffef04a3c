/// Stable identifier of an agent within a session.
///
/// Ids are assigned in construction order and never reused, so they can
/// index per-agent data kept outside the session (decision functions,
/// fitness totals, population members).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display,
)]
#[display("#{_0}")]
pub struct AgentId(pub(crate) usize);

impl AgentId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What happened to an agent during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum FitnessEventKind {
    /// Survived the step.
    AliveTick,
    /// Collided; terminal for the agent in batch mode.
    Collision,
    /// Some agent scored this step; broadcast to every survivor.
    ScoreBonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FitnessEvent {
    pub agent: AgentId,
    pub kind: FitnessEventKind,
}

/// Receives fitness events from a session.
///
/// The session only emits events; aggregation, weighting, and persistence are
/// up to the sink.
pub trait FitnessSink {
    fn record(&mut self, event: FitnessEvent);
}

/// Discards every event.
impl FitnessSink for () {
    fn record(&mut self, _event: FitnessEvent) {}
}

/// Collects events in emission order.
impl FitnessSink for Vec<FitnessEvent> {
    fn record(&mut self, event: FitnessEvent) {
        self.push(event);
    }
}

impl<S> FitnessSink for &mut S
where
    S: FitnessSink + ?Sized,
{
    fn record(&mut self, event: FitnessEvent) {
        (**self).record(event);
    }
}
