//! Weighted fitness accounting for batch sessions.
//!
//! A [`FitnessLedger`] is a [`FitnessSink`]: it counts the events each agent
//! receives and turns the counts into a score with [`FitnessWeights`].
//!
//! ```text
//! fitness = alive_ticks × alive_tick + collisions × collision + score_bonuses × score_bonus
//! ```
//!
//! With the default weights an agent earns 0.1 per step survived, loses 1.0
//! when it crashes, and gains 5.0 whenever any agent of the population clears
//! a gate while it is still flying. The shared bonus rewards staying alive
//! long enough to see gates passed more than crossing them first.

use flappy_engine::{AgentId, FitnessEvent, FitnessEventKind, FitnessSink};
use serde::{Deserialize, Serialize};

/// Value of each fitness event kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub alive_tick: f32,
    pub collision: f32,
    pub score_bonus: f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            alive_tick: 0.1,
            collision: -1.0,
            score_bonus: 5.0,
        }
    }
}

impl FitnessWeights {
    #[must_use]
    pub fn weight(&self, kind: FitnessEventKind) -> f32 {
        match kind {
            FitnessEventKind::AliveTick => self.alive_tick,
            FitnessEventKind::Collision => self.collision,
            FitnessEventKind::ScoreBonus => self.score_bonus,
        }
    }
}

/// Event counts received by one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentTally {
    pub alive_ticks: u64,
    pub collisions: u64,
    pub score_bonuses: u64,
}

impl AgentTally {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn fitness(&self, weights: &FitnessWeights) -> f32 {
        self.alive_ticks as f32 * weights.alive_tick
            + self.collisions as f32 * weights.collision
            + self.score_bonuses as f32 * weights.score_bonus
    }

    fn count(&mut self, kind: FitnessEventKind) {
        let counter = match kind {
            FitnessEventKind::AliveTick => &mut self.alive_ticks,
            FitnessEventKind::Collision => &mut self.collisions,
            FitnessEventKind::ScoreBonus => &mut self.score_bonuses,
        };
        *counter += 1;
    }
}

/// Per-agent event counts for one session.
///
/// ```
/// use flappy_engine::{ConstantDecision, GameConfig, Session, SensoryEncoder, SimSeed};
/// use flappy_evaluator::fitness::{FitnessLedger, FitnessWeights};
///
/// let encoder = SensoryEncoder::default();
/// let deciders = vec![ConstantDecision::never_jump(encoder.arity()); 2];
/// let mut session =
///     Session::batch(GameConfig::default(), encoder, deciders, SimSeed::from_bytes([1; 16]))
///         .unwrap();
///
/// let mut ledger = FitnessLedger::new(FitnessWeights::default(), 2);
/// while !session.is_terminated() {
///     session.step(&mut ledger).unwrap();
/// }
/// // 49 steps alive, then the floor: 4.9 - 1.0
/// let fitness: Vec<f32> = ledger.fitness().collect();
/// assert!((fitness[0] - 3.9).abs() < 1e-4);
/// assert_eq!(fitness[0], fitness[1]);
/// ```
#[derive(Debug, Clone)]
pub struct FitnessLedger {
    weights: FitnessWeights,
    tallies: Vec<AgentTally>,
}

impl FitnessLedger {
    #[must_use]
    pub fn new(weights: FitnessWeights, population: usize) -> Self {
        Self {
            weights,
            tallies: vec![AgentTally::default(); population],
        }
    }

    #[must_use]
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    #[must_use]
    pub fn tallies(&self) -> &[AgentTally] {
        &self.tallies
    }

    #[must_use]
    pub fn tally(&self, agent: AgentId) -> Option<&AgentTally> {
        self.tallies.get(agent.index())
    }

    /// Weighted fitness of every agent, in id order.
    pub fn fitness(&self) -> impl Iterator<Item = f32> + '_ {
        self.tallies
            .iter()
            .map(|tally| tally.fitness(&self.weights))
    }

    /// Clears all counts, keeping the population size.
    pub fn clear(&mut self) {
        self.tallies.fill(AgentTally::default());
    }
}

impl FitnessSink for FitnessLedger {
    fn record(&mut self, event: FitnessEvent) {
        let index = event.agent.index();
        if index >= self.tallies.len() {
            self.tallies.resize(index + 1, AgentTally::default());
        }
        self.tallies[index].count(event.kind);
    }
}

#[cfg(test)]
mod tests {
    use flappy_engine::{ConstantDecision, GameConfig, Session, SensoryEncoder, SimSeed};

    use super::*;

    #[test]
    fn test_weights_by_kind() {
        let weights = FitnessWeights::default();
        assert!((weights.weight(FitnessEventKind::AliveTick) - 0.1).abs() < f32::EPSILON);
        assert!((weights.weight(FitnessEventKind::Collision) + 1.0).abs() < f32::EPSILON);
        assert!((weights.weight(FitnessEventKind::ScoreBonus) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_weights_from_partial_json() {
        let weights: FitnessWeights = serde_json::from_str(r#"{ "score_bonus": 10.0 }"#).unwrap();
        assert!((weights.score_bonus - 10.0).abs() < f32::EPSILON);
        assert!((weights.alive_tick - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tally_fitness() {
        let tally = AgentTally {
            alive_ticks: 100,
            collisions: 1,
            score_bonuses: 2,
        };
        // 10 - 1 + 10
        assert!((tally.fitness(&FitnessWeights::default()) - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_ledger_counts_session_events() {
        let encoder = SensoryEncoder::default();
        let deciders = vec![ConstantDecision::never_jump(encoder.arity()); 3];
        let mut session = Session::batch(
            GameConfig::default(),
            encoder,
            deciders,
            SimSeed::from_bytes([5; 16]),
        )
        .unwrap();
        let mut ledger = FitnessLedger::new(FitnessWeights::default(), 3);
        while !session.is_terminated() {
            session.step(&mut ledger).unwrap();
        }
        for tally in ledger.tallies() {
            assert_eq!(
                *tally,
                AgentTally {
                    alive_ticks: 49,
                    collisions: 1,
                    score_bonuses: 0,
                }
            );
        }

        ledger.clear();
        assert!(ledger.fitness().all(|f| f.abs() < f32::EPSILON));
        assert_eq!(ledger.tallies().len(), 3);
    }

    #[test]
    fn test_ledger_grows_for_unknown_agent() {
        let mut session = Session::batch(
            GameConfig::default(),
            SensoryEncoder::default(),
            vec![ConstantDecision::never_jump(4); 2],
            SimSeed::from_bytes([5; 16]),
        )
        .unwrap();
        let mut events = Vec::new();
        session.step(&mut events).unwrap();

        let mut ledger = FitnessLedger::new(FitnessWeights::default(), 0);
        for &event in &events {
            ledger.record(event);
        }
        assert_eq!(ledger.tallies().len(), 2);
        let last = events.last().unwrap().agent;
        assert_eq!(ledger.tally(last).map(|t| t.alive_ticks), Some(1));
    }
}
