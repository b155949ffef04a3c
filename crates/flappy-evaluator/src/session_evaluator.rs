//! Batch evaluation: fitness of a whole population over seeded sessions.
//!
//! The whole population flies through the same track in one batch session,
//! so every agent sees the same gates. A session ends when the last agent
//! crashes or when the step limit is reached, whichever comes first. The
//! step limit keeps training time bounded once agents learn to survive.
//!
//! # How It Works
//!
//! 1. **Play Session** - One batch session per seed, driven by the policies
//! 2. **Collect Events** - A [`FitnessLedger`] counts alive ticks, collisions
//!    and score bonuses per agent
//! 3. **Average** - Per-agent fitness is averaged over all seeds
//!
//! Seeds are evaluated on separate threads. Each session is deterministic,
//! so the result does not depend on scheduling.
//!
//! # Usage
//!
//! ```
//! use flappy_engine::{FeatureSet, GameConfig, SimSeed};
//! use flappy_evaluator::{policy::gap_follower, session_evaluator::BatchEvaluator};
//!
//! let config = GameConfig::default();
//! let features = FeatureSet::basic();
//! let follower = gap_follower(&features, &config).unwrap();
//!
//! let evaluator = BatchEvaluator::new(config, features, 1_000);
//! let seeds = [SimSeed::from_bytes([1; 16]), SimSeed::from_bytes([2; 16])];
//! let evaluation = evaluator.evaluate_population(&[follower], &seeds).unwrap();
//! assert_eq!(evaluation.fitness().len(), 1);
//! ```

use std::{panic, thread};

use flappy_engine::{
    DecisionFunction, FeatureSet, GameConfig, Session, SessionError, SensoryEncoder, SimSeed,
};

use crate::{
    fitness::{FitnessLedger, FitnessWeights},
    policy::LinearPolicy,
};

/// Result of one agent in one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentOutcome {
    pub fitness: f32,
    pub score: u32,
    pub alive_steps: u64,
    /// Still flying when the session stopped.
    pub survived: bool,
}

/// Result of one batch session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub seed: SimSeed,
    pub steps: u64,
    /// Every agent crashed before the step limit.
    pub terminated: bool,
    pub agents: Vec<AgentOutcome>,
}

impl SessionOutcome {
    #[must_use]
    pub fn survivors(&self) -> usize {
        self.agents.iter().filter(|agent| agent.survived).count()
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.agents.iter().map(|agent| agent.score).max().unwrap_or(0)
    }
}

/// Outcomes of a population over several seeds.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEvaluation {
    population: usize,
    sessions: Vec<SessionOutcome>,
}

impl PopulationEvaluation {
    #[must_use]
    pub fn sessions(&self) -> &[SessionOutcome] {
        &self.sessions
    }

    /// Mean fitness of each agent over all sessions, in population order.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn fitness(&self) -> Vec<f32> {
        let mut totals = vec![0.0; self.population];
        for session in &self.sessions {
            for (total, agent) in totals.iter_mut().zip(&session.agents) {
                *total += agent.fitness;
            }
        }
        let count = self.sessions.len().max(1) as f32;
        totals.into_iter().map(|total| total / count).collect()
    }

    /// Highest score of any agent in any session.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.sessions
            .iter()
            .map(SessionOutcome::best_score)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean_survivors(&self) -> f32 {
        let total = self
            .sessions
            .iter()
            .map(SessionOutcome::survivors)
            .sum::<usize>();
        total as f32 / self.sessions.len().max(1) as f32
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean_steps(&self) -> f32 {
        let total = self.sessions.iter().map(|s| s.steps).sum::<u64>();
        total as f32 / self.sessions.len().max(1) as f32
    }
}

/// Runs batch sessions and scores them with a [`FitnessLedger`].
#[derive(Debug, Clone)]
pub struct BatchEvaluator {
    config: GameConfig,
    features: FeatureSet,
    step_limit: u64,
    weights: FitnessWeights,
}

impl BatchEvaluator {
    /// Creates an evaluator with the default fitness weights.
    ///
    /// # Arguments
    /// * `config` - World constants for every session
    /// * `features` - Inputs fed to the decision functions
    /// * `step_limit` - Maximum number of steps per session
    #[must_use]
    pub fn new(config: GameConfig, features: FeatureSet, step_limit: u64) -> Self {
        Self {
            config,
            features,
            step_limit,
            weights: FitnessWeights::default(),
        }
    }

    #[must_use]
    pub fn with_weights(self, weights: FitnessWeights) -> Self {
        Self { weights, ..self }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    #[must_use]
    pub fn step_limit(&self) -> u64 {
        self.step_limit
    }

    #[must_use]
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Plays one batch session; agent `i` is driven by `deciders[i]`.
    pub fn run_session<D>(
        &self,
        deciders: Vec<D>,
        seed: SimSeed,
    ) -> Result<SessionOutcome, SessionError>
    where
        D: DecisionFunction,
    {
        let population = deciders.len();
        let encoder = SensoryEncoder::new(self.features.clone());
        let mut session = Session::batch(self.config.clone(), encoder, deciders, seed)?;
        let mut ledger = FitnessLedger::new(self.weights, population);
        while !session.is_terminated() && session.steps() < self.step_limit {
            session.step(&mut ledger)?;
        }

        let agents = session
            .agents()
            .iter()
            .zip(ledger.tallies())
            .map(|(agent, tally)| AgentOutcome {
                fitness: tally.fitness(&self.weights),
                score: agent.score(),
                alive_steps: tally.alive_ticks,
                survived: !agent.status().is_dead(),
            })
            .collect();
        let outcome = SessionOutcome {
            seed,
            steps: session.steps(),
            terminated: session.is_terminated(),
            agents,
        };
        log::debug!(
            "session {seed} finished after {} steps with {} survivors",
            outcome.steps,
            outcome.survivors()
        );
        Ok(outcome)
    }

    /// Plays one session per seed in parallel and collects the outcomes.
    pub fn evaluate_population(
        &self,
        policies: &[LinearPolicy],
        seeds: &[SimSeed],
    ) -> Result<PopulationEvaluation, SessionError> {
        let sessions = thread::scope(|s| {
            let handles = seeds
                .iter()
                .map(|&seed| s.spawn(move || self.run_session(policies.to_vec(), seed)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect::<Result<Vec<_>, _>>()
        })?;
        Ok(PopulationEvaluation {
            population: policies.len(),
            sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use flappy_engine::ConstantDecision;

    use super::*;
    use crate::policy::gap_follower;

    fn seeds() -> Vec<SimSeed> {
        (1..=3).map(|b| SimSeed::from_bytes([b; 16])).collect()
    }

    /// Policy that never crosses the jump threshold.
    fn sinker(features: &FeatureSet, config: &GameConfig) -> LinearPolicy {
        LinearPolicy::new(features, config, vec![0.0; features.arity()], -1.0).unwrap()
    }

    #[test]
    fn test_session_ends_when_population_crashes() {
        let evaluator = BatchEvaluator::new(GameConfig::default(), FeatureSet::basic(), 10_000);
        let outcome = evaluator
            .run_session(vec![ConstantDecision::never_jump(4); 4], seeds()[0])
            .unwrap();
        assert!(outcome.terminated);
        assert_eq!(outcome.steps, 50);
        assert_eq!(outcome.survivors(), 0);
        for agent in &outcome.agents {
            assert_eq!(agent.alive_steps, 49);
            assert!((agent.fitness - 3.9).abs() < 1e-4);
        }
    }

    #[test]
    fn test_session_stops_at_step_limit() {
        let mut config = GameConfig::default();
        config.track.snap_points = vec![-48.0];
        config.agent.jump_cooldown = config.agent.hover_jump_cooldown();
        let evaluator = BatchEvaluator::new(config, FeatureSet::basic(), 500);
        let outcome = evaluator
            .run_session(vec![ConstantDecision::always_jump(4)], seeds()[0])
            .unwrap();
        assert!(!outcome.terminated);
        assert_eq!(outcome.steps, 500);
        assert_eq!(outcome.survivors(), 1);
        // gates pass the agent at steps 209 and 470
        assert_eq!(outcome.best_score(), 2);
        assert!((outcome.agents[0].fitness - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_gap_follower_outlives_sinker() {
        let config = GameConfig::default();
        let features = FeatureSet::basic();
        let policies = [
            gap_follower(&features, &config).unwrap(),
            sinker(&features, &config),
        ];
        let evaluator = BatchEvaluator::new(config, features, 3_000);
        let evaluation = evaluator.evaluate_population(&policies, &seeds()).unwrap();

        assert_eq!(evaluation.sessions().len(), 3);
        for session in evaluation.sessions() {
            assert_eq!(session.steps, 3_000);
            assert!(session.agents[0].survived);
            assert!(!session.agents[1].survived);
            assert!(session.agents[0].score >= 10);
        }
        let fitness = evaluation.fitness();
        assert!(fitness[0] > fitness[1]);
        assert!(evaluation.best_score() >= 10);
        assert!((evaluation.mean_survivors() - 1.0).abs() < f32::EPSILON);
        assert!((evaluation.mean_steps() - 3_000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = GameConfig::default();
        let features = FeatureSet::head();
        let policies = vec![
            LinearPolicy::new(&features, &config, vec![0.3, -0.1, 0.2, 0.5, 0.0], 0.1).unwrap(),
            LinearPolicy::new(&features, &config, vec![-0.2, 0.4, 0.0, 0.1, 0.3], -0.2).unwrap(),
        ];
        let evaluator = BatchEvaluator::new(config, features, 800);
        let parallel = evaluator.evaluate_population(&policies, &seeds()).unwrap();
        for (session, &seed) in parallel.sessions().iter().zip(&seeds()) {
            let sequential = evaluator.run_session(policies.clone(), seed).unwrap();
            assert_eq!(*session, sequential);
        }
    }

    #[test]
    fn test_arity_mismatch_is_reported() {
        let config = GameConfig::default();
        let policy = LinearPolicy::new(&FeatureSet::basic(), &config, vec![0.0; 4], 0.0).unwrap();
        let evaluator = BatchEvaluator::new(config, FeatureSet::full(), 100);
        let result = evaluator.evaluate_population(&[policy], &seeds());
        assert!(matches!(result, Err(SessionError::ArityMismatch { .. })));
    }
}
