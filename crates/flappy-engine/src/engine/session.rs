use rand::Rng as _;
use rand_pcg::Pcg32;

use crate::{
    DecisionError, GameConfig, SessionError, SimSeed,
    core::{obstacle::ObstacleHalf, sensor::SensoryEncoder},
    engine::{
        agent::{Agent, Tint},
        decision::{DecisionFunction, JUMP_THRESHOLD},
        fitness::{AgentId, FitnessEvent, FitnessEventKind, FitnessSink},
        track::ObstacleTrack,
    },
};

/// RNG stream for cosmetic tints; kept apart from gate placement so the gate
/// sequence does not depend on the number of agents.
const COSMETIC_STREAM: u64 = 1;

/// How a session reacts to a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionMode {
    /// Single agent; a collision resets the whole session.
    Manual,
    /// Many agents; a collision removes the agent until the session ends.
    Batch,
}

/// Drawable entity tag for render collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Obstacle(ObstacleHalf),
    Agent(AgentId),
}

/// Position and visual state of one drawable entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Animation frame for agents; 0 (top) or 1 (bottom) for obstacles.
    pub visual_index: u8,
    pub tint: Tint,
}

/// Outcome of a single [`Session::step`].
#[derive(Debug, Default)]
pub struct StepReport {
    /// Step number, starting at 1 after construction or reset.
    pub step: u64,
    pub collisions: Vec<AgentId>,
    pub scored: Vec<AgentId>,
    /// Decision functions that failed; their agents did not jump this step.
    pub decision_failures: Vec<(AgentId, DecisionError)>,
    pub gate_recycled: bool,
    /// Manual mode only: a collision reset the session.
    pub reset: bool,
    /// Batch mode only: no active agents remain.
    pub terminated: bool,
}

/// Runs agents against a shared obstacle track, one step at a time.
///
/// A session owns its track, its agents and their decision functions. In
/// [`SessionMode::Manual`] it runs a single agent and restarts on every
/// collision. In [`SessionMode::Batch`] it runs a population and removes
/// agents as they collide; once the last one is gone the session is
/// terminated and further steps are rejected.
///
/// # Step Order
///
/// 1. The track advances exactly once.
/// 2. Each active agent, in id order, is updated against the track. Colliding
///    agents emit [`FitnessEventKind::Collision`] and are scheduled for
///    removal; survivors are encoded, consult their decision function, jump
///    if the activation exceeds [`JUMP_THRESHOLD`], and emit
///    [`FitnessEventKind::AliveTick`].
/// 3. Removals are applied back to front.
/// 4. Manual mode resets on collision; batch mode terminates when empty.
/// 5. If any agent scored, every remaining agent receives
///    [`FitnessEventKind::ScoreBonus`].
///
/// # Example
///
/// ```
/// use flappy_engine::{ConstantDecision, GameConfig, Session, SensoryEncoder, SimSeed};
///
/// let encoder = SensoryEncoder::default();
/// let deciders = vec![ConstantDecision::never_jump(encoder.arity()); 4];
/// let mut session =
///     Session::batch(GameConfig::default(), encoder, deciders, SimSeed::from_bytes([0; 16]))
///         .unwrap();
///
/// let mut events = Vec::new();
/// while !session.is_terminated() {
///     session.step(&mut events).unwrap();
/// }
/// assert_eq!(session.active_count(), 0);
/// assert!(session.step(&mut events).is_err());
/// ```
#[derive(Debug)]
pub struct Session<D> {
    config: GameConfig,
    mode: SessionMode,
    track: ObstacleTrack,
    encoder: SensoryEncoder,
    agents: Vec<Agent>,
    deciders: Vec<D>,
    active: Vec<AgentId>,
    cosmetic_rng: Pcg32,
    steps: u64,
    resets: u64,
    terminated: bool,
}

impl<D> Session<D>
where
    D: DecisionFunction,
{
    /// Creates a single-agent session that restarts on collision.
    pub fn manual(
        config: GameConfig,
        encoder: SensoryEncoder,
        decider: D,
        seed: SimSeed,
    ) -> Result<Self, SessionError> {
        Self::with_mode(SessionMode::Manual, config, encoder, vec![decider], seed)
    }

    /// Creates a population session; agent `i` is driven by `deciders[i]`.
    pub fn batch(
        config: GameConfig,
        encoder: SensoryEncoder,
        deciders: Vec<D>,
        seed: SimSeed,
    ) -> Result<Self, SessionError> {
        Self::with_mode(SessionMode::Batch, config, encoder, deciders, seed)
    }

    fn with_mode(
        mode: SessionMode,
        config: GameConfig,
        encoder: SensoryEncoder,
        deciders: Vec<D>,
        seed: SimSeed,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        if deciders.is_empty() {
            return Err(SessionError::EmptyPopulation);
        }
        for (index, decider) in deciders.iter().enumerate() {
            if decider.input_arity() != encoder.arity() {
                return Err(SessionError::ArityMismatch {
                    agent: AgentId(index),
                    expected: encoder.arity(),
                    actual: decider.input_arity(),
                });
            }
        }

        let track = ObstacleTrack::new(&config.field, &config.track, seed);
        track.check_invariant()?;

        let mut cosmetic_rng = seed.rng(COSMETIC_STREAM);
        let agents = deciders
            .iter()
            .map(|_| {
                let mut agent = Agent::new(&config);
                agent.set_tint(random_tint(&mut cosmetic_rng));
                agent
            })
            .collect();
        let active = (0..deciders.len()).map(AgentId).collect();

        Ok(Self {
            config,
            mode,
            track,
            encoder,
            agents,
            deciders,
            active,
            cosmetic_rng,
            steps: 0,
            resets: 0,
            terminated: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn track(&self) -> &ObstacleTrack {
        &self.track
    }

    #[must_use]
    pub fn encoder(&self) -> &SensoryEncoder {
        &self.encoder
    }

    /// All agents, including removed ones, indexed by [`AgentId::index`].
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0)
    }

    pub fn active_agents(&self) -> impl Iterator<Item = (AgentId, &Agent)> + '_ {
        self.active.iter().map(|&id| (id, &self.agents[id.0]))
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn decider_mut(&mut self, id: AgentId) -> Option<&mut D> {
        self.deciders.get_mut(id.0)
    }

    #[must_use]
    pub fn into_deciders(self) -> Vec<D> {
        self.deciders
    }

    /// Steps taken since construction or the last reset.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub fn resets(&self) -> u64 {
        self.resets
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Highest score reached by any agent in the current run.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.agents.iter().map(Agent::score).max().unwrap_or(0)
    }

    /// Advances the simulation by one step.
    ///
    /// Fitness events are delivered to `sink` as they happen. Failing decision
    /// functions are logged and listed in the report; they never abort the step.
    pub fn step<S>(&mut self, sink: &mut S) -> Result<StepReport, SessionError>
    where
        S: FitnessSink + ?Sized,
    {
        if self.terminated {
            return Err(SessionError::Terminated { steps: self.steps });
        }

        let gate_recycled = self.track.advance();
        self.track.check_invariant()?;
        self.steps += 1;

        let mut report = StepReport {
            step: self.steps,
            gate_recycled,
            ..StepReport::default()
        };
        let mut removed = Vec::new();
        for (position, &id) in self.active.iter().enumerate() {
            let agent = &mut self.agents[id.0];
            let score_before = agent.score();
            let collided = agent.update(&self.track);
            if agent.score() > score_before {
                report.scored.push(id);
            }
            if collided {
                removed.push(position);
                report.collisions.push(id);
                sink.record(FitnessEvent {
                    agent: id,
                    kind: FitnessEventKind::Collision,
                });
                continue;
            }

            let snapshot = self.encoder.encode(agent.readings());
            match self.deciders[id.0].decide(&snapshot) {
                Ok(activation) if activation > JUMP_THRESHOLD => agent.jump(),
                Ok(_) => {}
                Err(err) => {
                    log::warn!(
                        "decision function of agent {id} failed at step {}: {err}",
                        self.steps
                    );
                    report.decision_failures.push((id, err));
                }
            }
            sink.record(FitnessEvent {
                agent: id,
                kind: FitnessEventKind::AliveTick,
            });
        }
        for &position in removed.iter().rev() {
            let id = self.active.remove(position);
            self.agents[id.0].mark_dead();
        }

        match self.mode {
            SessionMode::Manual if !report.collisions.is_empty() => {
                log::debug!(
                    "collision at step {} with score {}, resetting",
                    self.steps,
                    self.best_score()
                );
                self.reset();
                report.reset = true;
                return Ok(report);
            }
            SessionMode::Batch if self.active.is_empty() => {
                log::debug!("all agents removed after {} steps", self.steps);
                self.terminated = true;
                report.terminated = true;
            }
            SessionMode::Manual | SessionMode::Batch => {}
        }

        if !report.scored.is_empty() {
            for &id in &self.active {
                sink.record(FitnessEvent {
                    agent: id,
                    kind: FitnessEventKind::ScoreBonus,
                });
            }
        }
        Ok(report)
    }

    /// Returns the track and every agent to the spawn state.
    pub fn reset(&mut self) {
        self.track.reset();
        for agent in &mut self.agents {
            agent.reset(random_tint(&mut self.cosmetic_rng));
        }
        self.active = (0..self.agents.len()).map(AgentId).collect();
        self.steps = 0;
        self.resets += 1;
        self.terminated = false;
    }

    /// Drawable entities: the two obstacles of the gate, then active agents.
    pub fn render_states(&self) -> impl Iterator<Item = (EntityKind, RenderState)> + '_ {
        let obstacles = self
            .track
            .current_gate()
            .obstacles()
            .into_iter()
            .map(|obstacle| {
                let collider = obstacle.collider();
                let state = RenderState {
                    x: collider.x,
                    y: collider.y,
                    width: collider.width,
                    height: collider.height,
                    visual_index: u8::from(obstacle.half().is_bottom()),
                    tint: Tint::WHITE,
                };
                (EntityKind::Obstacle(obstacle.half()), state)
            });
        let agents = self.active_agents().map(|(id, agent)| {
            let collider = agent.collider();
            let state = RenderState {
                x: collider.x,
                y: collider.y,
                width: collider.width,
                height: collider.height,
                visual_index: agent.animation_frame(),
                tint: agent.tint(),
            };
            (EntityKind::Agent(id), state)
        });
        obstacles.chain(agents)
    }
}

fn random_tint(rng: &mut Pcg32) -> Tint {
    Tint {
        r: rng.random(),
        g: rng.random(),
        b: rng.random(),
    }
}
