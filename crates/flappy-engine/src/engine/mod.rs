//! Simulation logic built on the core data types.
//!
//! - [`ObstacleTrack`] - Scrolls and recycles the current [`Gate`]
//! - [`Agent`] - Physics, collision, and scoring state machine
//! - [`DecisionFunction`] - Maps a sensory snapshot to a jump activation
//! - [`Session`] - Runs one agent (manual play) or a population (batch
//!   evaluation) against a shared track
//! - [`FitnessSink`] - Receives per-step fitness events
//!
//! # Step Flow
//!
//! 1. The session advances the track once
//! 2. Every active agent updates against the current gate
//! 3. Surviving agents encode their readings and ask their decision function
//! 4. Collisions and scores are reported as fitness events
//! 5. Manual sessions restart on collision; batch sessions end when empty
//!
//! # Example
//!
//! ```
//! use flappy_engine::{GameConfig, HumanInput, Session, SensoryEncoder, SimSeed};
//!
//! let encoder = SensoryEncoder::default();
//! let input = HumanInput::new(encoder.arity());
//! let mut session =
//!     Session::manual(GameConfig::default(), encoder, input, SimSeed::from_bytes([0; 16])).unwrap();
//!
//! for frame in 0..600 {
//!     if frame % 40 == 0 {
//!         let player = session.active_agents().next().map(|(id, _)| id);
//!         if let Some(input) = player.and_then(|id| session.decider_mut(id)) {
//!             input.press();
//!         }
//!     }
//!     let report = session.step(&mut ()).unwrap();
//!     if report.reset {
//!         println!("crashed, score reset");
//!     }
//! }
//! ```

pub use self::{agent::*, decision::*, fitness::*, session::*, track::*};

mod agent;
mod decision;
mod fitness;
mod session;
mod track;
