//! Learned policies and fitness evaluation for the gate-runner simulation.
//!
//! This crate sits between the simulation ([`flappy_engine`]) and training:
//!
//! 1. **Policy** ([`policy`]) - A [`DecisionFunction`](flappy_engine::DecisionFunction)
//!    backed by a linear model over the encoded sensor features.
//!
//! 2. **Fitness** ([`fitness`]) - A [`FitnessSink`](flappy_engine::FitnessSink)
//!    that turns per-step events into weighted fitness totals.
//!
//! 3. **Session Evaluation** ([`session_evaluator`]) - Runs a population of
//!    policies through seeded batch sessions and averages their fitness.
//!
//! # Architecture
//!
//! ```text
//! Session Evaluation (population fitness over seeds)
//!     ↓ uses
//! Fitness Ledger (events → weighted totals)
//!     ↓ fed by
//! Batch Session (engine)  ←  Linear Policy (one per agent)
//! ```
//!
//! # Limitations
//!
//! - **Linear model**: one weight per feature plus a bias. Interactions such as
//!   "close to the gate *and* below the gap" cannot be expressed.
//! - **Shared bonus**: the score bonus goes to every survivor, so fitness
//!   measures survival in a population more than individual gate clearing.

pub mod fitness;
pub mod policy;
pub mod session_evaluator;
