//! Training system that evolves linear gate-runner policies.
//!
//! # How Training Works
//!
//! 1. **Population** - Individuals with random, L1-normalized genomes
//! 2. **Evaluation** - The population flies through seeded batch sessions
//! 3. **Fitness** - A fitness ledger scores alive ticks, crashes and shared score bonuses
//! 4. **Selection** - Elites survive; parents are chosen by tournament
//! 5. **Reproduction** - BLX-α crossover and Gaussian mutation
//! 6. **Repeat** - Continue for many generations
//!
//! # Architecture
//!
//! ```text
//! Genetic Algorithm
//!     ↓ evolves
//! Genomes (feature weights + bias)
//!     ↓ become
//! Linear Policies (flappy-evaluator)
//!     ↓ scored by
//! Batch Evaluator (fitness ledger over seeded sessions)
//!     ↓ guides
//! Selection & Reproduction
//! ```
//!
//! See the [`genetic`] module for the algorithm and [`weights`] for the
//! genome operators.

pub mod genetic;
pub mod weights;
