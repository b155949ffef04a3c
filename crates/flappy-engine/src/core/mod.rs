//! Plain data and geometry shared by the simulation.
//!
//! - [`GameConfig`] - Field, agent, and track constants with validation
//! - [`Rect`] - Axis-aligned collider
//! - [`Obstacle`] - One solid half of a gate
//! - [`SimSeed`] - Seed for deterministic runs
//! - [`SensoryEncoder`] - Fixed-order feature encoding for decision functions

pub use self::{config::*, obstacle::*, rect::*, seed::*, sensor::*};

pub(crate) mod config;
pub(crate) mod obstacle;
pub(crate) mod rect;
pub(crate) mod seed;
pub mod sensor;
