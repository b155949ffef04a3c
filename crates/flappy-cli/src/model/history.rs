use serde::{Deserialize, Serialize};

/// One line of the training history: a summary of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub phase: String,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub best_score: u32,
    /// Mean number of agents still flying when sessions stopped.
    pub survivors: f32,
    /// Mean session length in steps.
    pub steps: f32,
}
