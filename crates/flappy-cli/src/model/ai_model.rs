use chrono::{DateTime, Utc};
use flappy_engine::{FeatureSet, GameConfig};
use flappy_evaluator::policy::{LinearPolicy, PolicyError};
use serde::{Deserialize, Serialize};

/// A trained linear policy together with the world it was trained in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f32,
    /// Inputs in the order the weights apply to them.
    pub features: FeatureSet,
    pub weights: Vec<f32>,
    pub bias: f32,
    pub config: GameConfig,
}

impl AiModel {
    pub fn to_policy(&self, config: &GameConfig) -> Result<LinearPolicy, PolicyError> {
        LinearPolicy::new(&self.features, config, self.weights.clone(), self.bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> AiModel {
        AiModel {
            name: "test".to_owned(),
            trained_at: DateTime::UNIX_EPOCH,
            final_fitness: 12.5,
            features: FeatureSet::basic(),
            weights: vec![0.1, -0.2, 0.3, 0.4],
            bias: -0.05,
            config: GameConfig::default(),
        }
    }

    #[test]
    fn test_json_round_trip_keeps_policy() {
        let json = serde_json::to_string(&model()).unwrap();
        assert!(json.contains(r#""features":["y","distance_to_gate","gap_center_y","rel_y_to_gap"]"#));

        let parsed: AiModel = serde_json::from_str(&json).unwrap();
        let policy = parsed.to_policy(&parsed.config).unwrap();
        assert_eq!(policy.weights(), model().weights);
    }

    #[test]
    fn test_weight_count_must_match_features() {
        let mut model = model();
        model.weights.pop();
        assert!(model.to_policy(&GameConfig::default()).is_err());
    }
}
