//! Learned-policy adapter: a linear model squashed by a sigmoid.
//!
//! ```text
//! activation = sigmoid(Σ wᵢ · xᵢ / scaleᵢ + bias)
//! ```
//!
//! Each input `xᵢ` is divided by a scale derived from the field geometry
//! ([`SensorFeature::scale`]) so that weights of different features are
//! comparable. The agent jumps when the activation exceeds 0.5, which
//! happens exactly when the linear term is positive; multiplying every
//! weight and the bias by the same positive factor therefore does not
//! change behavior. Training relies on this to keep genomes L1-normalized.
//!
//! # Genome Layout
//!
//! For training, a policy is flattened into a *genome*: the feature weights
//! in feature order followed by the bias.
//!
//! # Example
//!
//! ```
//! use flappy_engine::{DecisionFunction, FeatureSet, GameConfig, SensoryEncoder, SensorReadings};
//! use flappy_evaluator::policy::LinearPolicy;
//!
//! let config = GameConfig::default();
//! let features: FeatureSet = "rel_y_to_gap".parse().unwrap();
//! // jump whenever the agent is below the gap center
//! let mut policy = LinearPolicy::new(&features, &config, vec![1.0], 0.0).unwrap();
//!
//! let encoder = SensoryEncoder::new(features);
//! let below = SensorReadings { rel_y_to_gap: 20.0, ..SensorReadings::default() };
//! let above = SensorReadings { rel_y_to_gap: -20.0, ..SensorReadings::default() };
//! assert!(policy.decide(&encoder.encode(&below)).unwrap() > 0.5);
//! assert!(policy.decide(&encoder.encode(&above)).unwrap() < 0.5);
//! ```

use flappy_engine::{
    DecisionError, DecisionFunction, FeatureSet, GameConfig, SensorFeature, SensorySnapshot,
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum PolicyError {
    #[display("expected {expected} weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },
    #[display("weight {index} is not finite")]
    NonFiniteWeight { index: usize },
}

/// Linear threshold policy over a fixed feature set.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPolicy {
    weights: Vec<f32>,
    bias: f32,
    inv_scales: Vec<f32>,
}

impl LinearPolicy {
    /// Creates a policy with one weight per feature of `features`.
    pub fn new(
        features: &FeatureSet,
        config: &GameConfig,
        weights: Vec<f32>,
        bias: f32,
    ) -> Result<Self, PolicyError> {
        if weights.len() != features.arity() {
            return Err(PolicyError::WeightCount {
                expected: features.arity(),
                actual: weights.len(),
            });
        }
        if let Some(index) = weights
            .iter()
            .chain([&bias])
            .position(|w| !w.is_finite())
        {
            return Err(PolicyError::NonFiniteWeight { index });
        }
        let inv_scales = features
            .features()
            .iter()
            .map(|feature| feature.scale(config).recip())
            .collect();
        Ok(Self {
            weights,
            bias,
            inv_scales,
        })
    }

    /// Creates a policy from a flattened genome (weights followed by bias).
    pub fn from_genome(
        features: &FeatureSet,
        config: &GameConfig,
        genome: &[f32],
    ) -> Result<Self, PolicyError> {
        let Some((&bias, weights)) = genome.split_last() else {
            return Err(PolicyError::WeightCount {
                expected: features.arity() + 1,
                actual: 0,
            });
        };
        if weights.len() != features.arity() {
            return Err(PolicyError::WeightCount {
                expected: features.arity() + 1,
                actual: genome.len(),
            });
        }
        Self::new(features, config, weights.to_vec(), bias)
    }

    /// Length of the genome for a feature set.
    #[must_use]
    pub fn genome_len(features: &FeatureSet) -> usize {
        features.arity() + 1
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Weighted sum of scaled inputs plus bias, before the sigmoid.
    #[must_use]
    pub fn linear_term(&self, inputs: &[f32]) -> f32 {
        self.weights
            .iter()
            .zip(&self.inv_scales)
            .zip(inputs)
            .map(|((w, inv_scale), x)| w * x * inv_scale)
            .sum::<f32>()
            + self.bias
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl DecisionFunction for LinearPolicy {
    fn input_arity(&self) -> usize {
        self.weights.len()
    }

    fn decide(&mut self, snapshot: &SensorySnapshot) -> Result<f32, DecisionError> {
        if snapshot.len() != self.weights.len() {
            return Err(DecisionError::ArityMismatch {
                expected: self.weights.len(),
                actual: snapshot.len(),
            });
        }
        let z = self.linear_term(snapshot.values());
        if !z.is_finite() {
            return Err(DecisionError::NonFinite { value: z });
        }
        Ok(sigmoid(z))
    }
}

/// Hand-written policy that steers toward the gap center.
///
/// Useful as a baseline and for seeding populations: it jumps once the agent
/// has sunk three quarters of its own height below the middle of the opening.
/// A jump lifts the agent by a fixed amount, so the margin keeps the apex of
/// the arc clear of the top obstacle. Requires [`SensorFeature::RelYToGap`] in
/// the feature set.
#[must_use]
pub fn gap_follower(features: &FeatureSet, config: &GameConfig) -> Option<LinearPolicy> {
    let weights = features
        .features()
        .iter()
        .map(|&feature| {
            if feature == SensorFeature::RelYToGap {
                1.0
            } else {
                0.0
            }
        })
        .collect::<Vec<_>>();
    if !weights.contains(&1.0) {
        return None;
    }
    let margin = config.agent.height * 0.75;
    let bias = -margin / SensorFeature::RelYToGap.scale(config);
    LinearPolicy::new(features, config, weights, bias).ok()
}

#[cfg(test)]
mod tests {
    use flappy_engine::{SensorReadings, SensoryEncoder};

    use super::*;

    #[test]
    fn test_rejects_wrong_weight_count() {
        let config = GameConfig::default();
        let result = LinearPolicy::new(&FeatureSet::basic(), &config, vec![1.0; 3], 0.0);
        assert_eq!(
            result,
            Err(PolicyError::WeightCount {
                expected: 4,
                actual: 3
            })
        );
        let result = LinearPolicy::new(&FeatureSet::basic(), &config, vec![1.0; 4], f32::NAN);
        assert_eq!(result, Err(PolicyError::NonFiniteWeight { index: 4 }));
    }

    #[test]
    fn test_genome_round_trip() {
        let config = GameConfig::default();
        let features = FeatureSet::head();
        let genome = [0.1, -0.2, 0.3, -0.4, 0.5, 0.6];
        let policy = LinearPolicy::from_genome(&features, &config, &genome).unwrap();
        assert_eq!(policy.weights(), &genome[..5]);
        assert!((policy.bias() - 0.6).abs() < f32::EPSILON);
        assert_eq!(LinearPolicy::genome_len(&features), 6);

        assert!(LinearPolicy::from_genome(&features, &config, &genome[..5]).is_err());
        assert!(LinearPolicy::from_genome(&features, &config, &[]).is_err());
    }

    #[test]
    fn test_inputs_are_scaled() {
        let config = GameConfig::default();
        let features: FeatureSet = "y".parse().unwrap();
        let policy = LinearPolicy::new(&features, &config, vec![2.0], 0.5).unwrap();
        // 2 * 135 / 135 + 0.5
        assert!((policy.linear_term(&[135.0]) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_decide_checks_arity() {
        let config = GameConfig::default();
        let mut policy = LinearPolicy::new(&FeatureSet::basic(), &config, vec![0.0; 4], 0.0).unwrap();
        let encoder = SensoryEncoder::new(FeatureSet::full());
        let snapshot = encoder.encode(&SensorReadings::default());
        assert_eq!(
            policy.decide(&snapshot),
            Err(DecisionError::ArityMismatch {
                expected: 4,
                actual: 8
            })
        );
    }

    #[test]
    fn test_zero_policy_sits_on_threshold() {
        let config = GameConfig::default();
        let mut policy = LinearPolicy::new(&FeatureSet::basic(), &config, vec![0.0; 4], 0.0).unwrap();
        let encoder = SensoryEncoder::default();
        let activation = policy.decide(&encoder.encode(&SensorReadings::default())).unwrap();
        // 0.5 is not above the threshold, so this never jumps
        assert!((activation - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gap_follower_requires_relative_feature() {
        let config = GameConfig::default();
        assert!(gap_follower(&FeatureSet::basic(), &config).is_some());
        let features: FeatureSet = "y,velocity".parse().unwrap();
        assert!(gap_follower(&features, &config).is_none());
    }

    #[test]
    fn test_gap_follower_threshold() {
        let config = GameConfig::default();
        let mut policy = gap_follower(&FeatureSet::basic(), &config).unwrap();
        let encoder = SensoryEncoder::default();
        let mut decide = |rel_y_to_gap: f32| {
            let readings = SensorReadings {
                rel_y_to_gap,
                ..SensorReadings::default()
            };
            policy.decide(&encoder.encode(&readings)).unwrap()
        };
        // margin is 9 units below the gap center
        assert!(decide(8.0) < 0.5);
        assert!(decide(10.0) > 0.5);
        assert!(decide(-20.0) < 0.5);
    }
}
