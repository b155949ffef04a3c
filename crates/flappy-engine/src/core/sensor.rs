//! Sensory encoding: turning an agent's view of the next gate into a fixed-order vector.
//!
//! An agent computes a [`SensorReadings`] record every step. A [`SensoryEncoder`]
//! projects the readings onto an ordered [`FeatureSet`] and produces a
//! [`SensorySnapshot`] that is handed to the agent's decision function.
//!
//! # Positional Contract
//!
//! Decision functions consume snapshots by position, not by name. A trained
//! model is only meaningful together with the exact feature order it was trained
//! on, which is why models store their [`FeatureSet`] next to their weights.
//!
//! # Presets
//!
//! | preset     | features                                                         |
//! |------------|------------------------------------------------------------------|
//! | `basic`    | `y, distance_to_gate, gap_center_y, rel_y_to_gap` (default)      |
//! | `head`     | `y, distance_to_gate, distance_to_gate_x, gap_center_y, rel_y_to_gap` |
//! | `extended` | `y, velocity, distance_to_gate, distance_to_gate_x, gap_center_y, rel_y_to_gap` |
//! | `full`     | all eight features in reading order                              |
//!
//! Custom orders are written as comma-separated feature ids:
//!
//! ```
//! use flappy_engine::{FeatureSet, SensorFeature};
//!
//! let set: FeatureSet = "rel_y_to_gap,velocity".parse().unwrap();
//! assert_eq!(set.features(), [SensorFeature::RelYToGap, SensorFeature::Velocity]);
//!
//! let preset: FeatureSet = "head".parse().unwrap();
//! assert_eq!(preset.arity(), 5);
//! ```

use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::GameConfig;

/// Upper bound on the number of features a snapshot can carry.
pub const MAX_FEATURES: usize = SensorFeature::ALL.len();

/// Raw per-step measurements of one agent relative to the current gate.
///
/// Positional values are taken before the step's physics integration.
/// `velocity`, `score` and `collision` reflect the state after the update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReadings {
    /// Vertical center of the agent.
    pub y: f32,
    pub velocity: f32,
    pub score: u32,
    pub collision: bool,
    /// Euclidean distance between agent center and gate center.
    pub distance_to_gate: f32,
    /// Signed horizontal distance from agent center to gate center.
    pub distance_to_gate_x: f32,
    /// Vertical center of the passable opening.
    pub gap_center_y: f32,
    /// Agent center minus opening center (positive when below the opening).
    pub rel_y_to_gap: f32,
}

/// A single encodable measurement, identified by a stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFeature {
    Y,
    Velocity,
    Score,
    Collision,
    DistanceToGate,
    DistanceToGateX,
    GapCenterY,
    RelYToGap,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FeatureSetError {
    #[display("unknown sensor feature `{name}`")]
    UnknownFeature { name: String },
    #[display("duplicate sensor feature `{feature}`")]
    Duplicate { feature: SensorFeature },
    #[display("feature set must contain at least one feature")]
    Empty,
}

impl SensorFeature {
    /// All features in reading order.
    pub const ALL: [Self; 8] = [
        Self::Y,
        Self::Velocity,
        Self::Score,
        Self::Collision,
        Self::DistanceToGate,
        Self::DistanceToGateX,
        Self::GapCenterY,
        Self::RelYToGap,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Y => "y",
            Self::Velocity => "velocity",
            Self::Score => "score",
            Self::Collision => "collision",
            Self::DistanceToGate => "distance_to_gate",
            Self::DistanceToGateX => "distance_to_gate_x",
            Self::GapCenterY => "gap_center_y",
            Self::RelYToGap => "rel_y_to_gap",
        }
    }

    /// Extracts this feature's raw value.
    #[must_use]
    pub fn read(self, readings: &SensorReadings) -> f32 {
        match self {
            Self::Y => readings.y,
            Self::Velocity => readings.velocity,
            #[expect(clippy::cast_precision_loss)]
            Self::Score => readings.score as f32,
            Self::Collision => f32::from(u8::from(readings.collision)),
            Self::DistanceToGate => readings.distance_to_gate,
            Self::DistanceToGateX => readings.distance_to_gate_x,
            Self::GapCenterY => readings.gap_center_y,
            Self::RelYToGap => readings.rel_y_to_gap,
        }
    }

    /// Typical magnitude of the raw value, used by policies to normalize inputs.
    #[must_use]
    pub fn scale(self, config: &GameConfig) -> f32 {
        match self {
            Self::Y | Self::GapCenterY | Self::RelYToGap => config.field.height,
            Self::Velocity => config.agent.max_velocity,
            Self::Score => 10.0,
            Self::Collision => 1.0,
            Self::DistanceToGate | Self::DistanceToGateX => config.field.width,
        }
    }
}

impl fmt::Display for SensorFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SensorFeature {
    type Err = FeatureSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.id() == s)
            .ok_or_else(|| FeatureSetError::UnknownFeature { name: s.to_owned() })
    }
}

/// Ordered, duplicate-free selection of sensor features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SensorFeature>", into = "Vec<SensorFeature>")]
pub struct FeatureSet {
    features: ArrayVec<SensorFeature, MAX_FEATURES>,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::basic()
    }
}

impl FeatureSet {
    pub fn new<I>(features: I) -> Result<Self, FeatureSetError>
    where
        I: IntoIterator<Item = SensorFeature>,
    {
        let mut set = ArrayVec::new();
        for feature in features {
            if set.contains(&feature) {
                return Err(FeatureSetError::Duplicate { feature });
            }
            // no duplicates and only eight variants, so capacity suffices
            set.push(feature);
        }
        if set.is_empty() {
            return Err(FeatureSetError::Empty);
        }
        Ok(Self { features: set })
    }

    fn from_slice(features: &[SensorFeature]) -> Self {
        Self {
            features: features.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn basic() -> Self {
        use SensorFeature as F;
        Self::from_slice(&[F::Y, F::DistanceToGate, F::GapCenterY, F::RelYToGap])
    }

    #[must_use]
    pub fn head() -> Self {
        use SensorFeature as F;
        Self::from_slice(&[
            F::Y,
            F::DistanceToGate,
            F::DistanceToGateX,
            F::GapCenterY,
            F::RelYToGap,
        ])
    }

    #[must_use]
    pub fn extended() -> Self {
        use SensorFeature as F;
        Self::from_slice(&[
            F::Y,
            F::Velocity,
            F::DistanceToGate,
            F::DistanceToGateX,
            F::GapCenterY,
            F::RelYToGap,
        ])
    }

    #[must_use]
    pub fn full() -> Self {
        Self::from_slice(&SensorFeature::ALL)
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn features(&self) -> &[SensorFeature] {
        &self.features
    }
}

impl TryFrom<Vec<SensorFeature>> for FeatureSet {
    type Error = FeatureSetError;

    fn try_from(value: Vec<SensorFeature>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeatureSet> for Vec<SensorFeature> {
    fn from(value: FeatureSet) -> Self {
        value.features.to_vec()
    }
}

impl FromStr for FeatureSet {
    type Err = FeatureSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "basic" => Ok(Self::basic()),
            "head" => Ok(Self::head()),
            "extended" => Ok(Self::extended()),
            "full" => Ok(Self::full()),
            list => Self::new(
                list.split(',')
                    .map(|name| name.trim().parse())
                    .collect::<Result<Vec<SensorFeature>, _>>()?,
            ),
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, feature) in self.features.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{feature}")?;
        }
        Ok(())
    }
}

/// The encoded input vector for one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorySnapshot {
    values: ArrayVec<f32, MAX_FEATURES>,
}

impl SensorySnapshot {
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Projects sensor readings onto a fixed feature order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensoryEncoder {
    features: FeatureSet,
}

impl SensoryEncoder {
    #[must_use]
    pub const fn new(features: FeatureSet) -> Self {
        Self { features }
    }

    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.features.arity()
    }

    #[must_use]
    pub fn encode(&self, readings: &SensorReadings) -> SensorySnapshot {
        SensorySnapshot {
            values: self
                .features
                .features()
                .iter()
                .map(|feature| feature.read(readings))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_readings() -> SensorReadings {
        SensorReadings {
            y: 67.5,
            velocity: -1.5,
            score: 3,
            collision: true,
            distance_to_gate: 50.0,
            distance_to_gate_x: 40.0,
            gap_center_y: 37.5,
            rel_y_to_gap: 30.0,
        }
    }

    #[test]
    fn test_presets_have_expected_arity() {
        assert_eq!(FeatureSet::basic().arity(), 4);
        assert_eq!(FeatureSet::head().arity(), 5);
        assert_eq!(FeatureSet::extended().arity(), 6);
        assert_eq!(FeatureSet::full().arity(), 8);
        assert_eq!(FeatureSet::default(), FeatureSet::basic());
    }

    #[test]
    fn test_encode_follows_feature_order() {
        let encoder = SensoryEncoder::new(FeatureSet::full());
        let snapshot = encoder.encode(&sample_readings());
        assert_eq!(
            snapshot.values(),
            [67.5, -1.5, 3.0, 1.0, 50.0, 40.0, 37.5, 30.0]
        );

        let encoder = SensoryEncoder::new("rel_y_to_gap,y".parse().unwrap());
        let snapshot = encoder.encode(&sample_readings());
        assert_eq!(snapshot.values(), [30.0, 67.5]);
    }

    #[test]
    fn test_parse_rejects_bad_lists() {
        assert!(matches!(
            "y,wingspan".parse::<FeatureSet>(),
            Err(FeatureSetError::UnknownFeature { name }) if name == "wingspan"
        ));
        assert!(matches!(
            "y,velocity,y".parse::<FeatureSet>(),
            Err(FeatureSetError::Duplicate {
                feature: SensorFeature::Y
            })
        ));
        assert!(FeatureSet::new([]).is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let set = FeatureSet::extended();
        let parsed: FeatureSet = set.to_string().parse().unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_serde_uses_feature_ids() {
        let json = serde_json::to_string(&FeatureSet::basic()).unwrap();
        assert_eq!(
            json,
            r#"["y","distance_to_gate","gap_center_y","rel_y_to_gap"]"#
        );
        assert!(serde_json::from_str::<FeatureSet>(r#"["y","y"]"#).is_err());
    }
}
