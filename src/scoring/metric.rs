// Distance metrics — the closed set of ways to compare two embeddings.
//
// The string names are the ones stored alongside past results, so they are
// part of the configuration format and must not change. In particular
// `cosine_sim_neg` is a legacy label: it computes plain cosine similarity
// (which can be negative), not a negated cosine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResonanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// L2 norm of the difference.
    Euclidean,
    /// Sum of absolute differences.
    Manhattan,
    /// Cosine similarity in [-1, 1]. Legacy name.
    CosineSimNeg,
    /// Cosine similarity clamped at zero, in [0, 1].
    CosineSimPos,
}

impl DistanceMetric {
    /// Every supported metric, in the order they are reported.
    pub const ALL: [DistanceMetric; 4] = [
        DistanceMetric::Euclidean,
        DistanceMetric::Manhattan,
        DistanceMetric::CosineSimNeg,
        DistanceMetric::CosineSimPos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::CosineSimNeg => "cosine_sim_neg",
            DistanceMetric::CosineSimPos => "cosine_sim_pos",
        }
    }

    /// Empirically tuned scale constant that lands a ~100-dimensional,
    /// few-thousand-word comparison in a readable part of the squash curve.
    ///
    /// Aggregation sums per-word distances, so these only hold for
    /// vocabularies of roughly that size.
    pub fn recommended_lambda(&self) -> f64 {
        match self {
            DistanceMetric::Euclidean => 10_000.0,
            DistanceMetric::Manhattan => 100_000.0,
            DistanceMetric::CosineSimNeg => 2_500.0,
            DistanceMetric::CosineSimPos => 2_700.0,
        }
    }

    /// True for the metrics that divide by vector norms.
    pub fn is_cosine(&self) -> bool {
        matches!(
            self,
            DistanceMetric::CosineSimNeg | DistanceMetric::CosineSimPos
        )
    }

    /// Whether a larger per-word value means the corpora are more alike.
    ///
    /// Euclidean and manhattan are true distances; the cosine variants are
    /// similarities despite flowing through the same "distance" slot.
    pub fn higher_is_closer(&self) -> bool {
        self.is_cosine()
    }
}

impl FromStr for DistanceMetric {
    type Err = ResonanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "manhattan" => Ok(DistanceMetric::Manhattan),
            "cosine_sim_neg" => Ok(DistanceMetric::CosineSimNeg),
            "cosine_sim_pos" => Ok(DistanceMetric::CosineSimPos),
            _ => Err(ResonanceError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
