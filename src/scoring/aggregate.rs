// Resonance aggregation — squash a summed distance into a 0-100 score.
//
// The squash is applied to the SUM of per-word distances, not the mean, so a
// scale constant tuned for one vocabulary size will saturate (or flatten) on
// a much larger (or smaller) one:
//
//   euclidean / manhattan:  100 - 100 * tanh(S / lambda)     (0, 100]
//   cosine_sim_neg:         100 / (1 + exp(-S / lambda))     (0, 100)
//   cosine_sim_pos:         100 * tanh(S / lambda)           [0, 100)
//
// For true distances a larger sum means lower resonance; for the cosine
// variants a larger summed similarity means higher resonance.

use crate::error::{ResonanceError, ResonanceResult};
use crate::scoring::metric::DistanceMetric;

/// Reduce a distance sequence to a resonance score.
///
/// Sums the sequence serially in the given order, so the result is
/// reproducible for a fixed vocabulary ordering. An empty sequence yields the
/// metric's zero-sum value (100, 50 or 0). A NaN or infinite sum fails with
/// `NonFiniteValue` rather than squashing to a meaningless score.
pub fn aggregate(distances: &[f64], lambda: f64, metric: DistanceMetric) -> ResonanceResult<f64> {
    validate_lambda(lambda)?;
    let sum: f64 = distances.iter().sum();
    if !sum.is_finite() {
        return Err(ResonanceError::NonFiniteValue { word: None });
    }
    Ok(squash(sum, lambda, metric))
}

/// Apply the metric's squashing function to an already-summed distance.
///
/// `lambda` is assumed valid; use [`aggregate`] or a validated
/// `ResonanceConfig` to get that guarantee.
pub fn squash(sum: f64, lambda: f64, metric: DistanceMetric) -> f64 {
    let x = sum / lambda;
    let score = match metric {
        DistanceMetric::Euclidean | DistanceMetric::Manhattan => 100.0 - 100.0 * x.tanh(),
        DistanceMetric::CosineSimNeg => 100.0 / (1.0 + (-x).exp()),
        DistanceMetric::CosineSimPos => 100.0 * x.tanh(),
    };
    // Saturated tanh can land a few ulps outside the declared range.
    score.clamp(0.0, 100.0)
}

/// Lambda must be finite and strictly positive.
pub fn validate_lambda(lambda: f64) -> ResonanceResult<()> {
    if !lambda.is_finite() || lambda <= 0.0 {
        return Err(ResonanceError::InvalidScale(lambda));
    }
    Ok(())
}
