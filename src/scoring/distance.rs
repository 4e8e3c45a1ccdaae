// Per-word distance evaluation between a baseline and a target embedding.
//
// The cosine metrics guard against zero-norm vectors explicitly: a zero
// vector has no direction, so the comparison is reported as DegenerateVector
// instead of letting a 0/0 NaN leak into the aggregate sum.

use crate::error::{ResonanceError, ResonanceResult};
use crate::scoring::metric::DistanceMetric;

/// Compute the distance between two equal-length vectors under `metric`.
///
/// For the cosine metrics the returned value is a similarity, see
/// [`DistanceMetric::higher_is_closer`].
pub fn distance(a: &[f64], b: &[f64], metric: DistanceMetric) -> ResonanceResult<f64> {
    check_dimensions(a, b)?;

    let value = match metric {
        DistanceMetric::Euclidean => euclidean(a, b),
        DistanceMetric::Manhattan => manhattan(a, b),
        DistanceMetric::CosineSimNeg => cosine_similarity(a, b)?,
        DistanceMetric::CosineSimPos => cosine_similarity(a, b)?.max(0.0),
    };

    Ok(value)
}

/// Plain cosine similarity in [-1, 1].
///
/// Fails with `DimensionMismatch` for unequal or empty vectors and with
/// `DegenerateVector` if either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> ResonanceResult<f64> {
    check_dimensions(a, b)?;

    if is_zero_norm(a) || is_zero_norm(b) {
        return Err(ResonanceError::DegenerateVector { word: None });
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a = norm(a);
    let mag_b = norm(b);

    // Rounding can push |cos| a hair past 1 for parallel vectors.
    Ok((dot / (mag_a * mag_b)).clamp(-1.0, 1.0))
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// True when `v` has no direction a cosine metric could compare.
pub fn is_zero_norm(v: &[f64]) -> bool {
    norm(v) == 0.0
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn check_dimensions(a: &[f64], b: &[f64]) -> ResonanceResult<()> {
    if a.len() != b.len() || a.is_empty() {
        return Err(ResonanceError::DimensionMismatch {
            word: None,
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(())
}
