// Scoring — distance metrics, per-word distances and resonance aggregation.

pub mod aggregate;
pub mod distance;
pub mod metric;
pub mod settings;
