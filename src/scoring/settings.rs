// Validated, immutable configuration for one comparison run.
//
// A ResonanceConfig can only be obtained through a constructor that checks
// the scale constant, and the metric is a closed enum, so any config that
// reaches the engine is already known to be usable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResonanceResult;
use crate::scoring::aggregate::validate_lambda;
use crate::scoring::metric::DistanceMetric;

/// What to do when a cosine metric meets a zero-norm vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Fail the affected target with `DegenerateVector`.
    #[default]
    Fail,
    /// Leave the word out of that target's sum and keep going.
    SkipWord,
}

impl FromStr for DegeneratePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(DegeneratePolicy::Fail),
            "skip" | "skip_word" => Ok(DegeneratePolicy::SkipWord),
            other => Err(format!(
                "unknown degenerate-vector policy '{other}' (expected 'fail' or 'skip')"
            )),
        }
    }
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegeneratePolicy::Fail => write!(f, "fail"),
            DegeneratePolicy::SkipWord => write!(f, "skip"),
        }
    }
}

/// Metric, scale constant and run options for one comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResonanceConfig {
    metric: DistanceMetric,
    lambda: f64,
    persist_detail: bool,
    parallel: bool,
    on_degenerate: DegeneratePolicy,
    report_dir: PathBuf,
}

/// Directory detail reports land in unless the caller picks one.
pub const DEFAULT_REPORT_DIR: &str = "output";

impl ResonanceConfig {
    /// Build a config, rejecting a non-positive or non-finite lambda.
    pub fn new(metric: DistanceMetric, lambda: f64) -> ResonanceResult<Self> {
        validate_lambda(lambda)?;
        Ok(Self {
            metric,
            lambda,
            persist_detail: false,
            parallel: false,
            on_degenerate: DegeneratePolicy::default(),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
        })
    }

    /// Config using the metric's recommended scale constant.
    pub fn recommended(metric: DistanceMetric) -> Self {
        Self {
            metric,
            lambda: metric.recommended_lambda(),
            persist_detail: false,
            parallel: false,
            on_degenerate: DegeneratePolicy::default(),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
        }
    }

    /// Parse a metric name and build a config in one step.
    ///
    /// Falls back to the recommended lambda when none is given.
    pub fn from_parts(metric: &str, lambda: Option<f64>) -> ResonanceResult<Self> {
        let metric: DistanceMetric = metric.parse()?;
        Self::new(metric, lambda.unwrap_or_else(|| metric.recommended_lambda()))
    }

    pub fn with_persist_detail(mut self, persist_detail: bool) -> Self {
        self.persist_detail = persist_detail;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.on_degenerate = policy;
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn persist_detail(&self) -> bool {
        self.persist_detail
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn on_degenerate(&self) -> DegeneratePolicy {
        self.on_degenerate
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}

impl Default for ResonanceConfig {
    fn default() -> Self {
        Self::recommended(DistanceMetric::Euclidean)
    }
}
