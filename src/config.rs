use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use resonance::scoring::metric::DistanceMetric;
use resonance::scoring::settings::{DegeneratePolicy, ResonanceConfig, DEFAULT_REPORT_DIR};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override anything set here.
pub struct Config {
    /// RESONANCE_METRIC (default: euclidean)
    pub metric: DistanceMetric,
    /// RESONANCE_LAMBDA. When unset the metric's recommended value is used.
    pub lambda: Option<f64>,
    /// RESONANCE_REPORT_DIR (default: ./output)
    pub report_dir: PathBuf,
    /// RESONANCE_PERSIST_DETAIL
    pub persist_detail: bool,
    /// RESONANCE_PARALLEL
    pub parallel: bool,
    /// RESONANCE_ON_DEGENERATE: "fail" (default) or "skip"
    pub on_degenerate: DegeneratePolicy,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Invalid values fail here rather than halfway through a run.
    pub fn load() -> Result<Self> {
        let metric = match env::var("RESONANCE_METRIC") {
            Ok(name) => name
                .parse::<DistanceMetric>()
                .context("RESONANCE_METRIC is not a supported metric")?,
            Err(_) => DistanceMetric::Euclidean,
        };

        let lambda = match env::var("RESONANCE_LAMBDA") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<f64>()
                    .with_context(|| format!("RESONANCE_LAMBDA must be a number, got '{raw}'"))?,
            ),
            Err(_) => None,
        };

        let on_degenerate = match env::var("RESONANCE_ON_DEGENERATE") {
            Ok(raw) => raw
                .parse::<DegeneratePolicy>()
                .map_err(|e| anyhow::anyhow!(e))?,
            Err(_) => DegeneratePolicy::default(),
        };

        Ok(Self {
            metric,
            lambda,
            report_dir: env::var("RESONANCE_REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPORT_DIR)),
            persist_detail: env_flag("RESONANCE_PERSIST_DETAIL"),
            parallel: env_flag("RESONANCE_PARALLEL"),
            on_degenerate,
        })
    }

    /// Build the validated run configuration for `metric` (or the configured
    /// default).
    ///
    /// An explicit lambda wins. RESONANCE_LAMBDA only applies to the metric
    /// it was configured alongside; any other metric falls back to its
    /// recommended value.
    pub fn resonance_config(
        &self,
        metric: Option<DistanceMetric>,
        lambda: Option<f64>,
    ) -> Result<ResonanceConfig> {
        let metric = metric.unwrap_or(self.metric);
        let env_lambda = if metric == self.metric {
            self.lambda
        } else {
            None
        };
        let lambda = lambda
            .or(env_lambda)
            .unwrap_or_else(|| metric.recommended_lambda());

        let config = ResonanceConfig::new(metric, lambda)?
            .with_persist_detail(self.persist_detail)
            .with_parallel(self.parallel)
            .with_degenerate_policy(self.on_degenerate)
            .with_report_dir(self.report_dir.clone());

        Ok(config)
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
