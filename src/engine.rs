// Resonance engine — compare N target corpora against one baseline.
//
// For one baseline and its targets, the engine:
// 1. Intersects the vocabulary of the baseline and ALL targets jointly, so
//    every target is scored over the same words
// 2. Computes a per-word distance between baseline and each target
// 3. Squashes each target's summed distance into a 0-100 resonance score
// 4. Optionally writes the per-word detail report
//
// The vocabulary is materialized once in `ResonanceEngine::new` and reused
// by every run, which is what lets `sweep` report all four metrics over an
// identical word basis.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::embeddings::map::EmbeddingMap;
use crate::embeddings::vocabulary::{self, CommonVocabulary};
use crate::error::{ResonanceError, ResonanceResult};
use crate::output::report;
use crate::scoring::aggregate::aggregate;
use crate::scoring::distance::{distance, is_zero_norm};
use crate::scoring::metric::DistanceMetric;
use crate::scoring::settings::{DegeneratePolicy, ResonanceConfig};

/// A target corpus's embeddings together with a display label.
#[derive(Debug, Clone, Copy)]
pub struct LabeledMap<'a> {
    pub label: &'a str,
    pub embeddings: &'a EmbeddingMap,
}

impl<'a> LabeledMap<'a> {
    pub fn new(label: &'a str, embeddings: &'a EmbeddingMap) -> Self {
        Self { label, embeddings }
    }
}

/// Outcome of scoring one target in one run.
#[derive(Debug)]
pub struct TargetScore {
    pub label: String,
    /// The resonance score, or why this target could not be scored.
    pub outcome: ResonanceResult<f64>,
    /// Per-word distances aligned with the run's vocabulary. `None` marks a
    /// skipped word; a failed target has no distances at all.
    pub distances: Vec<Option<f64>>,
    /// Words left out under `DegeneratePolicy::SkipWord`; the same for every
    /// target of a run.
    pub skipped: usize,
}

impl TargetScore {
    pub fn score(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&ResonanceError> {
        self.outcome.as_ref().err()
    }
}

/// Everything one comparison run produced.
#[derive(Debug)]
pub struct ResonanceRun {
    pub config: ResonanceConfig,
    pub vocabulary_size: usize,
    /// One entry per target, in input order.
    pub targets: Vec<TargetScore>,
    /// Where the detail report went, or why it could not be written.
    /// `None` when persistence was not requested.
    pub report: Option<ResonanceResult<PathBuf>>,
}

impl ResonanceRun {
    /// Scores in target input order; failed targets are `None`.
    pub fn scores(&self) -> Vec<Option<f64>> {
        self.targets.iter().map(TargetScore::score).collect()
    }

    /// Target indices ordered from most to least resonant. Failed targets
    /// sort last, in input order.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.targets.len()).collect();
        order.sort_by(|&a, &b| {
            match (self.targets[a].score(), self.targets[b].score()) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        order
    }

    /// Serializable view of the run for `--json` output.
    pub fn summary(&self) -> RunSummary {
        let (report_path, report_error) = match &self.report {
            Some(Ok(path)) => (Some(path.display().to_string()), None),
            Some(Err(e)) => (None, Some(e.to_string())),
            None => (None, None),
        };

        RunSummary {
            metric: self.config.metric(),
            lambda: self.config.lambda(),
            vocabulary_size: self.vocabulary_size,
            targets: self
                .targets
                .iter()
                .map(|t| TargetSummary {
                    label: t.label.clone(),
                    score: t.score(),
                    error: t.error().map(ToString::to_string),
                    words_scored: t.distances.iter().filter(|d| d.is_some()).count(),
                    words_skipped: t.skipped,
                })
                .collect(),
            report_path,
            report_error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub metric: DistanceMetric,
    pub lambda: f64,
    pub vocabulary_size: usize,
    pub targets: Vec<TargetSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub label: String,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub words_scored: usize,
    pub words_skipped: usize,
}

/// Baseline plus targets with their shared vocabulary already materialized.
pub struct ResonanceEngine<'a> {
    baseline: &'a EmbeddingMap,
    targets: Vec<LabeledMap<'a>>,
    vocabulary: CommonVocabulary,
}

impl<'a> ResonanceEngine<'a> {
    /// Intersect the vocabulary of the baseline and every target.
    ///
    /// Fails with `NoTargets` for an empty target list and with
    /// `EmptyVocabulary` (carrying each map's word count, baseline first)
    /// when no word appears in all maps.
    pub fn new(baseline: &'a EmbeddingMap, targets: Vec<LabeledMap<'a>>) -> ResonanceResult<Self> {
        if targets.is_empty() {
            return Err(ResonanceError::NoTargets);
        }

        let mut maps: Vec<&EmbeddingMap> = Vec::with_capacity(targets.len() + 1);
        maps.push(baseline);
        maps.extend(targets.iter().map(|t| t.embeddings));

        let vocabulary = vocabulary::intersect(&maps);
        if vocabulary.is_empty() {
            return Err(ResonanceError::EmptyVocabulary {
                word_counts: vocabulary.map_sizes().to_vec(),
            });
        }

        info!(
            common_words = vocabulary.len(),
            targets = targets.len(),
            baseline_words = baseline.len(),
            "Common vocabulary materialized"
        );

        Ok(Self {
            baseline,
            targets,
            vocabulary,
        })
    }

    pub fn vocabulary(&self) -> &CommonVocabulary {
        &self.vocabulary
    }

    /// Score every target under one configuration.
    ///
    /// Per-target failures (dimension mismatch, degenerate vectors under
    /// `DegeneratePolicy::Fail`) only affect that target's outcome. Under
    /// `DegeneratePolicy::SkipWord` the skipped words are chosen once for the
    /// whole run, so every target is summed over the same words.
    pub fn run(&self, config: &ResonanceConfig) -> ResonanceRun {
        let skip = self.skipped_words(config);
        let targets: Vec<TargetScore> = self
            .targets
            .iter()
            .map(|target| self.score_target(target, config, &skip))
            .collect();

        let scored = targets.iter().filter(|t| t.outcome.is_ok()).count();
        info!(
            metric = %config.metric(),
            lambda = config.lambda(),
            scored,
            failed = targets.len() - scored,
            "Resonance run complete"
        );

        let report = config.persist_detail().then(|| {
            let result = report::write_report(
                config.report_dir(),
                config.metric(),
                self.vocabulary.words(),
                &targets,
            );
            if let Err(e) = &result {
                warn!(error = %e, "Detail report not written");
            }
            result
        });

        ResonanceRun {
            config: config.clone(),
            vocabulary_size: self.vocabulary.len(),
            targets,
            report,
        }
    }

    /// Run several configurations over the same vocabulary.
    pub fn sweep(&self, configs: &[ResonanceConfig]) -> Vec<ResonanceRun> {
        configs.iter().map(|config| self.run(config)).collect()
    }

    /// Vocabulary mask of words left out of every target's sum.
    ///
    /// All false unless `DegeneratePolicy::SkipWord` meets a cosine metric;
    /// a word is skipped when its baseline vector, or its vector in any target
    /// that can be compared at all, has zero norm.
    fn skipped_words(&self, config: &ResonanceConfig) -> Vec<bool> {
        let words = self.vocabulary.words();
        if config.on_degenerate() != DegeneratePolicy::SkipWord || !config.metric().is_cosine() {
            return vec![false; words.len()];
        }

        let maps: Vec<&EmbeddingMap> = std::iter::once(self.baseline)
            .chain(
                self.targets
                    .iter()
                    .map(|t| t.embeddings)
                    .filter(|m| m.dim() == self.baseline.dim()),
            )
            .collect();

        let skip: Vec<bool> = words
            .iter()
            .map(|word| maps.iter().any(|m| m.get(word).is_some_and(is_zero_norm)))
            .collect();

        let skipped = skip.iter().filter(|s| **s).count();
        if skipped > 0 {
            warn!(
                skipped,
                common_words = words.len(),
                "Words with zero-norm vectors left out of every target's score"
            );
        }
        skip
    }

    fn score_target(
        &self,
        target: &LabeledMap<'_>,
        config: &ResonanceConfig,
        skip: &[bool],
    ) -> TargetScore {
        let failed = |error: ResonanceError| TargetScore {
            label: target.label.to_string(),
            outcome: Err(error),
            distances: Vec::new(),
            skipped: 0,
        };

        if self.baseline.dim() != target.embeddings.dim() {
            return failed(ResonanceError::DimensionMismatch {
                word: None,
                expected: self.baseline.dim(),
                found: target.embeddings.dim(),
            });
        }

        let metric = config.metric();
        let words = self.vocabulary.words();
        let evaluate = |(word, skipped): (&String, &bool)| -> Option<ResonanceResult<f64>> {
            if *skipped {
                return None;
            }
            match (self.baseline.get(word), target.embeddings.get(word)) {
                (Some(a), Some(b)) => Some(distance(a, b, metric)),
                _ => unreachable!("common vocabulary word '{word}' missing from a map"),
            }
        };

        // Collection preserves vocabulary order, so the serial sum below is
        // identical whether or not the distances were computed in parallel.
        let per_word: Vec<Option<ResonanceResult<f64>>> = if config.parallel() {
            words.par_iter().zip(skip.par_iter()).map(evaluate).collect()
        } else {
            words.iter().zip(skip.iter()).map(evaluate).collect()
        };

        let mut distances = Vec::with_capacity(words.len());
        for (word, result) in words.iter().zip(per_word) {
            match result {
                Some(Ok(d)) => distances.push(Some(d)),
                None => distances.push(None),
                Some(Err(e)) => return failed(e.for_word(word)),
            }
        }

        let skipped = skip.iter().filter(|s| **s).count();
        let values: Vec<f64> = distances.iter().flatten().copied().collect();
        let outcome = if values.is_empty() {
            Err(ResonanceError::NothingToScore { skipped })
        } else {
            aggregate(&values, config.lambda(), metric)
        };

        match &outcome {
            Ok(score) => debug!(
                target_label = target.label,
                words = values.len(),
                score = *score,
                "Target scored"
            ),
            Err(e) => debug!(target_label = target.label, error = %e, "Target not scored"),
        }

        TargetScore {
            label: target.label.to_string(),
            outcome,
            distances,
            skipped,
        }
    }
}

/// One-shot comparison without labels or persistence.
///
/// Returns one score result per target, in input order. Run-level errors
/// (no targets, empty vocabulary) fail the whole call.
pub fn compare(
    baseline: &EmbeddingMap,
    targets: &[&EmbeddingMap],
    config: &ResonanceConfig,
) -> ResonanceResult<Vec<ResonanceResult<f64>>> {
    let labels: Vec<String> = (1..=targets.len()).map(|i| format!("t{i}")).collect();
    let labeled = labels
        .iter()
        .zip(targets)
        .map(|(label, map)| LabeledMap::new(label, map))
        .collect();

    let engine = ResonanceEngine::new(baseline, labeled)?;
    let config = config.clone().with_persist_detail(false);
    let run = engine.run(&config);

    Ok(run.targets.into_iter().map(|t| t.outcome).collect())
}

/// One config per metric, each at its recommended scale constant.
pub fn recommended_sweep() -> Vec<ResonanceConfig> {
    DistanceMetric::ALL
        .into_iter()
        .map(ResonanceConfig::recommended)
        .collect()
}
