// Error taxonomy for the resonance scoring engine.
//
// Configuration errors (UnknownMetric, InvalidScale) are raised when a
// ResonanceConfig is built, before any distance is computed. EmptyVocabulary
// and NoTargets abort a whole run. DimensionMismatch, DegenerateVector,
// NonFiniteValue and NothingToScore only fail the target they occurred in.
// PersistenceFailure never invalidates scores.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the scoring engine.
pub type ResonanceResult<T> = Result<T, ResonanceError>;

#[derive(Error, Debug)]
pub enum ResonanceError {
    /// Two vectors that must be compared have different lengths (or are empty).
    #[error(
        "dimension mismatch{}: expected {}, found {}",
        word_suffix(.word),
        .expected,
        .found
    )]
    DimensionMismatch {
        word: Option<String>,
        expected: usize,
        found: usize,
    },

    /// A metric name outside the supported set.
    #[error(
        "unknown metric '{0}' (expected one of: euclidean, manhattan, cosine_sim_neg, cosine_sim_pos)"
    )]
    UnknownMetric(String),

    /// The scale constant must be a finite positive number.
    #[error("invalid scale constant {0}: lambda must be finite and greater than zero")]
    InvalidScale(f64),

    /// A zero-norm vector was passed to a cosine metric.
    #[error("zero-norm vector{} cannot be compared with a cosine metric", word_suffix(.word))]
    DegenerateVector { word: Option<String> },

    /// An embedding component or a distance sum is NaN or infinite.
    #[error("non-finite value{} in resonance input", word_suffix(.word))]
    NonFiniteValue { word: Option<String> },

    /// Every common word was skipped as degenerate, leaving nothing to sum.
    #[error("all {} common words were skipped as zero-norm vectors; nothing left to score", .skipped)]
    NothingToScore { skipped: usize },

    /// A comparison needs at least one target corpus.
    #[error("no target embeddings supplied")]
    NoTargets,

    /// No word appears in every embedding map of the run.
    #[error(
        "no words common to all embedding maps (words per map: {:?})",
        .word_counts
    )]
    EmptyVocabulary { word_counts: Vec<usize> },

    /// The detail report could not be written.
    #[error("failed to write resonance report to {}: {}", .path.display(), .source)]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResonanceError {
    /// Attach the word being compared to a per-word error.
    pub fn for_word(self, word: &str) -> Self {
        match self {
            ResonanceError::DimensionMismatch {
                expected, found, ..
            } => ResonanceError::DimensionMismatch {
                word: Some(word.to_string()),
                expected,
                found,
            },
            ResonanceError::DegenerateVector { .. } => ResonanceError::DegenerateVector {
                word: Some(word.to_string()),
            },
            ResonanceError::NonFiniteValue { .. } => ResonanceError::NonFiniteValue {
                word: Some(word.to_string()),
            },
            other => other,
        }
    }

    /// Run-level errors abort every target in a comparison.
    pub fn is_run_level(&self) -> bool {
        matches!(
            self,
            ResonanceError::UnknownMetric(_)
                | ResonanceError::InvalidScale(_)
                | ResonanceError::NoTargets
                | ResonanceError::EmptyVocabulary { .. }
        )
    }
}

fn word_suffix(word: &Option<String>) -> String {
    match word {
        Some(w) => format!(" for word '{w}'"),
        None => String::new(),
    }
}
