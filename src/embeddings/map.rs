// Word → vector mapping produced by an external embedding trainer.

use std::collections::HashMap;

use crate::error::{ResonanceError, ResonanceResult};

/// Read-only mapping from word to a fixed-length embedding vector.
///
/// Every vector in one map has the same length; this is checked when the map
/// is built and never re-checked afterwards, since the map cannot be mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingMap {
    vectors: HashMap<String, Vec<f64>>,
    dim: usize,
}

impl EmbeddingMap {
    /// Build a map from (word, vector) pairs.
    ///
    /// Fails with `DimensionMismatch` naming the first word whose vector
    /// length differs from the first vector seen, and with `NonFiniteValue`
    /// for a vector holding NaN or an infinity. A repeated word keeps the
    /// last vector.
    pub fn from_entries<I, S>(entries: I) -> ResonanceResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut vectors = HashMap::new();
        let mut dim: Option<usize> = None;

        for (word, vector) in entries {
            let word = word.into();
            match dim {
                None => dim = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(ResonanceError::DimensionMismatch {
                        word: Some(word),
                        expected,
                        found: vector.len(),
                    });
                }
                Some(_) => {}
            }
            if !vector.iter().all(|x| x.is_finite()) {
                return Err(ResonanceError::NonFiniteValue { word: Some(word) });
            }
            vectors.insert(word, vector);
        }

        Ok(Self {
            vectors,
            dim: dim.unwrap_or(0),
        })
    }

    /// Embedding dimensionality (0 for an empty map).
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&[f64]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    /// Iterate over words in unspecified order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(String::as_str)
    }
}
