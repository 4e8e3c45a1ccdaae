// Common vocabulary — the words every embedding map in a run agrees on.
//
// The intersection is materialized once, sorted, and shared by every metric
// evaluated over the same inputs. Sorting makes report rows line up with the
// same words on every run regardless of hash-map iteration order.

use std::collections::HashSet;

use serde::Serialize;

use super::map::EmbeddingMap;

/// Sorted list of words present in every map of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommonVocabulary {
    words: Vec<String>,
    /// Number of words in each input map, in input order.
    map_sizes: Vec<usize>,
}

impl CommonVocabulary {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word count of every map the vocabulary was derived from.
    pub fn map_sizes(&self) -> &[usize] {
        &self.map_sizes
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// Intersect the key sets of all `maps`.
///
/// An empty result is valid here; the engine decides whether that is fatal.
/// With no maps at all the vocabulary is empty.
pub fn intersect(maps: &[&EmbeddingMap]) -> CommonVocabulary {
    let map_sizes: Vec<usize> = maps.iter().map(|m| m.len()).collect();

    // Probe from the smallest map to keep the candidate set small
    let Some(smallest) = maps.iter().min_by_key(|m| m.len()) else {
        return CommonVocabulary::default();
    };

    let mut common: HashSet<&str> = smallest.words().collect();
    for map in maps {
        common.retain(|word| map.contains(word));
        if common.is_empty() {
            break;
        }
    }

    let mut words: Vec<String> = common.into_iter().map(str::to_string).collect();
    words.sort_unstable();

    CommonVocabulary { words, map_sizes }
}
