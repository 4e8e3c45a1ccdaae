// Resonance: score how closely target corpora echo a baseline corpus
//
// This is the library root. Each module corresponds to one stage of the
// comparison: load embeddings, intersect vocabularies, measure per-word
// distances, squash them into a score, and report.

pub mod embeddings;
pub mod engine;
pub mod error;
pub mod output;
pub mod scoring;
