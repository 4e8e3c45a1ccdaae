// Embedding file loading.
//
// Trainers usually save vectors in word2vec text format:
//
//   <count> <dim>            (optional header)
//   <word> <f1> <f2> ... <fdim>
//
// A `.json` file is read as an object mapping each word to its vector.
// Anything else is treated as word2vec text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::map::EmbeddingMap;

/// Load an embedding map from `path`, picking the format by extension.
pub fn load_embeddings(path: &Path) -> Result<EmbeddingMap> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read embeddings from {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let map = if is_json {
        parse_json(&contents)
    } else {
        parse_word2vec(&contents)
    }
    .with_context(|| format!("Invalid embedding file {}", path.display()))?;

    debug!(
        path = %path.display(),
        words = map.len(),
        dim = map.dim(),
        "Loaded embeddings"
    );

    Ok(map)
}

/// Parse word2vec text format.
pub fn parse_word2vec(contents: &str) -> Result<EmbeddingMap> {
    let lines: Vec<(usize, &str)> = contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let header = detect_header(&lines);
    let body = if header.is_some() { &lines[1..] } else { &lines[..] };

    let mut entries: Vec<(String, Vec<f64>)> = Vec::new();
    for &(line_no, line) in body {
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };

        let vector = fields
            .map(|f| {
                f.parse::<f64>()
                    .with_context(|| format!("line {line_no}: '{f}' is not a number"))
            })
            .collect::<Result<Vec<f64>>>()?;

        if vector.is_empty() {
            anyhow::bail!("line {line_no}: word '{word}' has no vector components");
        }
        if let Some((_, dim)) = header {
            if vector.len() != dim {
                anyhow::bail!(
                    "line {line_no}: word '{word}' has {} components, header declares {dim}",
                    vector.len()
                );
            }
        }

        entries.push((word.to_string(), vector));
    }

    if let Some((count, _)) = header {
        if count != entries.len() {
            warn!(
                declared = count,
                found = entries.len(),
                "word2vec header count does not match number of entries"
            );
        }
    }

    Ok(EmbeddingMap::from_entries(entries)?)
}

/// Decide whether the first line is a `<count> <dim>` header.
///
/// Two integers alone are also a valid entry (word "1", vector `[2]`), so the
/// header is only taken when the next line has `dim + 1` fields, or when it
/// has a field count no headerless reading of the file could accept. A lone
/// `<count> <dim>` line is a header only for an empty file (`count == 0`).
fn detect_header(lines: &[(usize, &str)]) -> Option<(usize, usize)> {
    let (_, first) = lines.first()?;
    let fields: Vec<&str> = first.split_whitespace().collect();
    let [count, dim] = fields.as_slice() else {
        return None;
    };
    let (count, dim) = (count.parse::<usize>().ok()?, dim.parse::<usize>().ok()?);

    let is_header = match lines.get(1) {
        Some((_, next)) => {
            let next_fields = next.split_whitespace().count();
            next_fields == dim + 1 || next_fields != fields.len()
        }
        None => count == 0,
    };
    is_header.then_some((count, dim))
}

/// Parse a JSON object of `word -> [f64, ...]`.
pub fn parse_json(contents: &str) -> Result<EmbeddingMap> {
    let raw: HashMap<String, Vec<f64>> =
        serde_json::from_str(contents).context("Expected a JSON object of word -> vector")?;
    Ok(EmbeddingMap::from_entries(raw)?)
}
