// Per-word detail report — one CSV row per common word.
//
// Columns: word, t1_distance, ..., tN_distance and, with two or more
// targets, `t1>t2` (1 when target 1's distance is >= target 2's, else 0).
// A skipped word or a failed target leaves its cells empty.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use crate::engine::TargetScore;
use crate::error::{ResonanceError, ResonanceResult};
use crate::scoring::metric::DistanceMetric;

/// Write the detail report into `dir` under a timestamped name.
///
/// Creates `dir` if needed. An existing report is never overwritten: when the
/// timestamped name is taken, `-1`, `-2`, ... is appended. Returns the path
/// written.
pub fn write_report(
    dir: &Path,
    metric: DistanceMetric,
    words: &[String],
    targets: &[TargetScore],
) -> ResonanceResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| ResonanceError::PersistenceFailure {
        path: dir.to_path_buf(),
        source,
    })?;

    let (path, mut file) = create_report_file(dir, &report_file_stem(metric))?;
    file.write_all(render_report(words, targets).as_bytes())
        .map_err(|source| ResonanceError::PersistenceFailure {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), rows = words.len(), "Detail report written");
    Ok(path)
}

/// `resonance-<metric>-<YYYYmmdd-HHMMSS.mmm>.csv`
pub fn report_file_name(metric: DistanceMetric) -> String {
    format!("{}.csv", report_file_stem(metric))
}

fn report_file_stem(metric: DistanceMetric) -> String {
    format!(
        "resonance-{}-{}",
        metric.as_str(),
        Local::now().format("%Y%m%d-%H%M%S%.3f")
    )
}

/// Create `<stem>.csv`, or the first free `<stem>-N.csv`, exclusively.
fn create_report_file(dir: &Path, stem: &str) -> ResonanceResult<(PathBuf, File)> {
    let mut attempt: u32 = 0;
    loop {
        let name = match attempt {
            0 => format!("{stem}.csv"),
            n => format!("{stem}-{n}.csv"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Report name taken, trying next suffix");
                attempt += 1;
            }
            Err(source) => return Err(ResonanceError::PersistenceFailure { path, source }),
        }
    }
}

/// Render the report body.
pub fn render_report(words: &[String], targets: &[TargetScore]) -> String {
    let mut out = String::from("word");
    for i in 1..=targets.len() {
        let _ = write!(out, ",t{i}_distance");
    }
    let compare_first_two = targets.len() >= 2;
    if compare_first_two {
        out.push_str(",t1>t2");
    }
    out.push('\n');

    for (row, word) in words.iter().enumerate() {
        out.push_str(&escape_field(word));

        let cells: Vec<Option<f64>> = targets
            .iter()
            .map(|t| t.distances.get(row).copied().flatten())
            .collect();

        for cell in &cells {
            out.push(',');
            if let Some(d) = cell {
                let _ = write!(out, "{d}");
            }
        }

        if compare_first_two {
            out.push(',');
            if let (Some(t1), Some(t2)) = (cells[0], cells[1]) {
                out.push(if t1 >= t2 { '1' } else { '0' });
            }
        }
        out.push('\n');
    }

    out
}

/// Quote a field containing a comma, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
