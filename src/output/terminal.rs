// Colored terminal output for resonance runs.
//
// This module handles all terminal-specific formatting. main.rs builds the
// runs and hands them here for display.

use colored::Colorize;

use crate::embeddings::map::EmbeddingMap;
use crate::embeddings::vocabulary::CommonVocabulary;
use crate::engine::ResonanceRun;

/// Display one run as a ranked table.
pub fn display_run(run: &ResonanceRun) {
    println!(
        "\n{}",
        format!(
            "=== Resonance: {} (lambda {}) over {} common words ===",
            run.config.metric(),
            run.config.lambda(),
            run.vocabulary_size
        )
        .bold()
    );
    println!();

    println!(
        "  {:>4}  {:<32} {:>8}  {:<12}",
        "Rank".dimmed(),
        "Target".dimmed(),
        "Score".dimmed(),
        "Band".dimmed(),
    );
    println!("  {}", "-".repeat(62).dimmed());

    for (rank, &i) in run.ranking().iter().enumerate() {
        let target = &run.targets[i];
        match &target.outcome {
            Ok(score) => {
                let skipped = if target.skipped > 0 {
                    format!("  ({} words skipped)", target.skipped)
                        .dimmed()
                        .to_string()
                } else {
                    String::new()
                };
                println!(
                    "  {:>4}. {:<32} {:>8.2}  {:<12}{}",
                    rank + 1,
                    super::truncate_chars(&target.label, 29),
                    score,
                    colorize_band(*score),
                    skipped,
                );
            }
            Err(e) => {
                println!(
                    "  {:>4}  {:<32} {}",
                    "-",
                    super::truncate_chars(&target.label, 29),
                    format!("Error: {e}").red(),
                );
            }
        }
    }

    match &run.report {
        Some(Ok(path)) => println!(
            "\n  {}",
            format!("Detail report saved to: {}", path.display()).dimmed()
        ),
        Some(Err(e)) => println!("\n  {}", format!("Detail report failed: {e}").red()),
        None => {}
    }
}

/// Display several runs over the same vocabulary side by side.
pub fn display_sweep(runs: &[ResonanceRun]) {
    let Some(first) = runs.first() else {
        println!("No runs to display.");
        return;
    };

    println!(
        "\n{}",
        format!(
            "=== Resonance sweep over {} common words ===",
            first.vocabulary_size
        )
        .bold()
    );
    println!();

    print!("  {:<32}", "Target".dimmed());
    for run in runs {
        print!(" {:>15}", run.config.metric().as_str().dimmed());
    }
    println!();
    println!("  {}", "-".repeat(32 + 16 * runs.len()).dimmed());

    for (i, target) in first.targets.iter().enumerate() {
        print!("  {:<32}", super::truncate_chars(&target.label, 29));
        for run in runs {
            match run.targets.get(i).and_then(|t| t.score()) {
                Some(score) => print!(" {:>15.2}", score),
                None => print!(" {:>15}", "error".red()),
            }
        }
        println!();
    }

    for run in runs {
        for target in &run.targets {
            if let Some(e) = target.error() {
                println!(
                    "  {} {} [{}]: {}",
                    "!".red(),
                    target.label,
                    run.config.metric(),
                    e
                );
            }
        }
        if let Some(Err(e)) = &run.report {
            println!("  {} report [{}]: {}", "!".red(), run.config.metric(), e);
        }
    }

    let saved: Vec<String> = runs
        .iter()
        .filter_map(|r| r.report.as_ref()?.as_ref().ok())
        .map(|p| p.display().to_string())
        .collect();
    if !saved.is_empty() {
        println!("\n  {}", "Detail reports:".dimmed());
        for path in saved {
            println!("    {}", path.dimmed());
        }
    }
}

/// Display per-map word counts and the shared vocabulary size.
pub fn display_vocabulary(labels: &[&str], maps: &[&EmbeddingMap], vocab: &CommonVocabulary) {
    println!("\n{}", "=== Vocabulary ===".bold());
    println!();
    println!(
        "  {:<32} {:>10} {:>6}",
        "Corpus".dimmed(),
        "Words".dimmed(),
        "Dim".dimmed()
    );
    for (label, map) in labels.iter().zip(maps) {
        println!(
            "  {:<32} {:>10} {:>6}",
            super::truncate_chars(label, 29),
            map.len(),
            map.dim()
        );
    }
    println!();

    let common = vocab.len();
    let line = format!("  Common to all: {common} words");
    if common == 0 {
        println!("{}", line.red().bold());
    } else {
        println!("{}", line.bold());
    }

    let dims: Vec<usize> = maps.iter().map(|m| m.dim()).collect();
    if dims.windows(2).any(|w| w[0] != w[1]) {
        println!(
            "  {}",
            "Warning: embedding dimensions differ; mismatched targets will fail to score."
                .yellow()
        );
    }
}

/// Rough reading of a 0-100 score.
fn colorize_band(score: f64) -> colored::ColoredString {
    match score {
        s if s >= 75.0 => "strong".green().bold(),
        s if s >= 50.0 => "moderate".green(),
        s if s >= 25.0 => "weak".yellow(),
        _ => "faint".dimmed(),
    }
}
