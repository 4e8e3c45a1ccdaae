use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use resonance::embeddings::loader::load_embeddings;
use resonance::embeddings::map::EmbeddingMap;
use resonance::embeddings::vocabulary;
use resonance::engine::{LabeledMap, ResonanceEngine};
use resonance::scoring::metric::DistanceMetric;
use resonance::scoring::settings::DegeneratePolicy;

mod config;

/// Resonance: how closely do target corpora echo a baseline corpus?
///
/// Compares word embeddings trained on each corpus over their shared
/// vocabulary and squashes the summed per-word distances into a 0-100 score.
#[derive(Parser)]
#[command(name = "resonance", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every target against the baseline under one metric
    Score {
        #[command(flatten)]
        corpora: CorpusArgs,

        /// Distance metric: euclidean, manhattan, cosine_sim_neg, cosine_sim_pos
        #[arg(long)]
        metric: Option<String>,

        /// Scale constant (default: the metric's recommended value)
        #[arg(long)]
        lambda: Option<f64>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Score every target under all four metrics at their recommended scales
    Sweep {
        #[command(flatten)]
        corpora: CorpusArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show vocabulary sizes and the words shared by every corpus
    Vocab {
        #[command(flatten)]
        corpora: CorpusArgs,
    },
}

#[derive(Args)]
struct CorpusArgs {
    /// Baseline embeddings (word2vec text or .json)
    #[arg(long)]
    baseline: PathBuf,

    /// Target embeddings; repeat for each target corpus
    #[arg(long = "target", required = true)]
    targets: Vec<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    /// Write the per-word distance report
    #[arg(long)]
    persist_detail: bool,

    /// Directory for detail reports (default: ./output)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Compute per-word distances on all cores
    #[arg(long)]
    parallel: bool,

    /// Zero-norm vectors under cosine metrics: fail the target, or skip the word
    #[arg(long)]
    on_degenerate: Option<DegeneratePolicy>,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resonance=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            corpora,
            metric,
            lambda,
            run,
        } => {
            // Validate configuration before touching any embedding file
            let mut config = config::Config::load()?;
            apply_run_args(&mut config, &run);
            let metric = metric
                .as_deref()
                .map(str::parse::<DistanceMetric>)
                .transpose()?;
            let resonance_config = config.resonance_config(metric, lambda)?;

            let loaded = load_corpora(&corpora)?;
            let engine = ResonanceEngine::new(&loaded.baseline, loaded.labeled())?;

            let result = engine.run(&resonance_config);

            if run.json {
                println!("{}", serde_json::to_string_pretty(&result.summary())?);
            } else {
                resonance::output::terminal::display_run(&result);
            }
        }

        Commands::Sweep { corpora, run } => {
            let mut config = config::Config::load()?;
            apply_run_args(&mut config, &run);
            let configs = DistanceMetric::ALL
                .into_iter()
                .map(|metric| config.resonance_config(Some(metric), None))
                .collect::<Result<Vec<_>>>()?;

            let loaded = load_corpora(&corpora)?;
            let engine = ResonanceEngine::new(&loaded.baseline, loaded.labeled())?;

            info!(metrics = configs.len(), "Running sweep over shared vocabulary");
            let runs = engine.sweep(&configs);

            if run.json {
                let summaries: Vec<_> = runs.iter().map(|r| r.summary()).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                resonance::output::terminal::display_sweep(&runs);
            }
        }

        Commands::Vocab { corpora } => {
            let loaded = load_corpora(&corpora)?;

            let mut labels: Vec<&str> = vec!["baseline"];
            labels.extend(loaded.labels.iter().map(String::as_str));
            let mut maps: Vec<&EmbeddingMap> = vec![&loaded.baseline];
            maps.extend(loaded.targets.iter());

            let vocab = vocabulary::intersect(&maps);
            resonance::output::terminal::display_vocabulary(&labels, &maps, &vocab);

            if vocab.is_empty() {
                println!(
                    "{}",
                    "No shared words: these corpora cannot be scored together.".dimmed()
                );
            }
        }
    }

    Ok(())
}

/// Command-line flags override environment configuration.
fn apply_run_args(config: &mut config::Config, run: &RunArgs) {
    if run.persist_detail {
        config.persist_detail = true;
    }
    if run.parallel {
        config.parallel = true;
    }
    if let Some(dir) = &run.report_dir {
        config.report_dir = dir.clone();
    }
    if let Some(policy) = run.on_degenerate {
        config.on_degenerate = policy;
    }
}

/// Embedding maps loaded from disk, with target labels.
struct LoadedCorpora {
    baseline: EmbeddingMap,
    targets: Vec<EmbeddingMap>,
    labels: Vec<String>,
}

impl LoadedCorpora {
    fn labeled(&self) -> Vec<LabeledMap<'_>> {
        self.labels
            .iter()
            .zip(&self.targets)
            .map(|(label, map)| LabeledMap::new(label, map))
            .collect()
    }
}

/// Load the baseline and every target, showing progress.
fn load_corpora(args: &CorpusArgs) -> Result<LoadedCorpora> {
    let pb = ProgressBar::new(args.targets.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Loading [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    pb.set_message(file_label(&args.baseline));
    let baseline = load_embeddings(&args.baseline)?;
    pb.inc(1);

    let mut targets = Vec::with_capacity(args.targets.len());
    for path in &args.targets {
        pb.set_message(file_label(path));
        targets.push(load_embeddings(path)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let labels = target_labels(&args.targets);

    info!(
        baseline_words = baseline.len(),
        targets = targets.len(),
        dim = baseline.dim(),
        "Embeddings loaded"
    );
    if baseline.is_empty() {
        eprintln!("{}", "Warning: baseline embeddings are empty".yellow());
    }

    Ok(LoadedCorpora {
        baseline,
        targets,
        labels,
    })
}

/// Label targets by file stem, falling back to the full path when two
/// targets share a stem.
fn target_labels(paths: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = paths.iter().map(|p| file_label(p)).collect();
    stems
        .iter()
        .zip(paths)
        .map(|(stem, path)| {
            if stems.iter().filter(|s| *s == stem).count() > 1 {
                path.display().to_string()
            } else {
                stem.clone()
            }
        })
        .collect()
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
