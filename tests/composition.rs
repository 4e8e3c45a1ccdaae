// Composition tests — the full comparison pipeline end to end.
//
// These tests exercise the data flow between modules:
//   EmbeddingMap -> CommonVocabulary -> distance -> aggregate -> report
// without touching the network. Report tests write into the system temp
// directory.

use std::fs;
use std::path::PathBuf;

use resonance::embeddings::map::EmbeddingMap;
use resonance::engine::{compare, recommended_sweep, LabeledMap, ResonanceEngine};
use resonance::error::ResonanceError;
use resonance::scoring::metric::DistanceMetric;
use resonance::scoring::settings::{DegeneratePolicy, ResonanceConfig};

fn map(entries: &[(&str, Vec<f64>)]) -> EmbeddingMap {
    EmbeddingMap::from_entries(entries.iter().cloned()).unwrap()
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("resonance_test_{}_{}", std::process::id(), name))
}

// ============================================================
// Worked scenarios
// ============================================================

#[test]
fn identical_shared_words_score_full_resonance() {
    let baseline = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
    let target = map(&[
        ("a", vec![1.0, 0.0]),
        ("b", vec![0.0, 1.0]),
        ("c", vec![1.0, 1.0]),
    ]);

    let engine =
        ResonanceEngine::new(&baseline, vec![LabeledMap::new("target", &target)]).unwrap();
    assert_eq!(engine.vocabulary().words(), &["a", "b"]);

    let config = ResonanceConfig::new(DistanceMetric::Euclidean, 10_000.0).unwrap();
    let run = engine.run(&config);
    assert_eq!(run.targets[0].distances, vec![Some(0.0), Some(0.0)]);
    assert_eq!(run.scores(), vec![Some(100.0)]);
}

#[test]
fn orthogonal_single_word_under_every_metric() {
    let baseline = map(&[("a", vec![1.0, 0.0])]);
    let target = map(&[("a", vec![0.0, 1.0])]);
    let engine =
        ResonanceEngine::new(&baseline, vec![LabeledMap::new("target", &target)]).unwrap();

    let run = engine.run(&ResonanceConfig::recommended(DistanceMetric::Euclidean));
    let d = run.targets[0].distances[0].unwrap();
    assert!((d - 2.0_f64.sqrt()).abs() < 1e-12, "euclidean {d}");

    let run = engine.run(&ResonanceConfig::recommended(DistanceMetric::Manhattan));
    let d = run.targets[0].distances[0].unwrap();
    assert!((d - 2.0).abs() < 1e-12, "manhattan {d}");

    let run = engine.run(&ResonanceConfig::recommended(DistanceMetric::CosineSimNeg));
    assert_eq!(run.targets[0].distances[0], Some(0.0));
    let score = run.targets[0].score().unwrap();
    assert!((score - 50.0).abs() < 1e-12, "cosine_sim_neg {score}");

    let run = engine.run(&ResonanceConfig::recommended(DistanceMetric::CosineSimPos));
    assert_eq!(run.targets[0].distances[0], Some(0.0));
    assert_eq!(run.targets[0].score(), Some(0.0));
}

#[test]
fn disjoint_vocabularies_are_an_error_not_a_score() {
    let baseline = map(&[("a", vec![1.0]), ("b", vec![2.0])]);
    let target = map(&[("c", vec![1.0])]);

    let err = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)])
        .err()
        .unwrap();
    match err {
        ResonanceError::EmptyVocabulary { word_counts } => assert_eq!(word_counts, vec![2, 1]),
        other => panic!("expected EmptyVocabulary, got {other}"),
    }

    let config = ResonanceConfig::default();
    assert!(matches!(
        compare(&baseline, &[&target], &config),
        Err(ResonanceError::EmptyVocabulary { .. })
    ));
}

#[test]
fn zero_vector_under_cosine_fails_the_target() {
    let baseline = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 0.0])]);
    let target = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.5, 0.5])]);

    for metric in [DistanceMetric::CosineSimNeg, DistanceMetric::CosineSimPos] {
        let results = compare(&baseline, &[&target], &ResonanceConfig::recommended(metric)).unwrap();
        match &results[0] {
            Err(ResonanceError::DegenerateVector { word }) => {
                assert_eq!(word.as_deref(), Some("b"))
            }
            other => panic!("{metric}: expected DegenerateVector, got {other:?}"),
        }
    }
}

// ============================================================
// Multiple targets
// ============================================================

#[test]
fn vocabulary_is_shared_across_all_targets() {
    let baseline = map(&[
        ("a", vec![1.0, 0.0]),
        ("b", vec![0.0, 1.0]),
        ("c", vec![1.0, 1.0]),
    ]);
    // t1 lacks "c", so "c" must not count for t2 either
    let t1 = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
    let t2 = map(&[
        ("a", vec![1.0, 0.0]),
        ("b", vec![0.0, 1.0]),
        ("c", vec![-100.0, 50.0]),
    ]);

    let config = ResonanceConfig::new(DistanceMetric::Euclidean, 10.0).unwrap();
    let results = compare(&baseline, &[&t1, &t2], &config).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(*results[0].as_ref().unwrap(), 100.0);
    assert_eq!(*results[1].as_ref().unwrap(), 100.0);
}

#[test]
fn closer_target_ranks_higher_under_every_metric() {
    let baseline = map(&[
        ("river", vec![1.0, 0.2, 0.0]),
        ("bank", vec![0.1, 1.0, 0.3]),
        ("water", vec![0.9, 0.1, 0.4]),
    ]);
    let near = map(&[
        ("river", vec![0.95, 0.25, 0.05]),
        ("bank", vec![0.15, 0.9, 0.3]),
        ("water", vec![0.85, 0.15, 0.35]),
    ]);
    let far = map(&[
        ("river", vec![-1.0, 0.5, 0.7]),
        ("bank", vec![0.8, -0.6, 0.1]),
        ("water", vec![-0.2, 0.9, -0.8]),
    ]);

    let engine = ResonanceEngine::new(
        &baseline,
        vec![LabeledMap::new("far", &far), LabeledMap::new("near", &near)],
    )
    .unwrap();

    for config in recommended_sweep() {
        let config = ResonanceConfig::new(config.metric(), 1.0).unwrap();
        let run = engine.run(&config);
        assert_eq!(
            run.ranking(),
            vec![1, 0],
            "{}: near should outrank far, scores {:?}",
            config.metric(),
            run.scores()
        );
    }
}

#[test]
fn one_failing_target_does_not_sink_its_siblings() {
    let baseline = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
    let good = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
    let wrong_dim = map(&[("a", vec![1.0, 0.0, 0.0]), ("b", vec![0.0, 1.0, 0.0])]);
    let zero = map(&[("a", vec![0.0, 0.0]), ("b", vec![0.0, 1.0])]);

    let engine = ResonanceEngine::new(
        &baseline,
        vec![
            LabeledMap::new("good", &good),
            LabeledMap::new("wrong_dim", &wrong_dim),
            LabeledMap::new("zero", &zero),
        ],
    )
    .unwrap();

    let run = engine.run(&ResonanceConfig::recommended(DistanceMetric::CosineSimPos));
    assert!(run.targets[0].score().is_some());
    assert!(matches!(
        run.targets[1].error(),
        Some(ResonanceError::DimensionMismatch {
            expected: 2,
            found: 3,
            ..
        })
    ));
    assert!(matches!(
        run.targets[2].error(),
        Some(ResonanceError::DegenerateVector { .. })
    ));
    assert_eq!(run.ranking()[0], 0);
}

#[test]
fn skip_policy_drops_degenerate_words_only() {
    let baseline = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 0.0])]);
    let target = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.3, 0.4])]);

    let engine = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)]).unwrap();
    let config = ResonanceConfig::new(DistanceMetric::CosineSimPos, 1.0)
        .unwrap()
        .with_degenerate_policy(DegeneratePolicy::SkipWord);
    let run = engine.run(&config);

    let target = &run.targets[0];
    assert_eq!(target.skipped, 1);
    assert_eq!(target.distances, vec![Some(1.0), None]);
    let expected = 100.0 * 1.0_f64.tanh();
    let score = target.score().unwrap();
    assert!((score - expected).abs() < 1e-9, "Expected {expected}, got {score}");
}

#[test]
fn skip_policy_scores_every_target_over_the_same_words() {
    // Only t1 has a zero vector for "b", yet "b" must drop out of t2's sum too
    let baseline = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
    let t1 = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 0.0])]);
    let t2 = baseline.clone();

    let engine = ResonanceEngine::new(
        &baseline,
        vec![LabeledMap::new("t1", &t1), LabeledMap::new("t2", &t2)],
    )
    .unwrap();
    let config = ResonanceConfig::new(DistanceMetric::CosineSimPos, 1.0)
        .unwrap()
        .with_degenerate_policy(DegeneratePolicy::SkipWord)
        .with_parallel(true);
    let run = engine.run(&config);

    for target in &run.targets {
        assert_eq!(target.skipped, 1, "{}", target.label);
        assert_eq!(target.distances, vec![Some(1.0), None], "{}", target.label);
    }
    assert_eq!(run.scores()[0], run.scores()[1]);

    let summary = run.summary();
    assert_eq!(summary.targets[0].words_scored, 1);
    assert_eq!(summary.targets[1].words_scored, 1);
}

#[test]
fn skip_policy_with_nothing_left_fails_instead_of_scoring() {
    let baseline = map(&[("a", vec![0.0, 0.0]), ("b", vec![0.0, 0.0])]);
    let target = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);

    let engine = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)]).unwrap();
    for metric in [DistanceMetric::CosineSimNeg, DistanceMetric::CosineSimPos] {
        let config = ResonanceConfig::recommended(metric)
            .with_degenerate_policy(DegeneratePolicy::SkipWord);
        let run = engine.run(&config);

        let target = &run.targets[0];
        assert!(target.score().is_none(), "{metric}: got {:?}", target.score());
        assert!(matches!(
            target.error(),
            Some(ResonanceError::NothingToScore { skipped: 2 })
        ));
        assert_eq!(target.skipped, 2);
    }
}

#[test]
fn non_finite_embedding_never_reaches_a_score() {
    let err = EmbeddingMap::from_entries([("a", vec![f64::NAN, 1.0])]).unwrap_err();
    assert!(matches!(
        err,
        ResonanceError::NonFiniteValue { word: Some(ref w) } if w == "a"
    ));

    // Finite components whose distance overflows are caught at aggregation
    let baseline = map(&[("a", vec![f64::MAX, -f64::MAX])]);
    let target = map(&[("a", vec![-f64::MAX, f64::MAX])]);
    let results = compare(
        &baseline,
        &[&target],
        &ResonanceConfig::recommended(DistanceMetric::Euclidean),
    )
    .unwrap();
    assert!(matches!(
        results[0],
        Err(ResonanceError::NonFiniteValue { .. })
    ));
}

#[test]
fn parallel_and_serial_runs_are_bit_identical() {
    let entries: Vec<(String, Vec<f64>)> = (0..500)
        .map(|i| {
            let x = i as f64;
            (format!("w{i}"), vec![x.sin(), x.cos(), (x * 0.1).sin()])
        })
        .collect();
    let shifted: Vec<(String, Vec<f64>)> = entries
        .iter()
        .map(|(w, v)| (w.clone(), v.iter().map(|c| c * 0.9 + 0.05).collect()))
        .collect();
    let baseline = EmbeddingMap::from_entries(entries).unwrap();
    let target = EmbeddingMap::from_entries(shifted).unwrap();
    let engine = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)]).unwrap();

    for metric in DistanceMetric::ALL {
        let serial = engine.run(&ResonanceConfig::new(metric, 100.0).unwrap());
        let parallel = engine.run(&ResonanceConfig::new(metric, 100.0).unwrap().with_parallel(true));
        assert_eq!(
            serial.scores()[0].map(f64::to_bits),
            parallel.scores()[0].map(f64::to_bits),
            "{metric}"
        );
        assert_eq!(serial.targets[0].distances, parallel.targets[0].distances);
    }
}

// ============================================================
// Sweep and reports
// ============================================================

#[test]
fn sweep_reuses_one_vocabulary() {
    let baseline = map(&[("z", vec![1.0, 2.0]), ("a", vec![2.0, 1.0]), ("m", vec![1.0, 1.0])]);
    let target = map(&[("m", vec![1.0, 0.5]), ("z", vec![0.5, 2.0]), ("a", vec![2.0, 2.0])]);
    let engine = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)]).unwrap();

    let runs = engine.sweep(&recommended_sweep());
    assert_eq!(runs.len(), 4);
    for run in &runs {
        assert_eq!(run.vocabulary_size, 3);
        assert_eq!(run.targets[0].distances.len(), 3);
        assert!(run.targets[0].score().is_some());
    }
}

#[test]
fn detail_report_written_with_comparison_column() {
    let dir = temp_dir("report");
    let baseline = map(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
    let t1 = map(&[("a", vec![1.0, 0.0]), ("b", vec![3.0, 5.0])]);
    let t2 = map(&[("a", vec![0.0, 1.0]), ("b", vec![0.0, 1.0])]);

    let engine = ResonanceEngine::new(
        &baseline,
        vec![LabeledMap::new("t1", &t1), LabeledMap::new("t2", &t2)],
    )
    .unwrap();
    let config = ResonanceConfig::new(DistanceMetric::Manhattan, 100_000.0)
        .unwrap()
        .with_persist_detail(true)
        .with_report_dir(&dir);
    let run = engine.run(&config);

    let path = match &run.report {
        Some(Ok(path)) => path.clone(),
        other => panic!("expected a written report, got {other:?}"),
    };
    let csv = fs::read_to_string(&path).unwrap();
    assert_eq!(
        csv,
        "word,t1_distance,t2_distance,t1>t2\na,0,2,0\nb,7,0,1\n",
        "unexpected report body"
    );

    let summary = run.summary();
    assert_eq!(summary.report_path.as_deref(), Some(path.display().to_string().as_str()));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unwritable_report_keeps_scores() {
    // A regular file where the report directory should be
    let blocker = temp_dir("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let baseline = map(&[("a", vec![1.0, 0.0])]);
    let target = map(&[("a", vec![1.0, 0.0])]);
    let engine = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)]).unwrap();
    let config = ResonanceConfig::recommended(DistanceMetric::Euclidean)
        .with_persist_detail(true)
        .with_report_dir(blocker.join("nested"));
    let run = engine.run(&config);

    assert_eq!(run.scores(), vec![Some(100.0)]);
    assert!(matches!(
        run.report,
        Some(Err(ResonanceError::PersistenceFailure { .. }))
    ));
    assert!(run.summary().report_error.is_some());
    let _ = fs::remove_file(blocker);
}

#[test]
fn no_report_unless_requested() {
    let baseline = map(&[("a", vec![1.0])]);
    let target = map(&[("a", vec![2.0])]);
    let engine = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)]).unwrap();
    let run = engine.run(&ResonanceConfig::default());
    assert!(run.report.is_none());
}

#[test]
fn summary_serializes_legacy_metric_names() {
    let baseline = map(&[("a", vec![1.0, 0.0])]);
    let target = map(&[("a", vec![0.0, 1.0])]);
    let engine = ResonanceEngine::new(&baseline, vec![LabeledMap::new("t", &target)]).unwrap();
    let run = engine.run(&ResonanceConfig::recommended(DistanceMetric::CosineSimNeg));
    let json = serde_json::to_value(run.summary()).unwrap();
    assert_eq!(json["metric"], "cosine_sim_neg");
    assert_eq!(json["vocabulary_size"], 1);
    assert_eq!(json["targets"][0]["label"], "t");
    assert_eq!(json["targets"][0]["score"], 50.0);
}
