use std::path::{Path, PathBuf};

use slotwise::config::TrainingConfig;
use slotwise::{
    DatasetStore, FeatureVector, FeedbackRecorder, ModelStore, Observation, RetrainPolicy,
    SlotwiseError, Trainer,
};
use uuid::Uuid;

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("slotwise_feedback_it_{}", Uuid::new_v4()))
}

fn recorder(root: &Path, policy: RetrainPolicy) -> FeedbackRecorder {
    FeedbackRecorder::new(
        DatasetStore::new(root.join("data/meeting_preferences.csv")),
        ModelStore::new(root.join("models/meeting_predictor.json")),
        Trainer::new(TrainingConfig {
            n_trees: 10,
            ..TrainingConfig::default()
        }),
        policy,
    )
}

fn observation(i: usize) -> Observation {
    let kind = if i % 2 == 0 { "standup" } else { "review" };
    Observation::new(
        format!("user-{}", i % 3),
        FeatureVector::new((i % 7) as u8, 8 + (i % 9) as u8, 30, 2 + i as u32 % 5, kind),
        (i % 5) as f64 + 1.0,
    )
}

#[test]
fn tenth_row_triggers_exactly_one_retrain() {
    let root = temp_root();
    let rec = recorder(&root, RetrainPolicy::EveryNRows(10));
    let models = ModelStore::new(root.join("models/meeting_predictor.json"));

    for i in 0..9 {
        let outcome = rec.record(&observation(i)).unwrap();
        assert!(outcome.retrain.is_none(), "row {} retrained", i + 1);
    }
    assert!(!models.exists());

    let outcome = rec.record(&observation(9)).unwrap();
    assert_eq!(outcome.row_count, 10);
    let report = outcome.retrain.expect("10th row retrains");
    assert_eq!(report.n_train + report.n_test, 10);
    assert!(models.exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn retrain_fires_only_on_multiples() {
    let root = temp_root();
    let rec = recorder(&root, RetrainPolicy::EveryNRows(10));
    let models = ModelStore::new(root.join("models/meeting_predictor.json"));

    let mut retrained_at = Vec::new();
    for i in 0..25 {
        let outcome = rec.record(&observation(i)).unwrap();
        if outcome.retrain.is_some() {
            retrained_at.push(outcome.row_count);
        }
    }
    assert_eq!(retrained_at, vec![10, 20]);
    assert_eq!(models.load().unwrap().metadata.n_samples, 16);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn record_preference_reports_success() {
    let root = temp_root();
    let rec = recorder(&root, RetrainPolicy::default());

    assert!(rec.record_preference(&observation(0)));

    let rows = DatasetStore::new(root.join("data/meeting_preferences.csv"))
        .load()
        .unwrap();
    assert_eq!(rows, vec![observation(0)]);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn failed_retrain_keeps_the_appended_row() {
    let root = temp_root();
    let rec = recorder(&root, RetrainPolicy::EveryNRows(1));

    // One row cannot be split, so the retrain fails after the append.
    assert!(!rec.record_preference(&observation(0)));
    let store = DatasetStore::new(root.join("data/meeting_preferences.csv"));
    assert_eq!(store.row_count().unwrap(), 1);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn unwritable_dataset_is_a_write_error() {
    let root = temp_root();
    std::fs::create_dir_all(&root).unwrap();
    // `data` is a regular file, so the dataset directory cannot be created.
    std::fs::write(root.join("data"), "not a directory").unwrap();
    let rec = recorder(&root, RetrainPolicy::EveryNRows(1));

    let err = rec.record(&observation(0)).unwrap_err();
    assert!(matches!(err, SlotwiseError::Write { .. }), "got: {err}");
    assert!(!rec.record_preference(&observation(1)));
    assert!(!ModelStore::new(root.join("models/meeting_predictor.json")).exists());

    let _ = std::fs::remove_dir_all(&root);
}
