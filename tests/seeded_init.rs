// Seeded initialization. Kept in its own test binary: the backend RNG is process-wide, and
// training elsewhere draws from it for dropout.

use burn::backend::{Autodiff, NdArray};
use pretty_assertions::{assert_eq, assert_ne};
use text_rnn::{
    models::text_rnn::{Config, Embeddings},
    pipelines::text_classification::{FitConfig, TextClassifier},
};

type TestBackend = Autodiff<NdArray>;

fn embeddings() -> Embeddings {
    Embeddings::from_rows(vec![
        vec![0.0, 0.0, 0.0],
        vec![1.0, 0.5, 0.0],
        vec![0.0, 1.0, 0.5],
        vec![0.5, 0.0, 1.0],
    ])
    .unwrap()
}

fn config(seed: u64) -> Config {
    Config::new(5).with_rnn_hidden_units(6).with_seed(seed)
}

fn classifier(config: Config) -> TextClassifier<TestBackend> {
    TextClassifier::new(config, &embeddings(), Default::default()).unwrap()
}

fn inputs() -> Vec<Vec<usize>> {
    vec![vec![1, 2, 3], vec![3, 3], vec![2, 1, 1, 3, 2, 1], vec![0]]
}

#[test]
fn test_same_seed_gives_same_model() {
    // Both are built before either one runs
    let first = classifier(config(7));
    let second = classifier(config(7));

    assert_eq!(
        first.predict_prob(&inputs(), 2).unwrap(),
        second.predict_prob(&inputs(), 2).unwrap()
    );
}

#[test]
fn test_different_seeds_give_different_models() {
    let first = classifier(config(7));
    let second = classifier(config(8));

    assert_ne!(
        first.predict_prob(&inputs(), 2).unwrap(),
        second.predict_prob(&inputs(), 2).unwrap()
    );
}

#[test]
fn test_zero_epochs_matches_fresh_model() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model");
    let config = || config(11).with_model_path(model_path.to_string_lossy().into_owned());

    let mut trained = classifier(config());
    let fresh = classifier(config());

    let inputs = inputs();
    let labels = vec![0, 1, 0, 1];

    let before = trained.predict_prob(&inputs, 4).unwrap();

    let history = trained
        .fit(
            &inputs,
            &labels,
            Some((&inputs[..], &labels[..])),
            &FitConfig::new().with_num_epochs(0).with_save_model(true),
        )
        .unwrap();

    let after = trained.predict_prob(&inputs, 4).unwrap();

    assert!(history.is_empty());
    assert_eq!(before, after);
    assert_eq!(after, fresh.predict_prob(&inputs, 4).unwrap());
    assert!(!model_path.exists());
}
