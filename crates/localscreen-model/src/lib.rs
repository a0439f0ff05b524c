//! localscreen-model
//!
//! Oracle backends: the trained hierarchical classifier on candle, and a
//! deterministic lexicon fake for tests.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use localscreen_core::config::{Backend, Settings};
use localscreen_core::oracle::Oracle;
use localscreen_core::traits::Classifier;

pub mod device;
pub mod fake;
pub mod hier;
pub mod tokenize;

pub use device::select_device;
pub use fake::FakeClassifier;
pub use hier::{heads_to_scores, HierClassifier, ModelPaths, TrainingConfig};

/// `APP_USE_FAKE_CLASSIFIER=1` forces the fake backend regardless of config.
pub fn fake_forced() -> bool {
    std::env::var("APP_USE_FAKE_CLASSIFIER")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Construct the configured backend and wrap it in an [`Oracle`].
///
/// The threshold and token budget come from config first, then from the
/// artifacts' training config, then from the built-in defaults.
pub fn load_oracle(settings: &Settings, base_dir: &Path) -> Result<Oracle> {
    let labels = &settings.classifier.type_labels;
    let (classifier, threshold): (Box<dyn Classifier>, f32) =
        if settings.classifier.backend == Backend::Fake || fake_forced() {
            info!("using fake classifier");
            (Box::new(FakeClassifier::new(labels.len())), settings.classifier.resolve_threshold(None))
        } else {
            let paths = ModelPaths::from_settings(&settings.model, base_dir);
            let training = TrainingConfig::load_optional(&paths.training_config)?;
            let max_len = settings.classifier.resolve_max_len(training.max_len);
            let threshold = settings.classifier.resolve_threshold(training.bin_threshold);
            let model = HierClassifier::load(&paths, max_len, select_device())?;
            (Box::new(model), threshold)
        };
    info!(classifier = classifier.classifier_id(), threshold, "oracle ready");
    Ok(Oracle::new(classifier, threshold, labels)?)
}
