//! Threshold and label layer on top of a [`Classifier`] backend.
//!
//! Backends only produce probabilities; the decision boundary and the type
//! labels are configuration, applied here so every backend obeys the same
//! `binary = bullying iff p_bully >= threshold` rule.

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::Classifier;
use crate::types::{ClassificationResult, RawScores, TypeProbs, Verdict};

pub struct Oracle {
    inner: Box<dyn Classifier>,
    threshold: f32,
    labels: Vec<String>,
}

impl Oracle {
    pub fn new(inner: Box<dyn Classifier>, threshold: f32, labels: &[String]) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig(format!("threshold {threshold} outside [0, 1]")));
        }
        if inner.num_types() != labels.len() {
            return Err(Error::InvalidConfig(format!(
                "classifier '{}' produces {} type scores but {} labels are configured",
                inner.classifier_id(),
                inner.num_types(),
                labels.len()
            )));
        }
        Ok(Self { inner, threshold, labels: labels.to_vec() })
    }

    pub fn threshold(&self) -> f32 { self.threshold }

    pub fn labels(&self) -> &[String] { &self.labels }

    pub fn classifier_id(&self) -> &str { self.inner.classifier_id() }

    /// Classify a batch of normalized texts with a single backend call.
    ///
    /// An empty batch returns immediately without touching the backend.
    pub fn classify(&self, texts: &[String]) -> Result<Vec<ClassificationResult>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let scores = self
            .inner
            .classify_batch(texts)
            .map_err(|e| Error::Classifier(format!("{:#}", e)))?;
        if scores.len() != texts.len() {
            return Err(Error::Classifier(format!(
                "'{}' returned {} results for {} inputs",
                self.inner.classifier_id(),
                scores.len(),
                texts.len()
            )));
        }
        debug!(classifier = self.inner.classifier_id(), batch = texts.len(), "oracle call");
        scores.into_iter().map(|s| self.label(s)).collect()
    }

    /// Apply the decision threshold and type labels to one raw score.
    pub fn label(&self, scores: RawScores) -> Result<ClassificationResult> {
        if scores.type_probs.len() != self.labels.len() {
            return Err(Error::Classifier(format!(
                "expected {} type probabilities, got {}",
                self.labels.len(),
                scores.type_probs.len()
            )));
        }
        if scores.p_bully < self.threshold || scores.p_bully.is_nan() {
            return Ok(ClassificationResult {
                binary: Verdict::NotBullying,
                p_bully: scores.p_bully,
                kind: None,
                type_probs: None,
            });
        }

        // First maximum wins, matching arg-max over the label order.
        let mut best = 0usize;
        for (i, p) in scores.type_probs.iter().enumerate() {
            if *p > scores.type_probs[best] {
                best = i;
            }
        }
        let type_probs = self.labels.iter().cloned().zip(scores.type_probs).collect();
        Ok(ClassificationResult {
            binary: Verdict::Bullying,
            p_bully: scores.p_bully,
            kind: Some(self.labels[best].clone()),
            type_probs: Some(TypeProbs(type_probs)),
        })
    }
}
