use crate::types::RawScores;

/// A batch classification backend (the oracle).
///
/// Implementations receive already-normalized text and must return exactly
/// one [`RawScores`] per input, in input order.
pub trait Classifier: Send + Sync {
    /// Stable identifier for the backend/model (e.g., `hier:roberta-base`).
    fn classifier_id(&self) -> &str;
    /// Number of type probabilities produced for each input.
    fn num_types(&self) -> usize;
    /// Score a batch of normalized texts.
    fn classify_batch(&self, texts: &[String]) -> anyhow::Result<Vec<RawScores>>;
}
