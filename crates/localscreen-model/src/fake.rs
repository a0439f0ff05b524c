use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use localscreen_core::traits::Classifier;
use localscreen_core::types::RawScores;

/// Abusive terms and the type slot they lean towards
/// (0 age, 1 ethnicity, 2 gender, 3 religion, 4 other).
const LEXICON: &[(&str, f32, usize)] = &[
    ("idiot", 0.45, 4),
    ("stupid", 0.4, 4),
    ("loser", 0.4, 4),
    ("ugly", 0.35, 4),
    ("pathetic", 0.35, 4),
    ("worthless", 0.45, 4),
    ("hate", 0.3, 4),
    ("dumb", 0.35, 4),
    ("kys", 0.6, 4),
    ("boomer", 0.35, 0),
    ("grandpa", 0.2, 0),
    ("immigrant", 0.25, 1),
    ("foreigner", 0.25, 1),
    ("girls", 0.2, 2),
    ("woman", 0.2, 2),
    ("kitchen", 0.2, 2),
    ("religion", 0.2, 3),
    ("church", 0.15, 3),
    ("atheist", 0.2, 3),
];

/// Deterministic lexicon scorer for tests and model-less development.
///
/// Scores depend only on the input text: a small hash-derived base plus the
/// weights of every lexicon word present.
pub struct FakeClassifier {
    num_types: usize,
}

impl FakeClassifier {
    pub fn new(num_types: usize) -> Self { Self { num_types: num_types.max(1) } }

    pub fn score(&self, text: &str) -> RawScores {
        let mut p = jitter(text, 0) * 0.1;
        let mut logits: Vec<f32> = (0..self.num_types).map(|i| jitter(text, i as u64 + 1)).collect();
        for token in text.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            for (word, weight, slot) in LEXICON {
                if token == *word {
                    p += weight;
                    if let Some(logit) = logits.get_mut(*slot) {
                        *logit += 2.0;
                    }
                }
            }
        }
        RawScores { p_bully: p.min(0.99), type_probs: softmax(&logits) }
    }
}

impl Classifier for FakeClassifier {
    fn classifier_id(&self) -> &str { "fake:lexicon" }

    fn num_types(&self) -> usize { self.num_types }

    fn classify_batch(&self, texts: &[String]) -> Result<Vec<RawScores>> {
        Ok(texts.iter().map(|t| self.score(t)).collect())
    }
}

/// Uniform value in `[0, 1]` derived from `text` and `seed`.
fn jitter(text: &str, seed: u64) -> f32 {
    let mut hasher = XxHash64::with_seed(seed);
    text.hash(&mut hasher);
    let h = hasher.finish();
    ((h >> 32) as u32) as f32 / u32::MAX as f32
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
