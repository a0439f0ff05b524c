//! Unigram word segmentation for hashtag bodies.
//!
//! `segment("helloworld")` picks the split with the highest product of word
//! probabilities. Unknown words get a length-penalised probability so long
//! unknown spans lose to known words.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_UNIGRAMS: &str = include_str!("../data/unigrams.txt");

/// Corpus size assumed when a dictionary lists words by rank only.
const ZIPF_TOTAL: f64 = 1.0e12;
pub const MAX_WORD_LEN: usize = 24;

#[derive(Debug, Clone)]
pub struct WordSegmenter {
    log_probs: HashMap<String, f64>,
    log_total: f64,
    max_word_len: usize,
}

impl WordSegmenter {
    /// The embedded English dictionary.
    pub fn builtin() -> Self {
        // The embedded list is rank-only and non-empty, so parsing cannot fail.
        Self::parse(BUILTIN_UNIGRAMS).unwrap_or_else(|_| Self::from_counts(HashMap::new(), ZIPF_TOTAL))
    }

    /// Load a dictionary file: `word<TAB>count` per line, or one word per
    /// line in descending frequency. `#` starts a comment line.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid dictionary {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut counts: HashMap<String, f64> = HashMap::new();
        let mut counted_total = 0.0f64;
        let mut any_counted = false;
        let mut rank = 0usize;

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else { continue };
            let word = clean(word);
            if word.is_empty() {
                continue;
            }
            rank += 1;
            let count = match fields.next() {
                Some(raw) => {
                    let count: f64 = raw
                        .parse()
                        .map_err(|_| anyhow!("line {}: count '{}' is not a number", lineno + 1, raw))?;
                    if count.is_nan() || count <= 0.0 {
                        return Err(anyhow!("line {}: count must be positive", lineno + 1));
                    }
                    any_counted = true;
                    counted_total += count;
                    count
                }
                None => ZIPF_TOTAL * 0.1 / rank as f64,
            };
            counts.entry(word).or_insert(count);
        }
        if counts.is_empty() {
            return Err(anyhow!("dictionary has no words"));
        }
        let total = if any_counted { counted_total.max(1.0) } else { ZIPF_TOTAL };
        Ok(Self::from_counts(counts, total))
    }

    fn from_counts(counts: HashMap<String, f64>, total: f64) -> Self {
        let log_total = total.log10();
        let log_probs = counts.into_iter().map(|(w, c)| (w, c.log10() - log_total)).collect();
        Self { log_probs, log_total, max_word_len: MAX_WORD_LEN }
    }

    pub fn len(&self) -> usize { self.log_probs.len() }

    pub fn is_empty(&self) -> bool { self.log_probs.is_empty() }

    pub fn contains(&self, word: &str) -> bool { self.log_probs.contains_key(word) }

    fn score(&self, word: &str) -> f64 {
        match self.log_probs.get(word) {
            Some(lp) => *lp,
            // log10(10 / (total * 10^len))
            None => 1.0 - self.log_total - word.len() as f64,
        }
    }

    /// Split `text` into its most likely words. Input is cleaned to lowercase
    /// ASCII letters and digits first; an empty result yields no words.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let text = clean(text);
        let n = text.len();
        if n == 0 {
            return Vec::new();
        }

        // best[i]: score of the best split of text[i..] and the end of its first word.
        let mut best: Vec<(f64, usize)> = vec![(f64::NEG_INFINITY, n); n + 1];
        best[n] = (0.0, n);
        for i in (0..n).rev() {
            for j in (i + 1)..=(i + self.max_word_len).min(n) {
                let candidate = self.score(&text[i..j]) + best[j].0;
                if candidate > best[i].0 {
                    best[i] = (candidate, j);
                }
            }
        }

        let mut words = Vec::new();
        let mut i = 0;
        while i < n {
            let end = best[i].1;
            words.push(text[i..end].to_string());
            i = end;
        }
        words
    }
}

impl Default for WordSegmenter {
    fn default() -> Self { Self::builtin() }
}

/// Lowercase ASCII letters and digits of `text`; everything else is dropped.
pub fn clean(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dictionary_loads() {
        let seg = WordSegmenter::builtin();
        assert!(seg.len() > 1000);
        assert!(seg.contains("hello") && seg.contains("world"));
    }

    #[test]
    fn unknown_words_are_penalised_by_length() {
        let seg = WordSegmenter::builtin();
        assert!(seg.score("qqqq") < seg.score("qqq"));
        assert!(seg.score("the") > seg.score("qqq"));
    }

    #[test]
    fn clean_keeps_ascii_alphanumerics() {
        assert_eq!(clean("Stop_Bullying-2024!é"), "stopbullying2024");
    }
}
