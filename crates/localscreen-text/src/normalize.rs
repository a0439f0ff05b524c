use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

use localscreen_core::config::{resolve_with_base, NormalizerSettings};

use crate::emoji::demojize;
use crate::repair::fix_text;
use crate::segment::WordSegmenter;

pub const URL_TOKEN: &str = "<url>";
pub const USER_TOKEN: &str = "<user>";

/// Extra whole-pipeline passes allowed before giving up on a fixpoint.
const MAX_SETTLE_PASSES: usize = 2;

/// Deterministic text cleanup applied to every input before classification.
///
/// Stages, in order: encoding repair, URL masking, mention masking, hashtag
/// segmentation, emoji naming, lowercasing, whitespace collapse.
#[derive(Debug, Clone)]
pub struct Normalizer {
    url: Regex,
    mention: Regex,
    hashtag: Regex,
    segmenter: WordSegmenter,
}

impl Normalizer {
    /// Normalizer backed by the embedded segmentation dictionary.
    pub fn new() -> Result<Self> { Self::with_segmenter(WordSegmenter::builtin()) }

    pub fn with_segmenter(segmenter: WordSegmenter) -> Result<Self> {
        Ok(Self {
            url: Regex::new(r"(?i)(?:https?://|www\.)\S+").context("url pattern")?,
            mention: Regex::new(r"@\w+").context("mention pattern")?,
            hashtag: Regex::new(r"#(\w+)").context("hashtag pattern")?,
            segmenter,
        })
    }

    /// Build from the `[normalizer]` settings; a relative dictionary path
    /// resolves against `base_dir`.
    pub fn from_settings(settings: &NormalizerSettings, base_dir: &Path) -> Result<Self> {
        let segmenter = match &settings.dictionary {
            Some(dictionary) => {
                let path = resolve_with_base(base_dir, dictionary);
                let segmenter = WordSegmenter::load(&path)?;
                tracing::info!(path = %path.display(), words = segmenter.len(), "loaded segmentation dictionary");
                segmenter
            }
            None => WordSegmenter::builtin(),
        };
        Self::with_segmenter(segmenter)
    }

    pub fn segmenter(&self) -> &WordSegmenter { &self.segmenter }

    /// Normalize one text. Never fails; `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = self.pass(raw);
        for _ in 0..MAX_SETTLE_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    pub fn normalize_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        texts.iter().map(|t| self.normalize(t.as_ref())).collect()
    }

    fn pass(&self, raw: &str) -> String {
        let text = fix_text(raw);
        let text = self.mask_urls(&text);
        let text = self.mask_mentions(&text);
        let text = self.split_hashtags(&text);
        let text = demojize(&text);
        let text = fold_case(&text);
        collapse_whitespace(&text)
    }

    pub fn mask_urls(&self, text: &str) -> String { self.url.replace_all(text, URL_TOKEN).into_owned() }

    pub fn mask_mentions(&self, text: &str) -> String { self.mention.replace_all(text, USER_TOKEN).into_owned() }

    /// `#StopBullying` becomes ` stop bullying `; the `#` is dropped.
    pub fn split_hashtags(&self, text: &str) -> String {
        self.hashtag
            .replace_all(text, |caps: &Captures| format!(" {} ", self.segmenter.segment(&caps[1]).join(" ")))
            .into_owned()
    }
}

pub fn fold_case(text: &str) -> String { text.to_lowercase().nfc().collect() }

pub fn collapse_whitespace(text: &str) -> String { text.split_whitespace().collect::<Vec<_>>().join(" ") }
