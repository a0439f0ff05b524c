use localscreen_core::chunker::{Chunker, ChunkingConfig};
use localscreen_core::config::{ScanSettings, DEFAULT_SNIPPET_CHARS};
use localscreen_core::oracle::Oracle;
use localscreen_core::types::{Hit, ScanReport};
use localscreen_core::Result;
use localscreen_text::Normalizer;

/// Chunks a document, classifies every chunk in one oracle call and ranks
/// the harmful ones.
#[derive(Debug, Clone)]
pub struct Scanner {
    chunker: Chunker,
    snippet_chars: usize,
}

impl Default for Scanner {
    fn default() -> Self { Self { chunker: Chunker::new(), snippet_chars: DEFAULT_SNIPPET_CHARS } }
}

impl Scanner {
    pub fn new(chunking: ChunkingConfig, snippet_chars: usize) -> Self {
        Self { chunker: Chunker::with_config(chunking), snippet_chars }
    }

    pub fn from_settings(settings: &ScanSettings) -> Self { Self::new(ChunkingConfig::from(settings), settings.snippet_chars) }

    pub fn scan(&self, document: &str, normalizer: &Normalizer, oracle: &Oracle) -> Result<ScanReport> {
        let chunks = self.chunker.split(document);
        if chunks.is_empty() {
            return Ok(ScanReport::default());
        }
        let normalized: Vec<String> = chunks.iter().map(|c| normalizer.normalize(&c.text)).collect();
        let results = oracle.classify(&normalized)?;

        let mut hits: Vec<Hit> = chunks
            .iter()
            .zip(results)
            .filter(|(_, result)| result.is_bullying())
            .filter_map(|(chunk, result)| {
                let kind = result.kind?;
                let type_probs = result.type_probs?;
                Some(Hit { snippet: snippet(&chunk.text, self.snippet_chars), p_bully: result.p_bully, kind, type_probs })
            })
            .collect();
        // Stable: equal probabilities keep document order.
        hits.sort_by(|a, b| b.p_bully.total_cmp(&a.p_bully));
        Ok(ScanReport { hits, total_chunks: chunks.len() })
    }
}

/// First `max_chars` characters of `text`.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_cuts_on_char_boundaries() {
        assert_eq!(snippet("héllo", 2), "hé");
        assert_eq!(snippet("abc", 300), "abc");
        assert_eq!(snippet("", 5), "");
    }
}
