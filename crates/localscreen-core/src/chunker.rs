use crate::config::ScanSettings;
use crate::types::Chunk;

pub const DEFAULT_MAX_CHARS: usize = 280;
pub const DEFAULT_MIN_CHUNK_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub min_chunk_len: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chars: DEFAULT_MAX_CHARS, min_chunk_len: DEFAULT_MIN_CHUNK_LEN }
    }
}

impl From<&ScanSettings> for ChunkingConfig {
    fn from(s: &ScanSettings) -> Self {
        Self { max_chars: s.max_chars, min_chunk_len: s.min_chunk_len }
    }
}

/// Splits documents into sentence-packed scan units.
///
/// Lengths are counted in `char`s, never bytes.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    chunking_config: ChunkingConfig,
}

impl Chunker {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(chunking_config: ChunkingConfig) -> Self { Self { chunking_config } }

    pub fn config(&self) -> ChunkingConfig { self.chunking_config }

    /// Chunk `document` using the configured bounds.
    pub fn split(&self, document: &str) -> Vec<Chunk> {
        let packed = pack_segments(document, self.chunking_config.max_chars);
        packed
            .into_iter()
            .filter(|c| c.chars().count() >= self.chunking_config.min_chunk_len)
            .enumerate()
            .map(|(order, text)| Chunk { text, order })
            .collect()
    }
}

/// Chunk `document` with an explicit `max_chars` and the default length floor.
pub fn split(document: &str, max_chars: usize) -> Vec<Chunk> {
    Chunker::with_config(ChunkingConfig { max_chars, min_chunk_len: DEFAULT_MIN_CHUNK_LEN }).split(document)
}

/// Provisional, untrimmed segments of `document`.
///
/// A boundary is either a whitespace run directly after `.`, `!` or `?`, or a
/// run of newlines anywhere. Boundaries are consumed; segments may be empty.
pub fn split_segments(document: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0usize;
    let mut prev: Option<char> = None;
    let mut chars = document.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let after_terminal = matches!(prev, Some('.' | '!' | '?'));
        if !(after_terminal && ch.is_whitespace()) && ch != '\n' {
            prev = Some(ch);
            continue;
        }

        // A terminal mark claims the whole whitespace run, newlines included.
        let whitespace_run = after_terminal;
        segments.push(&document[start..idx]);
        let mut end = idx + ch.len_utf8();
        let mut last = ch;
        while let Some(&(next_idx, next)) = chars.peek() {
            let continues = if whitespace_run { next.is_whitespace() } else { next == '\n' };
            if !continues {
                break;
            }
            end = next_idx + next.len_utf8();
            last = next;
            chars.next();
        }
        start = end;
        prev = Some(last);
    }
    segments.push(&document[start..]);
    segments
}

/// Greedily pack trimmed segments into space-joined buffers of at most
/// `max_chars`. A single segment longer than `max_chars` is kept whole.
fn pack_segments(document: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for segment in split_segments(document) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let segment_len = segment.chars().count();
        if buffer_len + 1 + segment_len <= max_chars {
            if !buffer.is_empty() {
                buffer.push(' ');
                buffer_len += 1;
            }
            buffer.push_str(segment);
            buffer_len += segment_len;
        } else {
            if !buffer.is_empty() {
                chunks.push(std::mem::take(&mut buffer));
            }
            buffer.push_str(segment);
            buffer_len = segment_len;
        }
    }
    if !buffer.is_empty() {
        chunks.push(buffer);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_mark_claims_following_newlines() {
        assert_eq!(split_segments("One.\n\n  Two"), vec!["One.", "Two"]);
    }

    #[test]
    fn bare_newline_run_keeps_surrounding_spaces() {
        assert_eq!(split_segments("one \n\n two"), vec!["one ", " two"]);
    }

    #[test]
    fn mid_word_period_is_not_a_boundary() {
        assert_eq!(split_segments("visit example.com now"), vec!["visit example.com now"]);
    }

    #[test]
    fn packing_counts_chars_not_bytes() {
        // 12 chars but 22 bytes once joined.
        let packed = pack_segments("ééééé.\néééé!", 12);
        assert_eq!(packed, vec!["ééééé. éééé!".to_string()]);
    }
}
