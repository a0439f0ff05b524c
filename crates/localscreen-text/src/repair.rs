//! Encoding repair: undo UTF-8 text that was decoded as Windows-1252,
//! drop stray control characters and fold typographic variants.
//!
//! [`fix_text`] iterates to a fixpoint, so `fix_text(fix_text(s)) == fix_text(s)`.

use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

const MAX_PASSES: usize = 4;

/// Windows-1252 characters for bytes 0x80..=0x9F. `None` marks the five
/// undefined positions.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Repair `text` until it stops changing.
pub fn fix_text(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_PASSES {
        let next = fix_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn fix_once(text: &str) -> String {
    let text = remove_control_chars(text);
    let text = fix_mojibake(&text);
    let text = fix_c1_controls(&text);
    let text = uncurl_quotes(&text);
    let text = fix_ligatures(&text);
    text.nfc().collect()
}

/// Drop C0 controls other than tab, newline, form feed and carriage return,
/// plus DEL, the byte-order mark and the interlinear annotation/object
/// replacement characters.
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            !matches!(c,
                '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0E}'..='\u{1F}' | '\u{7F}'
                | '\u{FEFF}' | '\u{FFF9}'..='\u{FFFC}')
        })
        .collect()
}

/// Re-decode every run of non-ASCII-whitespace characters whose sloppy
/// Windows-1252 encoding is valid UTF-8.
///
/// Runs are delimited by ASCII whitespace only: NBSP and NEL show up inside
/// mojibake (`"Ã\u{A0}"` is a mangled `"à"`).
pub fn fix_mojibake(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run_start: Option<usize> = None;
    for (idx, ch) in text.char_indices() {
        if ch.is_ascii_whitespace() {
            if let Some(start) = run_start.take() {
                out.push_str(&fix_run(&text[start..idx]));
            }
            out.push(ch);
        } else if run_start.is_none() {
            run_start = Some(idx);
        }
    }
    if let Some(start) = run_start {
        out.push_str(&fix_run(&text[start..]));
    }
    out
}

fn fix_run(run: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(run);
    loop {
        if current.is_ascii() {
            return current;
        }
        let Some(bytes) = sloppy_cp1252_bytes(&current) else { return current };
        match String::from_utf8(bytes) {
            Ok(decoded) if decoded != *current => current = Cow::Owned(decoded),
            _ => return current,
        }
    }
}

/// Encode `s` as Windows-1252, letting code points below 0x100 stand for
/// their own byte (covers the undefined positions and C1 controls).
fn sloppy_cp1252_bytes(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) => Some(b),
            Err(_) => CP1252_HIGH
                .iter()
                .position(|&mapped| mapped == Some(c))
                .and_then(|i| u8::try_from(0x80 + i).ok()),
        })
        .collect()
}

/// Replace C1 control characters with their Windows-1252 reading; the
/// undefined positions are dropped.
pub fn fix_c1_controls(text: &str) -> String {
    text.chars()
        .filter_map(|c| match u32::from(c) {
            cp @ 0x80..=0x9F => CP1252_HIGH[(cp - 0x80) as usize],
            _ => Some(c),
        })
        .collect()
}

pub fn uncurl_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            other => other,
        })
        .collect()
}

pub fn fix_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            '\u{FB05}' | '\u{FB06}' => out.push_str("st"),
            '\u{0132}' => out.push_str("IJ"),
            '\u{0133}' => out.push_str("ij"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_mojibake_is_undone() {
        assert_eq!(fix_text("cafÃ©"), "café");
    }

    #[test]
    fn cp1252_quote_mojibake_is_undone_and_uncurled() {
        assert_eq!(fix_text("donâ€™t"), "don't");
    }

    #[test]
    fn nbsp_inside_mojibake_run() {
        assert_eq!(fix_text("voilÃ\u{A0} tout"), "voilà tout");
    }

    #[test]
    fn legitimate_accents_survive() {
        assert_eq!(fix_text("naïve résumé"), "naïve résumé");
    }

    #[test]
    fn controls_are_stripped_but_layout_whitespace_kept() {
        assert_eq!(fix_text("a\u{0}b\u{FEFF}c\td\ne"), "abc\td\ne");
    }

    #[test]
    fn c1_controls_read_as_cp1252() {
        assert_eq!(fix_c1_controls("\u{93}hi\u{94}"), "\u{201C}hi\u{201D}");
        assert_eq!(fix_text("\u{93}hi\u{94}"), "\"hi\"");
    }

    #[test]
    fn ligatures_expand() {
        assert_eq!(fix_text("\u{FB01}ne \u{FB02}ow"), "fine flow");
    }

    #[test]
    fn decomposed_input_is_composed() {
        assert_eq!(fix_text("e\u{301}"), "\u{E9}");
    }
}
