//! Emoji to `:name:` text, one grapheme cluster at a time.

use unicode_segmentation::UnicodeSegmentation;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Replace every emoji in `text` with ` :name: `.
///
/// Whole clusters (ZWJ sequences, flags, skin tones) are looked up first; a
/// cluster with no entry of its own falls back to its individual characters.
pub fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for grapheme in text.graphemes(true) {
        if let Some(name) = emoji_name(grapheme) {
            push_name(&mut out, &name);
            continue;
        }
        if grapheme.chars().nth(1).is_none() {
            out.push_str(grapheme);
            continue;
        }
        let mut buf = [0u8; 4];
        for ch in grapheme.chars() {
            match emoji_name(ch.encode_utf8(&mut buf)) {
                Some(name) => push_name(&mut out, &name),
                None => out.push(ch),
            }
        }
    }
    out
}

fn push_name(out: &mut String, name: &str) {
    out.push_str(" :");
    out.push_str(name);
    out.push_str(": ");
}

/// Canonical `snake_case` name of `grapheme` if it is an emoji.
pub fn emoji_name(grapheme: &str) -> Option<String> {
    if grapheme.is_ascii() {
        return None;
    }
    let emoji = emojis::get(grapheme).or_else(|| emojis::get(grapheme.trim_end_matches(VARIATION_SELECTOR_16)))?;
    Some(canonical_name(emoji.name()))
}

/// `"flag: Côte d’Ivoire"` becomes `"flag_côte_d'ivoire"`. Separators fold to
/// a single `_`, curly apostrophes straighten and double quotes disappear.
fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            ' ' | ':' | ',' => {
                if !out.ends_with('_') {
                    out.push('_');
                }
            }
            '\u{2019}' | '\u{2018}' => out.push('\''),
            '"' | '\u{201C}' | '\u{201D}' => {}
            _ => out.extend(ch.to_lowercase()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grinning_face() {
        assert_eq!(demojize("hi 😀"), "hi  :grinning_face: ");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(demojize("naïve e\u{301} text #1"), "naïve e\u{301} text #1");
    }

    #[test]
    fn name_separators_fold() {
        assert_eq!(canonical_name("flag: Côte d\u{2019}Ivoire"), "flag_côte_d'ivoire");
        assert_eq!(canonical_name("keycap: #"), "keycap_#");
    }

    #[test]
    fn ascii_is_never_an_emoji() {
        assert_eq!(emoji_name("#"), None);
        assert_eq!(emoji_name("a"), None);
    }
}
