use localscreen_core::config::NormalizerSettings;
use localscreen_text::{Normalizer, WordSegmenter};
use proptest::prelude::*;
use std::io::Write;

fn normalizer() -> Normalizer { Normalizer::new().expect("normalizer") }

#[test]
fn masks_urls_mentions_hashtags_and_emoji() {
    let out = normalizer().normalize("check http://x.co and @bob #HelloWorld 😀");
    assert_eq!(out, "check <url> and <user> hello world :grinning_face:");
    for residue in ["http", "@bob", "#", "x.co", "😀"] {
        assert!(!out.contains(residue), "{residue:?} left in {out:?}");
    }
}

#[test]
fn www_and_uppercase_schemes_are_masked() {
    let n = normalizer();
    assert_eq!(n.normalize("see www.example.org/page"), "see <url>");
    assert_eq!(n.normalize("HTTPS://EXAMPLE.ORG now"), "<url> now");
}

#[test]
fn mojibake_is_repaired_before_masking() {
    let n = normalizer();
    assert_eq!(n.normalize("Ã‰cole cafÃ©"), "école café");
    assert_eq!(n.normalize("donâ€™t  go"), "don't go");
}

#[test]
fn hashtags_are_segmented_without_the_hash() {
    let n = normalizer();
    assert_eq!(n.normalize("#StopBullying"), "stop bullying");
    assert_eq!(n.normalize("so true#LoveWins!"), "so true love wins !");
}

#[test]
fn non_ascii_hashtag_body_yields_nothing() {
    assert_eq!(normalizer().normalize("tag #日本 here"), "tag here");
}

#[test]
fn empty_and_blank_inputs_become_empty() {
    let n = normalizer();
    assert_eq!(n.normalize(""), "");
    assert_eq!(n.normalize(" \t\n\r "), "");
}

#[test]
fn whitespace_collapses_and_ends_are_trimmed() {
    assert_eq!(normalizer().normalize("  You   ARE\n\nugly  "), "you are ugly");
}

#[test]
fn batch_preserves_order() {
    let out = normalizer().normalize_batch(&["B", "a", "@c"]);
    assert_eq!(out, vec!["b", "a", "<user>"]);
}

#[test]
fn separate_instances_agree() {
    let input = "Ugh @jim_99 your #ThrowbackThursday pic 😂😂 http://t.co/x";
    assert_eq!(normalizer().normalize(input), normalizer().normalize(input));
}

#[test]
fn dictionary_file_replaces_builtin() {
    let mut file = tempfile::NamedTempFile::new().expect("tmp");
    writeln!(file, "# counts").expect("write");
    writeln!(file, "zorb\t500").expect("write");
    writeln!(file, "blat\t400").expect("write");
    let settings = NormalizerSettings { dictionary: Some(file.path().display().to_string()) };
    let n = Normalizer::from_settings(&settings, std::path::Path::new(".")).expect("normalizer");
    assert_eq!(n.segmenter().len(), 2);
    assert_eq!(n.normalize("#ZorbBlat"), "zorb blat");
}

#[test]
fn missing_dictionary_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tmp");
    let settings = NormalizerSettings { dictionary: Some("nope.txt".into()) };
    assert!(Normalizer::from_settings(&settings, dir.path()).is_err());
}

#[test]
fn rank_only_dictionary_prefers_known_words() {
    let seg = WordSegmenter::parse("hello\nworld\n").expect("dictionary");
    assert_eq!(seg.segment("HelloWorld"), vec!["hello", "world"]);
    assert!(seg.segment("").is_empty());
}

#[test]
fn bad_dictionary_counts_are_rejected() {
    assert!(WordSegmenter::parse("word\tmany\n").is_err());
    assert!(WordSegmenter::parse("word\t-3\n").is_err());
    assert!(WordSegmenter::parse("# only a comment\n").is_err());
}

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("hello".to_string()),
        Just("WORLD".to_string()),
        Just("http://x.co/a?b=1".to_string()),
        Just("www.site.org".to_string()),
        Just("@someone".to_string()),
        Just("#HelloWorld".to_string()),
        Just("#".to_string()),
        Just("😀".to_string()),
        Just("👍🏽".to_string()),
        Just("cafÃ©".to_string()),
        Just("don’t".to_string()),
        Just("\u{FB01}ne".to_string()),
        Just("naïve".to_string()),
        Just("!?.".to_string()),
        "[a-zA-Z0-9]{1,8}",
    ]
}

fn separator() -> impl Strategy<Value = String> {
    prop_oneof![Just(" ".to_string()), Just("  ".to_string()), Just("\n".to_string()), Just("\t".to_string()), Just(String::new())]
}

proptest! {
    #[test]
    fn normalize_is_idempotent(parts in proptest::collection::vec((token(), separator()), 0..12)) {
        let n = normalizer();
        let input: String = parts.into_iter().map(|(t, s)| t + &s).collect();
        let once = n.normalize(&input);
        prop_assert_eq!(n.normalize(&once), once.clone());
    }

    #[test]
    fn output_has_no_edge_or_repeated_whitespace(input in "\\PC{0,40}") {
        let out = normalizer().normalize(&input);
        prop_assert_eq!(out.trim(), out.as_str());
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.contains('\n') && !out.contains('\t'));
    }
}
