//! Context heuristics that discard matches sitting in comments, docstrings,
//! or documentation-style strings.
//!
//! These are deliberately lightweight: a model identifier in a test fixture
//! with no cue words is still reported. Configuration constants are favored
//! over precision.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

use super::lines::line_bounds;
use super::spans::floor_char_boundary;

/// Words that mark a string as an error message, example, or validation text.
pub const VALIDATION_CUES: &[&str] = &[
    "error",
    "validate",
    "validation",
    "pattern",
    "format",
    "example",
    "e.g.",
    "must follow",
    "invalid",
    "required",
    "placeholder",
    "unsupported",
    "deprecated",
];

static CUE_MATCHER: LazyLock<Option<AhoCorasick>> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(VALIDATION_CUES)
        .ok()
});

/// Whether the match at `[start, end)` should be discarded.
///
/// Offsets past the end or inside a multibyte character are snapped back to
/// the previous character boundary.
pub fn is_suppressed(content: &str, start: usize, end: usize) -> bool {
    in_validation_string(content, start, end)
        || in_line_comment(content, start)
        || in_block_comment(content, start)
}

/// A `#` or `//` marker appears earlier on the same line.
pub fn in_line_comment(content: &str, start: usize) -> bool {
    let start = floor_char_boundary(content, start);
    let (line_start, _) = line_bounds(content, start);
    let before = &content[line_start..start];
    before.contains("//") || before.contains('#')
}

/// An odd number of triple-quote delimiters, or an unclosed `/*`, precedes
/// the match.
pub fn in_block_comment(content: &str, start: usize) -> bool {
    let before = &content[..floor_char_boundary(content, start)];
    let triple_double = before.matches("\"\"\"").count();
    let triple_single = before.matches("'''").count();
    if triple_double % 2 == 1 || triple_single % 2 == 1 {
        return true;
    }
    match (before.rfind("/*"), before.rfind("*/")) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// The match is inside a quoted string on a line carrying validation cues.
pub fn in_validation_string(content: &str, start: usize, end: usize) -> bool {
    let start = floor_char_boundary(content, start);
    let (line_start, _) = line_bounds(content, start);
    let (_, line_end) = line_bounds(content, end.max(start));
    let before = &content[line_start..start];

    if !odd_quote_parity(before) {
        return false;
    }

    let line = &content[line_start..line_end];
    match CUE_MATCHER.as_ref() {
        Some(ac) => ac.is_match(line),
        None => {
            let lower = line.to_lowercase();
            VALIDATION_CUES.iter().any(|cue| lower.contains(cue))
        }
    }
}

/// Any quote style with an odd count of unescaped occurrences.
fn odd_quote_parity(before: &str) -> bool {
    let single = before.matches('\'').count() - before.matches("\\'").count();
    let double = before.matches('"').count() - before.matches("\\\"").count();
    let backtick = before.matches('`').count();
    single % 2 == 1 || double % 2 == 1 || backtick % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(content: &str, needle: &str) -> (usize, usize) {
        let start = content.find(needle).unwrap();
        (start, start + needle.len())
    }

    #[test]
    fn hash_comment_suppresses() {
        let src = "x = 1  # uses anthropic.claude-v2\n";
        let (s, _) = span(src, "anthropic");
        assert!(in_line_comment(src, s));
    }

    #[test]
    fn comment_on_previous_line_does_not_leak() {
        let src = "# header\nmodel = \"anthropic.claude-v2\"\n";
        let (s, _) = span(src, "anthropic");
        assert!(!in_line_comment(src, s));
    }

    #[test]
    fn docstring_parity() {
        let src = "def f():\n    \"\"\"Uses amazon.nova-pro-v1:0\"\"\"\nm = \"amazon.nova-lite-v1:0\"\n";
        let (inside, _) = span(src, "amazon.nova-pro");
        let (outside, _) = span(src, "amazon.nova-lite");
        assert!(in_block_comment(src, inside));
        assert!(!in_block_comment(src, outside));
    }

    #[test]
    fn js_block_comment() {
        let src = "/* model: amazon.nova-pro-v1:0 */\nconst m = 'amazon.nova-lite-v1:0';\n";
        let (inside, _) = span(src, "amazon.nova-pro");
        let (outside, _) = span(src, "amazon.nova-lite");
        assert!(in_block_comment(src, inside));
        assert!(!in_block_comment(src, outside));
    }

    #[test]
    fn validation_message_is_suppressed() {
        let src = "raise ValueError(\"Invalid model, e.g. anthropic.claude-3-haiku-20240307-v1:0\")\n";
        let (s, e) = span(src, "anthropic.claude-3-haiku-20240307-v1:0");
        assert!(is_suppressed(src, s, e));
    }

    #[test]
    fn plain_call_argument_is_kept() {
        let src = "client.invoke_model(modelId=\"anthropic.claude-3-haiku-20240307-v1:0\")\n";
        let (s, e) = span(src, "anthropic.claude-3-haiku-20240307-v1:0");
        assert!(!is_suppressed(src, s, e));
    }

    #[test]
    fn offsets_inside_a_multibyte_char_are_snapped() {
        let src = "x = 'é anthropic'\n";
        let e_acute = src.find('é').unwrap();
        assert!(!is_suppressed(src, e_acute + 1, e_acute + 3));
        assert!(!in_line_comment(src, e_acute + 1));
        assert!(!in_block_comment(src, e_acute + 1));
        assert!(!is_suppressed(src, src.len() + 10, src.len() + 20));
    }

    #[test]
    fn cue_word_outside_a_string_is_ignored() {
        // Quote parity is even before the match, so cue words do not matter.
        let src = "pattern = anthropic_model\n";
        let (s, e) = span(src, "anthropic_model");
        assert!(!in_validation_string(src, s, e));
    }
}
