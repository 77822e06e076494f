//! Bracket matching over raw source text.

/// Bytes of context used when a call's closing parenthesis cannot be found.
pub const FALLBACK_CONTEXT_BYTES: usize = 500;

/// Index of the `)` closing the `(` at `open`, skipping quoted strings.
///
/// Returns `None` if `open` is not a `(` or the parenthesis is unbalanced.
pub fn matching_paren(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 1usize;
    let mut pos = open + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            quote @ (b'"' | b'\'') => {
                pos += 1;
                while pos < bytes.len() {
                    if bytes[pos] == quote && bytes[pos - 1] != b'\\' {
                        break;
                    }
                    pos += 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Text of a call starting at `start` whose argument list opens at `open`.
///
/// Falls back to a fixed window when the call is unbalanced.
pub fn call_text(content: &str, start: usize, open: usize) -> &str {
    let end = match matching_paren(content, open) {
        Some(close) => close + 1,
        None => floor_char_boundary(content, start.saturating_add(FALLBACK_CONTEXT_BYTES)),
    };
    &content[start..end]
}

/// Largest char boundary not exceeding `idx`.
pub fn floor_char_boundary(content: &str, idx: usize) -> usize {
    let mut idx = idx.min(content.len());
    while !content.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_parens_inside_strings() {
        let src = r#"f(a, ")", g(b))"#;
        assert_eq!(matching_paren(src, 1), Some(src.len() - 1));
    }

    #[test]
    fn unbalanced_returns_none() {
        assert_eq!(matching_paren("call(a, b", 4), None);
        assert_eq!(matching_paren("abc", 0), None);
    }

    #[test]
    fn call_text_falls_back_to_window() {
        let src = format!("create(x{}", "y".repeat(600));
        let text = call_text(&src, 0, 6);
        assert_eq!(text.len(), FALLBACK_CONTEXT_BYTES);
    }

    #[test]
    fn floor_boundary_respects_utf8() {
        let s = "aé";
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 10), s.len());
    }
}
