//! String literal extraction for regex-based detection.
//!
//! A single forward scan over the source that understands comments, string
//! prefixes (`f`, `r`, `b`, `rb`, ...), triple-quoted strings, and template
//! literals. It needs no grammar, so it also works for languages without a
//! syntax-tree front end.

use super::lines::LineIndex;

/// Comment and string syntax to assume while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFlavor {
    /// `#` comments, triple quotes, string prefixes.
    Python,
    /// `//` and `/* */` comments, backtick template literals.
    CLike,
    /// `#` comments only.
    Hash,
}

/// The kind of string extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// Plain quoted literal.
    Literal,
    /// Interpolated string: Python f-string or JS template literal.
    Template,
    /// Raw string (`r"..."`).
    Raw,
    /// A triple-quoted literal standing alone as a statement.
    DocString,
}

/// A quoted literal and its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedString {
    /// Text between the delimiters, undecoded.
    pub value: String,
    /// Offset of the first prefix character or opening quote.
    pub start: usize,
    /// Offset one past the closing quote.
    pub end: usize,
    /// Offset of the first byte of `value`.
    pub value_start: usize,
    pub line: u32,
    pub kind: StringKind,
    pub triple_quoted: bool,
}

impl ExtractedString {
    pub fn is_template(&self) -> bool {
        self.kind == StringKind::Template
    }

    /// Length in characters of the undecoded body.
    pub fn char_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Extract every string literal in `source`, in source order.
pub fn extract_strings(source: &str, flavor: SourceFlavor) -> Vec<ExtractedString> {
    let index = LineIndex::new(source);
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let b = bytes[pos];

        // Comments
        if b == b'#' && flavor != SourceFlavor::CLike {
            pos = skip_to_eol(bytes, pos);
            continue;
        }
        if flavor == SourceFlavor::CLike && b == b'/' {
            match bytes.get(pos + 1) {
                Some(b'/') => {
                    pos = skip_to_eol(bytes, pos);
                    continue;
                }
                Some(b'*') => {
                    pos = source[pos + 2..]
                        .find("*/")
                        .map(|i| pos + 2 + i + 2)
                        .unwrap_or(bytes.len());
                    continue;
                }
                _ => {}
            }
        }

        let is_quote = b == b'"' || b == b'\'' || (b == b'`' && flavor == SourceFlavor::CLike);
        if !is_quote {
            pos += 1;
            continue;
        }

        let prefix = if flavor == SourceFlavor::Python {
            string_prefix(bytes, pos)
        } else {
            ""
        };
        match scan_literal(source, pos, flavor) {
            Some((value_start, value_end, end, triple)) => {
                let start = pos - prefix.len();
                let lower = prefix.to_ascii_lowercase();
                let kind = if b == b'`' || lower.contains('f') {
                    StringKind::Template
                } else if triple && flavor == SourceFlavor::Python && is_statement(source, start) {
                    StringKind::DocString
                } else if lower.contains('r') {
                    StringKind::Raw
                } else {
                    StringKind::Literal
                };
                out.push(ExtractedString {
                    value: source[value_start..value_end].to_string(),
                    start,
                    end,
                    value_start,
                    line: index.line_of(start),
                    kind,
                    triple_quoted: triple,
                });
                pos = end;
            }
            // Unterminated single-line quote: treat the quote as ordinary text.
            None => pos += 1,
        }
    }
    out
}

fn skip_to_eol(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| pos + i)
        .unwrap_or(bytes.len())
}

/// Python string prefix letters immediately before the quote at `pos`.
fn string_prefix(bytes: &[u8], pos: usize) -> &'static str {
    let mut start = pos;
    while start > 0 && pos - start < 2 && matches!(bytes[start - 1], b'f' | b'F' | b'r' | b'R' | b'b' | b'B' | b'u' | b'U') {
        start -= 1;
    }
    // A prefix must not be the tail of an identifier (`elif"` is not a prefix).
    if start > 0 && (bytes[start - 1].is_ascii_alphanumeric() || bytes[start - 1] == b'_') {
        return "";
    }
    match &bytes[start..pos] {
        b"f" | b"F" => "f",
        b"r" | b"R" => "r",
        b"b" | b"B" => "b",
        b"u" | b"U" => "u",
        [a, b] => {
            let pair = [a.to_ascii_lowercase(), b.to_ascii_lowercase()];
            match &pair {
                b"fr" | b"rf" => "fr",
                b"rb" | b"br" => "rb",
                _ => "",
            }
        }
        _ => "",
    }
}

/// Offset one past the terminated literal whose opening quote is at `pos`.
pub fn literal_end(source: &str, pos: usize, flavor: SourceFlavor) -> Option<usize> {
    scan_literal(source, pos, flavor).map(|(_, _, end, _)| end)
}

/// Scan a literal whose opening quote is at `pos`.
///
/// Returns `(value_start, value_end, end, triple)`.
fn scan_literal(source: &str, pos: usize, flavor: SourceFlavor) -> Option<(usize, usize, usize, bool)> {
    let bytes = source.as_bytes();
    let quote = bytes[pos];
    let triple = flavor == SourceFlavor::Python
        && bytes.get(pos + 1) == Some(&quote)
        && bytes.get(pos + 2) == Some(&quote);

    if triple {
        let value_start = pos + 3;
        let mut i = value_start;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                i += 2;
                continue;
            }
            if bytes[i] == quote && bytes.get(i + 1) == Some(&quote) && bytes.get(i + 2) == Some(&quote) {
                return Some((value_start, i, i + 3, true));
            }
            i += 1;
        }
        return None;
    }

    let multiline = quote == b'`';
    let value_start = pos + 1;
    let mut i = value_start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if !multiline => return None,
            c if c == quote => return Some((value_start, i, i + 1, false)),
            _ => i += 1,
        }
    }
    None
}

/// Whether the literal starting at `start` is an expression statement: the
/// previous significant character is a `:` (a block opener) or nothing.
fn is_statement(source: &str, start: usize) -> bool {
    let before = source[..start].trim_end();
    if before.is_empty() {
        return true;
    }
    let (line_start, _) = super::lines::line_bounds(source, start);
    let lead = &source[line_start..start];
    lead.trim().is_empty() && before.ends_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(src: &str, flavor: SourceFlavor) -> Vec<String> {
        extract_strings(src, flavor).into_iter().map(|s| s.value).collect()
    }

    #[test]
    fn python_literals_and_comments() {
        let src = "a = 'one'  # 'not a string'\nb = \"two\"\n";
        assert_eq!(values(src, SourceFlavor::Python), vec!["one", "two"]);
    }

    #[test]
    fn triple_quoted_and_prefixes() {
        let src = "p = f\"\"\"Hello {name}\nsecond line\"\"\"\nr = rb'raw'\n";
        let found = extract_strings(src, SourceFlavor::Python);
        assert_eq!(found.len(), 2);
        assert!(found[0].triple_quoted);
        assert_eq!(found[0].kind, StringKind::Template);
        assert_eq!(found[0].value, "Hello {name}\nsecond line");
        assert_eq!(found[0].start, src.find("f\"\"\"").unwrap());
        assert_eq!(found[1].kind, StringKind::Raw);
        assert_eq!(found[1].line, 3);
    }

    #[test]
    fn docstrings_are_marked() {
        let src = "def f():\n    \"\"\"Docs.\"\"\"\n    x = \"\"\"value\"\"\"\n";
        let found = extract_strings(src, SourceFlavor::Python);
        assert_eq!(found[0].kind, StringKind::DocString);
        assert_eq!(found[1].kind, StringKind::Literal);
    }

    #[test]
    fn escaped_quotes_stay_inside() {
        let src = r#"s = "say \"hi\"""#;
        assert_eq!(values(src, SourceFlavor::Python), vec![r#"say \"hi\""#]);
    }

    #[test]
    fn js_templates_and_block_comments() {
        let src = "/* 'skip' */ const a = `multi\nline ${x}`; // 'skip'\nconst b = 'kept';";
        let found = extract_strings(src, SourceFlavor::CLike);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, StringKind::Template);
        assert_eq!(found[1].value, "kept");
        assert_eq!(found[1].line, 3);
    }

    #[test]
    fn apostrophe_in_unterminated_line_is_not_a_string() {
        let src = "x = don't\ny = \"ok\"\n";
        assert_eq!(values(src, SourceFlavor::Hash), vec!["ok"]);
    }

    #[test]
    fn identifier_tail_is_not_a_prefix() {
        let src = "elif\"x\" : pass\n";
        let found = extract_strings(src, SourceFlavor::Python);
        assert_eq!(found[0].kind, StringKind::Literal);
        assert_eq!(found[0].start, 4);
    }
}
