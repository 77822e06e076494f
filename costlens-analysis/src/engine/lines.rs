//! Byte offset to line number conversion.
//!
//! Lines are 1-based and derived by counting `\n` bytes strictly before the
//! offset, so CRLF content and content without a trailing newline both count
//! correctly.

/// 1-based line number of `offset` in `content`.
pub fn line_at(content: &str, offset: usize) -> u32 {
    let end = offset.min(content.len());
    let newlines = content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count();
    (newlines + 1) as u32
}

/// Byte range `[start, end)` of the line containing `offset`, excluding the
/// terminating newline.
pub fn line_bounds(content: &str, offset: usize) -> (usize, usize) {
    let bytes = content.as_bytes();
    let offset = offset.min(bytes.len());
    let start = bytes[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = bytes[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| offset + i)
        .unwrap_or(bytes.len());
    (start, end)
}

/// Precomputed newline positions for repeated lookups on one document.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let newlines = content
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Self { newlines }
    }

    /// 1-based line of `offset`. Same result as [`line_at`].
    pub fn line_of(&self, offset: usize) -> u32 {
        let before = self.newlines.partition_point(|&nl| nl < offset);
        (before + 1) as u32
    }

    /// Number of lines, counting a final line without a trailing newline.
    pub fn line_count(&self, content: &str) -> usize {
        if content.is_empty() {
            0
        } else if content.ends_with('\n') {
            self.newlines.len()
        } else {
            self.newlines.len() + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_one() {
        assert_eq!(line_at("abc", 0), 1);
        assert_eq!(line_at("", 0), 1);
    }

    #[test]
    fn counts_newlines_before_offset() {
        let src = "a\nb\nc";
        assert_eq!(line_at(src, 2), 2);
        assert_eq!(line_at(src, 4), 3);
        // The newline itself still belongs to the line it terminates.
        assert_eq!(line_at(src, 1), 1);
    }

    #[test]
    fn crlf_and_missing_trailing_newline() {
        let src = "x\r\ny\r\nz";
        assert_eq!(line_at(src, src.find('z').unwrap()), 3);
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_of(src.find('y').unwrap()), 2);
        assert_eq!(idx.line_count(src), 3);
        assert_eq!(idx.line_count("x\n"), 1);
    }

    #[test]
    fn index_agrees_with_line_at() {
        let src = "one\ntwo\n\nfour\n";
        let idx = LineIndex::new(src);
        for offset in 0..=src.len() {
            assert_eq!(idx.line_of(offset), line_at(src, offset), "offset {offset}");
        }
    }

    #[test]
    fn bounds_exclude_newline() {
        let src = "first\nsecond\nthird";
        let (s, e) = line_bounds(src, 8);
        assert_eq!(&src[s..e], "second");
        let (s, e) = line_bounds(src, src.len());
        assert_eq!(&src[s..e], "third");
    }
}
