//! Compiled regex wrapper used by the detector pattern tables.

use regex::{Captures, Match, Regex, RegexBuilder};

/// A compiled pattern that never matches if its source failed to compile.
///
/// Detector patterns are fixed strings, so a compile failure is a programming
/// error: it is logged once at construction and the detector keeps running
/// with that single pattern disabled.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Option<Regex>,
}

impl Matcher {
    pub fn new(pattern: &str) -> Self {
        Self::build(pattern, false)
    }

    /// Case-insensitive variant.
    pub fn caseless(pattern: &str) -> Self {
        Self::build(pattern, true)
    }

    fn build(pattern: &str, case_insensitive: bool) -> Self {
        match RegexBuilder::new(pattern).case_insensitive(case_insensitive).build() {
            Ok(regex) => Self { regex: Some(regex) },
            Err(e) => {
                tracing::error!(pattern, error = %e, "detector pattern failed to compile");
                Self { regex: None }
            }
        }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(haystack))
    }

    pub fn find<'h>(&self, haystack: &'h str) -> Option<Match<'h>> {
        self.regex.as_ref().and_then(|re| re.find(haystack))
    }

    pub fn find_iter<'r, 'h>(&'r self, haystack: &'h str) -> impl Iterator<Item = Match<'h>> + 'r
    where
        'h: 'r,
    {
        self.regex.iter().flat_map(move |re| re.find_iter(haystack))
    }

    pub fn captures<'h>(&self, haystack: &'h str) -> Option<Captures<'h>> {
        self.regex.as_ref().and_then(|re| re.captures(haystack))
    }

    pub fn captures_iter<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> impl Iterator<Item = Captures<'h>> + 'r
    where
        'h: 'r,
    {
        self.regex.iter().flat_map(move |re| re.captures_iter(haystack))
    }

    /// Whether the pattern compiled.
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_never_matches() {
        let m = Matcher::new("(unclosed");
        assert!(!m.is_valid());
        assert!(!m.is_match("(unclosed"));
        assert_eq!(m.find_iter("anything").count(), 0);
    }

    #[test]
    fn caseless_matches_any_case() {
        let m = Matcher::caseless(r"stopruntimesession");
        assert!(m.is_match("client.StopRuntimeSession()"));
        assert!(!Matcher::new("stopruntimesession").is_match("StopRuntimeSession"));
    }
}
