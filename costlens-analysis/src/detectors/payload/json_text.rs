//! JSON shapes embedded in prompt text.

use std::sync::LazyLock;

use costlens_core::constants::CHARS_PER_TOKEN;
use costlens_core::FxHashMap;

use crate::engine::Matcher;

static JSON_OBJECT: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r#"\{[^{}]*"[^"]+"\s*:\s*[^{}]+\}"#));

static SCHEMA_FIELD: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r#"-\s*"([^"]+)":\s*([^\n]+)"#));

static QUOTED_KEY: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r#""([a-zA-Z_][a-zA-Z0-9_]*)"\s*:"#));

static PLACEHOLDER: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}"));

/// Schema bullet lines (`- "field": type`) needed before they count.
const MIN_SCHEMA_FIELDS: usize = 3;
/// Occurrences of one key that make the text repetitive.
const MIN_KEY_REPEATS: usize = 3;

/// Share of JSON tokens a compact value-separated encoding saves, in percent.
pub const PROMPT_SAVINGS_PERCENT: usize = 70;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonPattern {
    Object { length: usize },
    SchemaFields { count: usize, length: usize },
    RepeatedKeys { keys: Vec<String>, length: usize },
}

impl JsonPattern {
    pub fn length(&self) -> usize {
        match self {
            Self::Object { length } | Self::SchemaFields { length, .. } | Self::RepeatedKeys { length, .. } => {
                *length
            }
        }
    }
}

pub fn find_json_patterns(text: &str) -> Vec<JsonPattern> {
    let mut patterns: Vec<JsonPattern> = JSON_OBJECT
        .find_iter(text)
        .map(|m| JsonPattern::Object { length: m.as_str().chars().count() })
        .collect();

    let fields: Vec<usize> = SCHEMA_FIELD.find_iter(text).map(|m| m.as_str().chars().count()).collect();
    if fields.len() >= MIN_SCHEMA_FIELDS {
        patterns.push(JsonPattern::SchemaFields { count: fields.len(), length: fields.iter().sum() });
    }

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();
    for caps in QUOTED_KEY.captures_iter(text) {
        let Some(key) = caps.get(1) else { continue };
        let count = counts.entry(key.as_str()).or_default();
        if *count == 0 {
            order.push(key.as_str());
        }
        *count += 1;
    }
    let keys: Vec<String> = order
        .into_iter()
        .filter(|k| counts.get(k).is_some_and(|c| *c >= MIN_KEY_REPEATS))
        .map(str::to_string)
        .collect();
    if !keys.is_empty() {
        patterns.push(JsonPattern::RepeatedKeys { keys, length: text.chars().count() / 2 });
    }
    patterns
}

/// Estimated prompt tokens spent on JSON structure, and the share a compact
/// encoding would save.
pub fn estimate_savings(patterns: &[JsonPattern]) -> (usize, usize) {
    let chars: usize = patterns.iter().map(JsonPattern::length).sum();
    let tokens = chars / CHARS_PER_TOKEN;
    (tokens, tokens * PROMPT_SAVINGS_PERCENT / 100)
}

/// Distinct `{name}` placeholders, sorted.
pub fn placeholder_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = PLACEHOLDER
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect();
    names.sort();
    names.dedup();
    names
}
