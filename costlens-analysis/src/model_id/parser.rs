//! Pattern-based parser for inference model identifiers.
//!
//! Identifiers look like
//! `[region.]provider.family-<version>-<tier>-<date>-vN[:build]`, in any
//! order after the family. The parser recognises token shapes rather than
//! known model names, so new releases parse without changes here.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Region markers that route requests across several regions.
pub const REGION_PREFIXES: &[&str] = &["global", "us", "us-gov", "eu", "apac", "jp", "au", "ca"];

/// Tokens that describe a variant rather than a size/quality tier.
const GENERIC_TOKENS: &[&str] = &["instruct", "chat", "text", "embed", "embedding"];

/// How far a cross-region identifier spreads requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossRegionScope {
    /// Single-region identifier.
    None,
    /// The `global` marker: any commercial region.
    Global,
    /// A geography marker such as `us` or `eu`.
    Geographic,
}

impl CrossRegionScope {
    /// Wire label, `None` for single-region identifiers.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Global => Some("global"),
            Self::Geographic => Some("geography-specific"),
        }
    }
}

/// Decomposed model identifier. Fields that cannot be determined stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedModelId {
    pub provider: Option<String>,
    pub family: Option<String>,
    pub version: Option<String>,
    pub tier: Option<String>,
    pub region_prefix: Option<String>,
    /// Numeric `:N` suffix. Not part of the semantic version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

impl ParsedModelId {
    pub fn is_cross_region(&self) -> bool {
        self.region_prefix.is_some()
    }

    pub fn scope(&self) -> CrossRegionScope {
        match self.region_prefix.as_deref() {
            None => CrossRegionScope::None,
            Some("global") => CrossRegionScope::Global,
            Some(_) => CrossRegionScope::Geographic,
        }
    }

    /// `{provider, family, version, tier, region_prefix}` as JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "provider": self.provider,
            "family": self.family,
            "version": self.version,
            "tier": self.tier,
            "region_prefix": self.region_prefix,
        })
    }
}

/// Token shapes inside the family/version/tier blob.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// One or two digits: a version component.
    Component(&'a str),
    /// Parameter count such as `70b`; its number extends a version run.
    Size { number: &'a str, text: &'a str },
    /// `v1`, `v2`: an API revision.
    Revision(&'a str),
    /// Any longer digit run, typically a release date.
    Number,
    Word(&'a str),
}

fn classify(token: &str) -> Token<'_> {
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return Token::Number;
    }
    if bytes.iter().all(u8::is_ascii_digit) {
        return if bytes.len() <= 2 { Token::Component(token) } else { Token::Number };
    }
    if bytes.len() >= 2 && (bytes[0] == b'v' || bytes[0] == b'V') && bytes[1..].iter().all(u8::is_ascii_digit) {
        return Token::Revision(&token[1..]);
    }
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && digits < bytes.len() {
        let suffix = &token[digits..];
        if matches!(suffix.to_ascii_lowercase().as_str(), "b" | "k" | "m" | "t") {
            return Token::Size { number: &token[..digits], text: token };
        }
    }
    Token::Word(token)
}

/// Parse an identifier. Never fails: unknown shapes give partial results.
pub fn parse_model_id(identifier: &str) -> ParsedModelId {
    let mut parsed = ParsedModelId::default();
    let mut rest = identifier.trim();

    if let Some((head, tail)) = rest.rsplit_once(':') {
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            parsed.build = Some(tail.to_string());
            rest = head;
        }
    }

    let segment_count = rest.split('.').count();
    if let Some((head, tail)) = rest.split_once('.') {
        let marker = head.to_ascii_lowercase();
        if segment_count >= 3 && REGION_PREFIXES.contains(&marker.as_str()) {
            parsed.region_prefix = Some(marker);
            rest = tail;
        }
    }

    let blob = match rest.split_once('.') {
        Some((provider, blob)) => {
            if !provider.is_empty() {
                parsed.provider = Some(provider.to_ascii_lowercase());
            }
            blob
        }
        None => rest,
    };

    let mut tokens: Vec<&str> = blob.split(['-', '_']).filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return parsed;
    }

    // Family: leading letters of the first token. Trailing digits (`llama3`)
    // open the version run.
    let first = tokens.remove(0);
    let mut version: Vec<&str> = Vec::new();
    match classify(first) {
        Token::Revision(_) | Token::Component(_) | Token::Number | Token::Size { .. } => {
            // `deepseek.v3-v1`: the provider doubles as the family.
            parsed.family = parsed.provider.clone();
            tokens.insert(0, first);
        }
        Token::Word(word) => {
            let letters = word.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
            if letters == 0 {
                parsed.family = Some(word.to_ascii_lowercase());
            } else {
                parsed.family = Some(word[..letters].to_ascii_lowercase());
                let tail = &word[letters..];
                if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
                    version.push(tail);
                }
            }
        }
    }

    let mut tier: Option<String> = None;
    let mut size_tier: Option<String> = None;
    let mut revision: Option<&str> = None;
    let mut run_open = !version.is_empty();
    let mut run_closed = false;

    for token in tokens {
        let shape = classify(token);
        let extends_run = matches!(shape, Token::Component(_) | Token::Size { .. });
        if run_open && !extends_run {
            run_open = false;
            run_closed = true;
        }
        match shape {
            Token::Component(n) => {
                if !run_closed {
                    version.push(n);
                    run_open = true;
                }
            }
            Token::Size { number, text } => {
                if !run_closed {
                    version.push(number);
                    run_open = true;
                }
                if size_tier.is_none() {
                    size_tier = Some(text.to_ascii_lowercase());
                }
            }
            Token::Revision(n) => {
                if revision.is_none() {
                    revision = Some(n);
                }
            }
            Token::Number => {}
            Token::Word(word) => {
                let lower = word.to_ascii_lowercase();
                if tier.is_none() && !GENERIC_TOKENS.contains(&lower.as_str()) {
                    tier = Some(lower);
                }
            }
        }
    }

    parsed.version = if !version.is_empty() {
        Some(version.join("."))
    } else {
        revision.map(|n| match &parsed.build {
            Some(build) => format!("{n}.{build}"),
            None => n.to_string(),
        })
    };
    parsed.tier = tier.or(size_tier);
    parsed
}
