//! Static/dynamic classification of system prompts.
//!
//! Finds every value bound to a system-prompt name (`system_prompt=`,
//! `systemPrompt:`, `SYSTEM_PROMPT =`) and decides whether its text is fixed
//! when the code is written or varies per request. Recognised shapes:
//!
//! - plain literals and adjacent-literal concatenation, optionally wrapped in
//!   one pair of parentheses
//! - f-strings and template literals (`{name}`, `${name}`)
//! - `"...".format(args)` and `"..." % args`
//! - `+` concatenation
//! - a bare name, resolved through its assignment in the same document
//! - a call such as `render(user)` or `JSON.stringify(rows)`, dynamic when
//!   an argument is
//!
//! Anything else leaves the prompt static with [`Confidence::Low`] and an
//! indicator naming the unrecognised expression.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::false_positive::{in_block_comment, in_line_comment};
use crate::engine::lines::line_at;
use crate::engine::matcher::Matcher;
use crate::engine::string_extraction::{extract_strings, literal_end, ExtractedString, SourceFlavor};

/// Name resolution stops after this many hops.
const MAX_RESOLVE_DEPTH: u8 = 3;

/// Indicator snippets are cut to this many characters.
const SNIPPET_CHARS: usize = 40;

static SYSTEM_PROMPT_BINDING: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::new(r#"\b(?:system_prompt|systemPrompt|SYSTEM_PROMPT)\b(["']?)\s*([:=])"#)
});

static PROMPT_BINDING: LazyLock<Matcher> = LazyLock::new(|| Matcher::new(r#"\bprompt\b(["']?)\s*([:=])"#));

static LEADING_IDENT: LazyLock<Matcher> = LazyLock::new(|| Matcher::new(r"^[A-Za-z_$][\w$]*"));

static DOTTED_PATH: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"^[A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*)*"));

static IDENTIFIER: LazyLock<Matcher> = LazyLock::new(|| Matcher::new(r"[A-Za-z_$][\w$]*"));

/// Words that join operands rather than name values.
const OPERATOR_KEYWORDS: &[&str] = &["if", "else", "and", "or", "not", "in", "is", "for", "typeof", "instanceof"];

static NAME_PATH: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"^[A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*)*$"));

/// Type names that follow a `:` in annotations rather than being values.
const TYPE_NAMES: &[&str] = &["str", "string", "String", "Optional", "Any"];

/// How much to trust a [`PromptStaticness`] verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Verdict over every system-prompt binding in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptStaticness {
    pub is_static: bool,
    pub confidence: Confidence,
    /// Distinct, sorted base names of the non-constant expressions.
    pub dynamic_variables: Vec<String>,
    /// Human-readable evidence, in source order.
    pub indicators: Vec<String>,
    pub sites_found: usize,
    /// Line of the first non-constant value.
    pub dynamic_line: Option<u32>,
}

impl PromptStaticness {
    pub fn to_json(&self) -> Value {
        json!({
            "is_static": self.is_static,
            "confidence": self.confidence.name(),
            "indicators": self.indicators,
            "dynamic_variables": self.dynamic_variables,
        })
    }
}

/// Classify the system prompts of a Python document.
pub fn analyze_prompt_staticness(content: &str) -> PromptStaticness {
    analyze_prompt_staticness_with(content, SourceFlavor::Python)
}

/// Classify the system prompts of a document with the given comment/string syntax.
pub fn analyze_prompt_staticness_with(content: &str, flavor: SourceFlavor) -> PromptStaticness {
    let mut sites = binding_sites(content, &SYSTEM_PROMPT_BINDING, flavor);
    let mut fallback = false;
    if sites.is_empty() {
        sites = binding_sites(content, &PROMPT_BINDING, flavor);
        fallback = !sites.is_empty();
    }

    let mut evidence = Evidence::default();
    if sites.is_empty() {
        evidence.indicators.push("no system prompt assignment found".to_string());
    }
    for &value_start in &sites {
        let end = expression_end(content, value_start, flavor);
        let line = line_at(content, value_start);
        classify(content, &content[value_start..end], flavor, &mut evidence, 0, line);
    }

    let confidence = if sites.is_empty() || evidence.uncertain {
        Confidence::Low
    } else if fallback {
        Confidence::Medium
    } else {
        Confidence::High
    };

    PromptStaticness {
        is_static: evidence.variables.is_empty(),
        confidence,
        dynamic_variables: evidence.variables.into_iter().collect(),
        indicators: evidence.indicators,
        sites_found: sites.len(),
        dynamic_line: evidence.dynamic_line,
    }
}

#[derive(Default)]
struct Evidence {
    variables: BTreeSet<String>,
    indicators: Vec<String>,
    uncertain: bool,
    dynamic_line: Option<u32>,
}

impl Evidence {
    fn note(&mut self, line: u32, text: impl AsRef<str>) {
        self.indicators.push(format!("line {line}: {}", text.as_ref()));
    }

    fn record(&mut self, line: u32, variable: String) {
        if self.variables.insert(variable.clone()) {
            self.dynamic_line.get_or_insert(line);
            self.note(line, format!("dynamic value `{variable}`"));
        }
    }
}

/// Offsets where a bound value starts, skipping comments and comparisons.
fn binding_sites(content: &str, binding: &Matcher, flavor: SourceFlavor) -> Vec<usize> {
    let mut sites = Vec::new();
    for caps in binding.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if in_line_comment(content, whole.start()) || in_block_comment(content, whole.start()) {
            continue;
        }
        let quoted = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let sign = caps.get(2).map(|m| m.as_str()).unwrap_or("=");
        let mut value_start = whole.end();

        if sign == "=" && content[value_start..].starts_with('=') {
            continue;
        }
        if sign == ":" && !quoted {
            match annotation_default(content, value_start) {
                Some(after_eq) => value_start = after_eq,
                None if flavor == SourceFlavor::Python => continue,
                None => {}
            }
        }

        let value_start = skip_whitespace(content, value_start);
        if value_start >= content.len() {
            continue;
        }
        let head = LEADING_IDENT.find(&content[value_start..]).map(|m| m.as_str());
        if head.is_some_and(|h| TYPE_NAMES.contains(&h)) && sign == ":" {
            continue;
        }
        sites.push(value_start);
    }
    sites
}

/// For `name: Type = value`, the offset just past the `=`.
fn annotation_default(content: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' | b'"' | b'\'' | b'`' => return None,
            b'[' | b'(' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b')' if depth == 0 => return None,
            b')' => depth -= 1,
            b',' | b';' | b'{' if depth == 0 => return None,
            b'=' if depth == 0 => {
                return (bytes.get(i + 1) != Some(&b'=')).then_some(i + 1);
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn skip_whitespace(content: &str, mut pos: usize) -> usize {
    let bytes = content.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn is_quote(b: u8, flavor: SourceFlavor) -> bool {
    b == b'"' || b == b'\'' || (b == b'`' && flavor == SourceFlavor::CLike)
}

/// Visit every code byte of `text` outside string literals and comments.
///
/// `visit(offset, depth)` sees the bracket depth before the byte is applied
/// and returns `false` to stop the walk. Returns the offset of an
/// unterminated literal if the walk had to give up on one.
fn walk_code(text: &str, flavor: SourceFlavor, mut visit: impl FnMut(usize, usize) -> bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if is_quote(b, flavor) {
            match literal_end(text, i, flavor) {
                Some(end) => {
                    i = end;
                    continue;
                }
                None => return Some(i),
            }
        }
        if !visit(i, depth) {
            return None;
        }
        let comment = match flavor {
            SourceFlavor::CLike => b == b'/' && bytes.get(i + 1) == Some(&b'/'),
            _ => b == b'#',
        };
        if comment {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// End of the expression starting at `start`: the first top-level
/// separator, closing bracket, comment, or line break that does not
/// continue the expression.
fn expression_end(content: &str, start: usize, flavor: SourceFlavor) -> usize {
    let text = &content[start..];
    let bytes = text.as_bytes();
    let mut end = None;
    let unterminated = walk_code(text, flavor, |i, depth| {
        if depth > 0 {
            return true;
        }
        let stop = match bytes[i] {
            b',' | b';' | b')' | b']' | b'}' => true,
            b'#' => flavor != SourceFlavor::CLike,
            b'/' => flavor == SourceFlavor::CLike && bytes.get(i + 1) == Some(&b'/'),
            b'\n' => !continues_on_next_line(text, i),
            _ => false,
        };
        if stop {
            end = Some(i);
        }
        !stop
    });
    let end = match (end, unterminated) {
        (Some(end), _) => end,
        (None, Some(quote)) => text[quote..].find('\n').map_or(text.len(), |n| quote + n),
        (None, None) => text.len(),
    };
    start + end
}

/// A line break inside an expression: after a trailing `\` or `+`, or before
/// a leading `+` or `.`.
fn continues_on_next_line(text: &str, newline: usize) -> bool {
    let before = text[..newline].trim_end();
    if before.ends_with('\\') || before.ends_with('+') {
        return true;
    }
    let after = text[newline..].trim_start();
    after.starts_with('+') || after.starts_with('.')
}

/// Index of the bracket closing the one at `open`.
fn closing_bracket(text: &str, open: usize, flavor: SourceFlavor) -> Option<usize> {
    let tail = &text[open..];
    let bytes = tail.as_bytes();
    let mut found = None;
    let _ = walk_code(tail, flavor, |i, depth| {
        if i > 0 && depth == 1 && matches!(bytes[i], b')' | b']' | b'}') {
            found = Some(open + i);
            return false;
        }
        true
    });
    found
}

/// Split at top-level occurrences of `sep`.
fn split_top_level(text: &str, sep: u8, flavor: SourceFlavor) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut cuts = Vec::new();
    let _ = walk_code(text, flavor, |i, depth| {
        if depth == 0 && bytes[i] == sep {
            cuts.push(i);
        }
        true
    });
    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut from = 0;
    for cut in cuts {
        parts.push(&text[from..cut]);
        from = cut + 1;
    }
    parts.push(&text[from..]);
    parts
}

fn strip_wrapping_parens(mut text: &str, flavor: SourceFlavor) -> &str {
    loop {
        text = text.trim();
        if !text.starts_with('(') || closing_bracket(text, 0, flavor) != Some(text.len() - 1) {
            return text;
        }
        text = &text[1..text.len() - 1];
    }
}

/// `receiver.format(args)` spanning the whole expression.
fn split_format_call(expr: &str, flavor: SourceFlavor) -> Option<(&str, &str)> {
    const CALL: &str = ".format(";
    let bytes = expr.as_bytes();
    let mut candidate = None;
    let _ = walk_code(expr, flavor, |i, depth| {
        if depth == 0 && bytes[i..].starts_with(CALL.as_bytes()) {
            candidate = Some(i);
        }
        true
    });
    let at = candidate?;
    let open = at + CALL.len() - 1;
    if closing_bracket(expr, open, flavor)? != expr.len() - 1 {
        return None;
    }
    Some((&expr[..at], &expr[open + 1..expr.len() - 1]))
}

fn classify(content: &str, expr: &str, flavor: SourceFlavor, ev: &mut Evidence, depth: u8, line: u32) {
    let expr = strip_wrapping_parens(expr, flavor);
    if expr.is_empty() {
        ev.uncertain = true;
        ev.note(line, "empty prompt value");
        return;
    }
    if is_constant_token(expr) {
        ev.note(line, "constant value");
        return;
    }

    if let Some((receiver, args)) = split_format_call(expr, flavor) {
        ev.note(line, "template filled with .format()");
        if !receiver_is_literal(receiver, flavor) {
            record_expression(receiver, ev, line);
        }
        for arg in split_top_level(args, b',', flavor) {
            record_expression(arg, ev, line);
        }
        return;
    }

    let strings = extract_strings(expr, flavor);
    let residue = code_outside_literals(expr, &strings, flavor);

    if !strings.is_empty() && residue.trim().is_empty() {
        let note = match (strings.len(), strings.iter().any(ExtractedString::is_template)) {
            (1, false) => "plain literal",
            (1, true) => "interpolated string",
            (_, false) => "adjacent literal concatenation",
            (_, true) => "adjacent literals with interpolation",
        };
        ev.note(line, note);
        for s in &strings {
            record_placeholders(expr, s, ev, line);
        }
        return;
    }

    if let Some(first) = strings.first() {
        let after = expr[first.end..].trim_start();
        if first.start == 0 && after.starts_with('%') {
            ev.note(line, "%-style formatting");
            let args = strip_wrapping_parens(&after[1..], flavor);
            for arg in split_top_level(args, b',', flavor) {
                record_expression(arg, ev, line);
            }
            return;
        }
    }

    let operands = split_top_level(expr, b'+', flavor);
    if operands.len() > 1 {
        ev.note(line, "string concatenation");
        for operand in operands {
            let operand = strip_wrapping_parens(operand, flavor);
            let parts = extract_strings(operand, flavor);
            match parts.as_slice() {
                [only] if only.start == 0 && only.end == operand.len() => {
                    record_placeholders(operand, only, ev, line)
                }
                _ => {
                    record_expression(operand, ev, line);
                }
            }
        }
        return;
    }

    if NAME_PATH.is_match(expr) {
        resolve_name(content, expr, flavor, ev, depth, line);
        return;
    }

    if let Some(args) = whole_call_arguments(expr, flavor) {
        ev.note(line, format!("value returned by `{}`", snippet(expr)));
        let mut dynamic = false;
        for arg in split_top_level(args, b',', flavor) {
            dynamic |= record_expression(arg, ev, line);
        }
        if !dynamic {
            ev.uncertain = true;
        }
        return;
    }

    ev.uncertain = true;
    ev.note(line, format!("unrecognized prompt construction `{}`", snippet(expr)));
}

/// Argument text of `callee(args)` when the call spans the whole expression.
fn whole_call_arguments(expr: &str, flavor: SourceFlavor) -> Option<&str> {
    let path = DOTTED_PATH.find(expr)?;
    let open = path.end() + (expr[path.end()..].len() - expr[path.end()..].trim_start().len());
    if expr.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    if closing_bracket(expr, open, flavor)? != expr.len() - 1 {
        return None;
    }
    Some(&expr[open + 1..expr.len() - 1])
}

fn receiver_is_literal(receiver: &str, flavor: SourceFlavor) -> bool {
    let receiver = strip_wrapping_parens(receiver, flavor);
    let strings = extract_strings(receiver, flavor);
    !strings.is_empty() && code_outside_literals(receiver, &strings, flavor).trim().is_empty()
}

/// `expr` with every literal span and comment removed.
fn code_outside_literals(expr: &str, strings: &[ExtractedString], flavor: SourceFlavor) -> String {
    let mut code = String::new();
    let mut from = 0;
    for s in strings {
        code.push_str(&expr[from..s.start]);
        code.push(' ');
        from = s.end;
    }
    code.push_str(&expr[from..]);

    let marker = if flavor == SourceFlavor::CLike { "//" } else { "#" };
    code.lines()
        .map(|line| line.split(marker).next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Follow a bare name to its assignment in the same document.
fn resolve_name(content: &str, path: &str, flavor: SourceFlavor, ev: &mut Evidence, depth: u8, line: u32) {
    let compact: String = path.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains('.') {
        let leaf = compact.rsplit('.').next().unwrap_or_default();
        if is_constant_name(leaf) {
            ev.note(line, format!("constant attribute `{compact}`"));
        } else {
            ev.uncertain = true;
            ev.note(line, format!("value read from attribute `{compact}`"));
        }
        return;
    }
    if depth >= MAX_RESOLVE_DEPTH {
        ev.uncertain = true;
        ev.note(line, format!("`{compact}` not followed further"));
        return;
    }

    match find_assignment(content, &compact, flavor) {
        Some(value_start) => {
            let end = expression_end(content, value_start, flavor);
            let target_line = line_at(content, value_start);
            ev.note(line, format!("`{compact}` assigned on line {target_line}"));
            classify(content, &content[value_start..end], flavor, ev, depth + 1, target_line);
        }
        None => {
            ev.uncertain = true;
            ev.note(line, format!("`{compact}` could not be resolved"));
        }
    }
}

/// Value offset of the first line-leading `name = value` whose value is not
/// `name` itself.
fn find_assignment(content: &str, name: &str, flavor: SourceFlavor) -> Option<usize> {
    let pattern = format!(
        r"(?m)^[ \t]*(?:(?:export\s+)?(?:const|let|var)\s+)?{}\b[ \t]*(?::[^=\n]*)?=[^=]",
        regex::escape(name)
    );
    let assignment = Matcher::new(&pattern);
    for m in assignment.find_iter(content) {
        if in_block_comment(content, m.start()) {
            continue;
        }
        let Some(eq) = m.as_str().rfind('=') else { continue };
        let value_start = skip_whitespace(content, m.start() + eq + 1);
        if value_start >= content.len() {
            continue;
        }
        let end = expression_end(content, value_start, flavor);
        if content[value_start..end].trim() == name {
            continue;
        }
        return Some(value_start);
    }
    None
}

fn record_placeholders(expr: &str, s: &ExtractedString, ev: &mut Evidence, line: u32) {
    if !s.is_template() {
        return;
    }
    let inners = if expr.as_bytes().get(s.start) == Some(&b'`') {
        template_placeholders(&s.value)
    } else {
        fstring_placeholders(&s.value)
    };
    for inner in inners {
        if let Some(var) = placeholder_variable(inner) {
            ev.record(line, var);
        }
    }
}

/// Records the variable `expr` reads, if any. Returns whether it found one.
fn record_expression(expr: &str, ev: &mut Evidence, line: u32) -> bool {
    let mut expr = expr.trim().trim_start_matches('*').trim_start_matches("...");
    if let Some(ident) = LEADING_IDENT.find(expr) {
        let rest = expr[ident.end()..].trim_start();
        if rest.starts_with('=') && !rest.starts_with("==") {
            expr = rest[1..].trim_start();
        }
    }
    match expression_variable(expr) {
        Some(var) => {
            ev.record(line, var);
            true
        }
        None => false,
    }
}

/// Bodies of `{...}` in an f-string, skipping doubled braces.
fn fstring_placeholders(value: &str) -> Vec<&str> {
    let bytes = value.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => i += 2,
            b'}' if bytes.get(i + 1) == Some(&b'}') => i += 2,
            b'{' => match brace_close(value, i) {
                Some(close) => {
                    out.push(&value[i + 1..close]);
                    i = close + 1;
                }
                None => break,
            },
            _ => i += 1,
        }
    }
    out
}

/// Bodies of `${...}` in a template literal.
fn template_placeholders(value: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut from = 0usize;
    while let Some(rel) = value[from..].find("${") {
        let open = from + rel + 1;
        match brace_close(value, open) {
            Some(close) => {
                out.push(&value[open + 1..close]);
                from = close + 1;
            }
            None => break,
        }
    }
    out
}

fn brace_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// The variable a placeholder reads, or `None` for constants and JSON-like
/// illustrations (`{"key": value}`).
fn placeholder_variable(inner: &str) -> Option<String> {
    let inner = inner.trim();
    if (inner.starts_with('"') || inner.starts_with('\'')) && inner.contains(':') {
        return None;
    }
    let expr = strip_format_spec(inner);
    let expr = expr.trim_end().strip_suffix('=').unwrap_or(expr).trim();
    expression_variable(expr)
}

/// Drop a top-level `!conversion` or `:format_spec`.
fn strip_format_spec(inner: &str) -> &str {
    let mut depth = 0usize;
    for (i, b) in inner.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => return &inner[..i],
            b'!' if depth == 0 && inner.as_bytes().get(i + 1) != Some(&b'=') => return &inner[..i],
            _ => {}
        }
    }
    inner
}

/// Base name of a non-constant expression. Attribute chains reduce to their
/// base identifier; calls report their first argument when it has one and
/// the callee's base name otherwise. An `ALL_CAPS` name is a constant only
/// as a bare name or a chain of `ALL_CAPS` attributes.
fn expression_variable(expr: &str) -> Option<String> {
    let expr = expr.trim();
    if expr.is_empty() || is_constant_token(expr) {
        return None;
    }
    let path = DOTTED_PATH.find(expr)?;
    let base = LEADING_IDENT.find(expr)?.as_str();
    let rest = expr[path.end()..].trim_start();

    if rest.starts_with('(') {
        if let Some(var) = first_argument(rest).and_then(expression_variable) {
            return Some(var);
        }
        return Some(base.to_string());
    }

    let constant_path = path.as_str().split('.').all(|segment| is_constant_name(segment.trim()));
    if is_constant_token(base) || constant_path {
        return operand_variable(rest);
    }
    Some(base.to_string())
}

/// First top-level argument of the call list opening at `args[0]`.
fn first_argument(args: &str) -> Option<&str> {
    let bytes = args.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q && bytes.get(i.wrapping_sub(1)) != Some(&b'\\') {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&args[1..i]);
                }
            }
            b',' if depth == 1 => return Some(&args[1..i]),
            _ => {}
        }
    }
    args.get(1..)
}

/// First non-constant identifier in the operator tail of a constant
/// (`MAX_ITEMS * count` reads `count`).
fn operand_variable(rest: &str) -> Option<String> {
    let code = strip_quoted(rest);
    let found = IDENTIFIER.find_iter(&code).find_map(|m| {
        let name = m.as_str();
        let after_dot = code[..m.start()].trim_end().ends_with('.');
        let skip = after_dot
            || is_constant_token(name)
            || is_constant_name(name)
            || OPERATOR_KEYWORDS.contains(&name);
        (!skip).then(|| name.to_string())
    });
    found
}

/// `text` with the bodies of quoted strings blanked out.
fn strip_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                out.push(' ');
            }
            None => {
                if matches!(c, '"' | '\'' | '`') {
                    quote = Some(c);
                    out.push(' ');
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}

fn is_constant_token(text: &str) -> bool {
    matches!(
        text,
        "None" | "True" | "False" | "null" | "undefined" | "true" | "false" | "\"\"" | "''"
    ) || text.parse::<f64>().is_ok()
}

/// `ALL_CAPS` names are treated as module constants.
fn is_constant_name(name: &str) -> bool {
    name.bytes().any(|b| b.is_ascii_uppercase()) && !name.bytes().any(|b| b.is_ascii_lowercase())
}

fn snippet(expr: &str) -> String {
    let flat: String = expr.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_ends_at_top_level_comma() {
        let src = r#"system_prompt=f"a {b}, c", tools=[]"#;
        let start = src.find('f').unwrap();
        let end = expression_end(src, start, SourceFlavor::Python);
        assert_eq!(&src[start..end], r#"f"a {b}, c""#);
    }

    #[test]
    fn expression_spans_parenthesised_lines() {
        let src = "x = (\n  \"a\"  # note, with comma\n  \"b\"\n)\ny = 1\n";
        let start = src.find('(').unwrap();
        let end = expression_end(src, start, SourceFlavor::Python);
        assert!(src[start..end].ends_with(')'));
    }

    #[test]
    fn placeholders_skip_doubled_braces() {
        let value = r#"{{"k": 1}} {name!r} {count:>4} {user.id}"#;
        let found: Vec<_> = fstring_placeholders(value)
            .into_iter()
            .filter_map(placeholder_variable)
            .collect();
        assert_eq!(found, vec!["name", "count", "user"]);
    }

    #[test]
    fn template_placeholders_found() {
        assert_eq!(template_placeholders("a ${role} b ${ctx.x}"), vec!["role", "ctx.x"]);
    }

    #[test]
    fn constants_are_not_variables() {
        assert_eq!(expression_variable("MAX_ITEMS"), None);
        assert_eq!(expression_variable("42"), None);
        assert_eq!(expression_variable("len(items)"), Some("items".to_string()));
        assert_eq!(expression_variable("now()"), Some("now".to_string()));
    }

    #[test]
    fn capitalised_receivers_do_not_hide_arguments() {
        assert_eq!(expression_variable("JSON.stringify(rows)"), Some("rows".to_string()));
        assert_eq!(expression_variable("CONFIG.get(\"a,b\", user)"), Some("CONFIG".to_string()));
        assert_eq!(expression_variable("SETTINGS.LIMIT"), None);
        assert_eq!(expression_variable("MAX_ITEMS + 'x' + n"), Some("n".to_string()));
        assert_eq!(first_argument("(f(a, b), c)"), Some("f(a, b)"));
    }

    #[test]
    fn annotation_default_is_skipped_to() {
        let src = "system_prompt: str = \"hello\"\n";
        let colon = src.find(':').unwrap() + 1;
        let after = annotation_default(src, colon).unwrap();
        assert_eq!(src[after..].trim_start(), "\"hello\"\n");
    }
}
