//! Traversal state for one Python file: enclosing functions, loop nesting,
//! call counts, and prompt builder candidates.

use costlens_core::constants::CHARS_PER_TOKEN;
use costlens_core::FxHashMap;
use tree_sitter::Node;

use crate::engine::visitor::{collect_kind, node_line, node_text, SyntaxVisitor};

/// Dotted call paths recognised as inference calls (substring match).
const LLM_CALLS: &[&str] = &[
    "bedrock.converse",
    "bedrock_runtime.converse",
    "bedrock.invoke_model",
    "bedrock_runtime.invoke_model",
    "openai.chat.completions.create",
    "anthropic.messages.create",
];

const BUILDER_WORDS: &[&str] = &["prompt", "message", "instruction"];
const BUILDER_PREFIXES: &[&str] = &["build_", "create_", "format_", "generate_"];

/// Plain literals longer than this mark a function as building prompts.
const LARGE_LITERAL_CHARS: usize = 100;

pub fn is_prompt_builder_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    BUILDER_WORDS.iter().any(|w| lower.contains(w))
        || BUILDER_PREFIXES.iter().any(|p| lower.starts_with(p))
}

pub fn is_llm_call(path: &str) -> bool {
    LLM_CALLS.iter().any(|p| path.contains(p))
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    pub name: String,
    pub line: u32,
    pub static_chars: usize,
    pub has_dynamic_content: bool,
    pub uses_f_string: bool,
    pub uses_concatenation: bool,
}

impl PromptBuilder {
    pub fn estimated_static_tokens(&self) -> usize {
        self.static_chars / CHARS_PER_TOKEN
    }
}

#[derive(Debug, Clone)]
pub struct LoopCall {
    pub function: String,
    pub loop_type: &'static str,
    pub api_call: String,
    pub line: u32,
}

#[derive(Default)]
pub struct PromptAnalyzer {
    pub builders: Vec<PromptBuilder>,
    pub loop_calls: Vec<LoopCall>,
    /// Calls by simple callee name: `f` for `f()`, `m` for `obj.m()`.
    calls: FxHashMap<String, usize>,
    functions: Vec<String>,
    /// Innermost last. Not reset at function boundaries.
    loops: Vec<&'static str>,
}

impl PromptAnalyzer {
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.get(name).copied().unwrap_or(0)
    }

    fn record_builder(&mut self, builder: PromptBuilder) {
        match self.builders.iter_mut().find(|b| b.name == builder.name) {
            Some(existing) => *existing = builder,
            None => self.builders.push(builder),
        }
    }

    fn record_call(&mut self, node: &Node<'_>, source: &[u8]) {
        let Some(function) = node.child_by_field_name("function") else { return };
        let Some((path, simple)) = call_path(&function, source) else { return };
        *self.calls.entry(simple).or_default() += 1;

        if !is_llm_call(&path) {
            return;
        }
        let (Some(enclosing), Some(loop_type)) = (self.functions.last(), self.loops.last()) else {
            return;
        };
        if self.loop_calls.iter().any(|c| &c.function == enclosing) {
            return;
        }
        self.loop_calls.push(LoopCall {
            function: enclosing.clone(),
            loop_type: *loop_type,
            api_call: path,
            line: node_line(node),
        });
    }
}

impl SyntaxVisitor for PromptAnalyzer {
    fn on_enter(&mut self, node: &Node<'_>, source: &[u8]) {
        match node.kind() {
            "function_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(&n, source).to_string())
                    .unwrap_or_default();
                if is_prompt_builder_name(&name) {
                    if let Some(builder) = analyze_builder(node, &name, source) {
                        self.record_builder(builder);
                    }
                }
                self.functions.push(name);
            }
            "for_statement" => self.loops.push("for"),
            "while_statement" => self.loops.push("while"),
            "call" => self.record_call(node, source),
            _ => {}
        }
    }

    fn on_exit(&mut self, node: &Node<'_>, _source: &[u8]) {
        match node.kind() {
            "function_definition" => {
                self.functions.pop();
            }
            "for_statement" | "while_statement" => {
                self.loops.pop();
            }
            _ => {}
        }
    }
}

/// Dotted path of a callee and its simple name. A path rooted in something
/// other than a name (`f().g`) keeps only the attribute chain.
fn call_path(function: &Node<'_>, source: &[u8]) -> Option<(String, String)> {
    match function.kind() {
        "identifier" => {
            let name = node_text(function, source).to_string();
            Some((name.clone(), name))
        }
        "attribute" => {
            let simple = node_text(&function.child_by_field_name("attribute")?, source).to_string();
            let mut parts = Vec::new();
            let mut current = *function;
            while current.kind() == "attribute" {
                if let Some(attr) = current.child_by_field_name("attribute") {
                    parts.push(node_text(&attr, source));
                }
                match current.child_by_field_name("object") {
                    Some(object) => current = object,
                    None => break,
                }
            }
            if current.kind() == "identifier" {
                parts.push(node_text(&current, source));
            }
            parts.reverse();
            Some((parts.join("."), simple))
        }
        _ => None,
    }
}

/// String-building shape of a candidate function, or `None` when it neither
/// builds strings nor carries static text.
fn analyze_builder(function: &Node<'_>, name: &str, source: &[u8]) -> Option<PromptBuilder> {
    let mut builder = PromptBuilder {
        name: name.to_string(),
        line: node_line(function),
        static_chars: 0,
        has_dynamic_content: false,
        uses_f_string: false,
        uses_concatenation: false,
    };
    let mut has_large_literal = false;

    for node in collect_kind(*function, &["string", "binary_operator"]) {
        if node.kind() == "binary_operator" {
            let is_add = node.child_by_field_name("operator").is_some_and(|op| op.kind() == "+");
            let literal_operand = ["left", "right"]
                .iter()
                .filter_map(|f| node.child_by_field_name(f))
                .any(|operand| is_constant(&operand, source));
            if is_add && literal_operand {
                builder.uses_concatenation = true;
            }
            continue;
        }

        let prefix = string_prefix(&node, source);
        if prefix.contains('b') {
            continue;
        }
        let mut cursor = node.walk();
        let parts: Vec<Node<'_>> = node.children(&mut cursor).collect();
        if prefix.contains('f') {
            builder.uses_f_string = true;
            for part in &parts {
                match part.kind() {
                    "string_content" => {
                        let chars = content_chars(part, source);
                        builder.static_chars += chars;
                        has_large_literal |= chars > LARGE_LITERAL_CHARS;
                    }
                    "interpolation" => builder.has_dynamic_content = true,
                    _ => {}
                }
            }
        } else {
            let chars: usize = parts
                .iter()
                .filter(|p| p.kind() == "string_content")
                .map(|p| content_chars(p, source))
                .sum();
            has_large_literal |= chars > LARGE_LITERAL_CHARS;
        }
    }

    let builds = builder.uses_f_string || builder.uses_concatenation || has_large_literal;
    (builds && builder.estimated_static_tokens() > 0).then_some(builder)
}

/// Lowercased prefix letters of a string literal (`f`, `rb`, ...).
fn string_prefix(string: &Node<'_>, source: &[u8]) -> String {
    string
        .child(0)
        .filter(|c| c.kind() == "string_start")
        .map(|c| {
            node_text(&c, source)
                .chars()
                .take_while(|ch| ch.is_ascii_alphabetic())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .unwrap_or_default()
}

/// Characters of a `string_content` node, counting each escape as one.
fn content_chars(content: &Node<'_>, source: &[u8]) -> usize {
    let raw = node_text(content, source).chars().count();
    let mut cursor = content.walk();
    let escapes: usize = content
        .children(&mut cursor)
        .filter(|c| matches!(c.kind(), "escape_sequence" | "escape_interpolation"))
        .map(|c| node_text(&c, source).chars().count().saturating_sub(1))
        .sum();
    raw.saturating_sub(escapes)
}

fn is_constant(node: &Node<'_>, source: &[u8]) -> bool {
    match node.kind() {
        "integer" | "float" | "true" | "false" | "none" => true,
        "string" => !string_prefix(node, source).contains('f'),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let mut parts = node.named_children(&mut cursor);
            parts.all(|s| s.kind() == "string" && !string_prefix(&s, source).contains('f'))
        }
        _ => false,
    }
}
