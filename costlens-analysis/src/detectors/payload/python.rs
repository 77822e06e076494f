//! Syntax-tree pass over Python sources: serialisation calls, inference calls,
//! dict-producing comprehensions, and agent system prompts.

use tree_sitter::Node;

use crate::engine::visitor::{node_line, node_text, SyntaxVisitor};

/// Dotted call paths recognised as inference calls (substring match).
pub const LLM_CALLS: &[&str] = &[
    "bedrock.converse",
    "bedrock_runtime.converse",
    "bedrock.invoke_model",
    "bedrock_runtime.invoke_model",
    "bedrock_agentcore.invoke_agent_runtime",
    "invoke_agent_runtime",
    "openai.chat.completions.create",
    "anthropic.messages.create",
];

pub fn is_llm_call(path: &str) -> bool {
    LLM_CALLS.iter().any(|p| path.contains(p))
}

#[derive(Debug, Clone)]
pub struct Serialization {
    pub line: u32,
    pub call: String,
    /// Name the result is assigned to, if any.
    pub target: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PromptText {
    pub line: u32,
    pub text: String,
}

#[derive(Default)]
pub struct PayloadAnalyzer {
    pub serializations: Vec<Serialization>,
    pub llm_call_lines: Vec<u32>,
    pub dict_comprehension_lines: Vec<u32>,
    pub system_prompts: Vec<PromptText>,
}

impl SyntaxVisitor for PayloadAnalyzer {
    fn on_enter(&mut self, node: &Node<'_>, source: &[u8]) {
        match node.kind() {
            "call" => self.visit_call(node, source),
            "list_comprehension" => {
                if node.child_by_field_name("body").is_some_and(|b| b.kind() == "dictionary") {
                    self.dict_comprehension_lines.push(node_line(node));
                }
            }
            _ => {}
        }
    }
}

impl PayloadAnalyzer {
    fn visit_call(&mut self, node: &Node<'_>, source: &[u8]) {
        let Some(path) = node.child_by_field_name("function").and_then(|f| dotted_name(&f, source)) else {
            return;
        };

        if path.contains("json.dumps") || path.contains("to_json") {
            self.serializations.push(Serialization {
                line: node_line(node),
                call: path.clone(),
                target: assignment_target(node, source),
            });
        }
        if is_llm_call(&path) {
            self.llm_call_lines.push(node_line(node));
        }
        if path.contains("Agent") {
            if let Some(text) = keyword_string(node, "system_prompt", source) {
                self.system_prompts.push(PromptText { line: node_line(node), text });
            }
        }
    }
}

fn dotted_name(function: &Node<'_>, source: &[u8]) -> Option<String> {
    match function.kind() {
        "identifier" => Some(node_text(function, source).to_string()),
        "attribute" => {
            let mut parts = Vec::new();
            let mut current = *function;
            while current.kind() == "attribute" {
                parts.push(node_text(&current.child_by_field_name("attribute")?, source));
                current = current.child_by_field_name("object")?;
            }
            if current.kind() == "identifier" {
                parts.push(node_text(&current, source));
            }
            parts.reverse();
            Some(parts.join("."))
        }
        _ => None,
    }
}

/// `x` in `x = call(...)`.
fn assignment_target(call: &Node<'_>, source: &[u8]) -> Option<String> {
    let parent = call.parent().filter(|p| p.kind() == "assignment")?;
    let left = parent.child_by_field_name("left").filter(|l| l.kind() == "identifier")?;
    Some(node_text(&left, source).to_string())
}

fn keyword_string(call: &Node<'_>, keyword: &str, source: &[u8]) -> Option<String> {
    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let found = arguments
        .named_children(&mut cursor)
        .filter(|arg| arg.kind() == "keyword_argument")
        .find(|arg| {
            arg.child_by_field_name("name")
                .is_some_and(|n| node_text(&n, source) == keyword)
        })?;
    string_value(&found.child_by_field_name("value")?, source)
}

/// Text of a string expression. Interpolations become `{name}` or `{...}`;
/// `+` joins two string operands.
pub fn string_value(node: &Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => Some(literal_text(node, source)),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let text = node
                .named_children(&mut cursor)
                .filter(|s| s.kind() == "string")
                .map(|s| literal_text(&s, source))
                .collect();
            Some(text)
        }
        "binary_operator" => {
            let is_add = node.child_by_field_name("operator").is_some_and(|op| op.kind() == "+");
            if !is_add {
                return None;
            }
            let left = string_value(&node.child_by_field_name("left")?, source)?;
            let right = string_value(&node.child_by_field_name("right")?, source)?;
            (!left.is_empty() && !right.is_empty()).then(|| left + &right)
        }
        "parenthesized_expression" => string_value(&node.named_child(0)?, source),
        _ => None,
    }
}

fn literal_text(string: &Node<'_>, source: &[u8]) -> String {
    let mut out = String::new();
    let mut cursor = string.walk();
    for part in string.children(&mut cursor) {
        match part.kind() {
            "string_content" => push_content(&part, source, &mut out),
            "interpolation" => match part.child_by_field_name("expression") {
                Some(expr) if expr.kind() == "identifier" => {
                    out.push('{');
                    out.push_str(node_text(&expr, source));
                    out.push('}');
                }
                _ => out.push_str("{...}"),
            },
            _ => {}
        }
    }
    out
}

/// Appends a `string_content` node, decoding common escapes.
fn push_content(content: &Node<'_>, source: &[u8], out: &mut String) {
    let mut pos = content.start_byte();
    let mut cursor = content.walk();
    for escape in content.children(&mut cursor) {
        if !matches!(escape.kind(), "escape_sequence" | "escape_interpolation") {
            continue;
        }
        out.push_str(text_between(source, pos, escape.start_byte()));
        let raw = node_text(&escape, source);
        match raw {
            "\\n" => out.push('\n'),
            "\\t" => out.push('\t'),
            "\\\"" => out.push('"'),
            "\\'" => out.push('\''),
            "\\\\" => out.push('\\'),
            "{{" => out.push('{'),
            "}}" => out.push('}'),
            other => out.push_str(other),
        }
        pos = escape.end_byte();
    }
    out.push_str(text_between(source, pos, content.end_byte()));
}

fn text_between(source: &[u8], start: usize, end: usize) -> &str {
    source
        .get(start..end)
        .and_then(|b| std::str::from_utf8(b).ok())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::visitor::walk;
    use crate::parsers::parse_python;

    fn analyze(src: &str) -> PayloadAnalyzer {
        let tree = parse_python(src).expect("valid python");
        let mut analyzer = PayloadAnalyzer::default();
        walk(tree.root_node(), src.as_bytes(), &mut analyzer);
        analyzer
    }

    #[test]
    fn serialization_target_is_recorded() {
        let a = analyze("payload = json.dumps(rows)\njson.dumps(x)\n");
        assert_eq!(a.serializations.len(), 2);
        assert_eq!(a.serializations[0].target.as_deref(), Some("payload"));
        assert_eq!(a.serializations[1].target, None);
    }

    #[test]
    fn system_prompt_text_is_decoded() {
        let src = "agent = Agent(model=m, system_prompt=\"Reply with \\\"id\\\" \" + f\"for {user}\")\n";
        let a = analyze(src);
        assert_eq!(a.system_prompts[0].text, "Reply with \"id\" for {user}");
    }

    #[test]
    fn dict_comprehension_is_found() {
        let a = analyze("rows = [{\"id\": r.id} for r in records]\nids = [r.id for r in records]\n");
        assert_eq!(a.dict_comprehension_lines, vec![1]);
    }
}
