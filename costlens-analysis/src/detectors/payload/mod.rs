//! Payload-shape detector: JSON sent to models where a value-separated
//! compact encoding (VSC) would use far fewer tokens.

mod json_text;
mod python;

use std::path::Path;

use costlens_core::constants::NEAR_CALL_LINE_WINDOW;
use costlens_core::{Finding, FindingKind, Remediation, Service};
use serde_json::json;

use self::json_text::{estimate_savings, find_json_patterns, placeholder_names};
use self::python::{PayloadAnalyzer, LLM_CALLS};
use super::traits::Detector;
use crate::engine::visitor::walk;
use crate::parsers::language::has_extension;
use crate::parsers::{parse_python, Language};

const TECHNIQUE: &str = "VSC (Values Separated by Comma)";

/// Flat estimate for one serialised payload; its size is unknown statically.
const SERIALIZED_PAYLOAD_TOKENS: usize = 100;
/// Share of a serialised payload's tokens the compact encoding saves, in percent.
const PAYLOAD_SAVINGS_PERCENT: usize = 65;

/// Variable-name fragments that suggest structured data.
const JSON_NAME_HINTS: &[&str] = &["json", "data", "payload", "schema", "config"];

const VSC_PAYLOAD_EXAMPLE: &str = "\
# JSON (89 tokens):
{\"users\": [{\"id\": 1, \"name\": \"Alice\", \"role\": \"admin\"}, {\"id\": 2, \"name\": \"Bob\", \"role\": \"user\"}]}

# VSC (22 tokens):
1,Alice,admin
2,Bob,user
";

const VSC_SCHEMA_EXAMPLE: &str = "\
# JSON schema in prompt:
{\"service\": \"string\", \"cycle\": \"string\", \"lts\": \"bool\", \"releaseDate\": \"YYYY-MM-DD\", \"eol\": \"YYYY-MM-DD\"}

# VSC header in prompt:
service,cycle,lts,releaseDate,eol
";

pub struct PayloadDetector;

impl PayloadDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PayloadDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for PayloadDetector {
    fn id(&self) -> &str {
        "payload"
    }

    fn service(&self) -> Service {
        Service::Generic
    }

    fn can_analyze(&self, path: &Path) -> bool {
        has_extension(path, &["py", "js", "ts", "jsx", "tsx"])
    }

    fn analyze(&self, content: &str, file: &str) -> Vec<Finding> {
        match Language::from_path(Path::new(file)) {
            Some(Language::Python) => analyze_python(content, file),
            Some(lang) if lang.is_ecmascript() => analyze_script(content, file),
            _ => Vec::new(),
        }
    }
}

fn near(a: u32, b: u32) -> bool {
    a.abs_diff(b) <= NEAR_CALL_LINE_WINDOW
}

/// `JSON.stringify` lines within the window of a line naming an inference call.
fn analyze_script(content: &str, file: &str) -> Vec<Finding> {
    let mut stringify_lines = Vec::new();
    let mut llm_lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let number = idx as u32 + 1;
        if line.contains("JSON.stringify") {
            stringify_lines.push(number);
        }
        if LLM_CALLS.iter().any(|p| line.contains(p)) {
            llm_lines.push(number);
        }
    }

    stringify_lines
        .into_iter()
        .filter_map(|json_line| {
            let llm_line = llm_lines.iter().copied().find(|l| near(json_line, *l))?;
            Some(
                Finding::new(FindingKind::JsonSerializationNearLlmCall, Service::Generic, file, Some(json_line))
                    .with_subject("JSON.stringify")
                    .with_rationale(format!("JSON.stringify used near LLM API call (line {llm_line})"))
                    .with_remediation(Remediation::new(TECHNIQUE).savings("Up to 75% token reduction vs JSON"))
                    .with_detail("llm_call_line", llm_line)
                    .with_detail(
                        "cost_consideration",
                        "JSON serialization adds heavy token overhead. VSC format can reduce tokens by up to 75% for flat, tabular data.",
                    )
                    .with_detail("use_when", "Flat, uniform data with known schema on both sides"),
            )
        })
        .collect()
}

fn analyze_python(content: &str, file: &str) -> Vec<Finding> {
    let Some(tree) = parse_python(content) else {
        return Vec::new();
    };
    let mut analyzer = PayloadAnalyzer::default();
    walk(tree.root_node(), content.as_bytes(), &mut analyzer);

    let mut findings = Vec::new();
    for ser in &analyzer.serializations {
        let Some(llm_line) = analyzer.llm_call_lines.iter().copied().find(|l| near(ser.line, *l)) else {
            continue;
        };
        let tokens = SERIALIZED_PAYLOAD_TOKENS;
        let savings = tokens * PAYLOAD_SAVINGS_PERCENT / 100;
        findings.push(
            Finding::new(FindingKind::JsonSerializationNearLlmCall, Service::Generic, file, Some(ser.line))
                .with_subject(ser.call.clone())
                .with_rationale(format!("json.dumps() used near LLM API call (line {llm_line})"))
                .with_remediation(
                    Remediation::new(TECHNIQUE).savings(&format!("~{savings} tokens (up to 75% reduction for flat data)")),
                )
                .with_detail("llm_call_line", llm_line)
                .with_detail(
                    "cost_consideration",
                    format!(
                        "JSON serialization adds token overhead. Estimated ~{tokens} tokens could be reduced to ~{} with VSC.",
                        tokens - savings
                    ),
                )
                .with_detail("estimated_token_savings", savings)
                .with_detail("technique", TECHNIQUE)
                .with_detail("example", VSC_PAYLOAD_EXAMPLE),
        );
    }

    for &line in &analyzer.dict_comprehension_lines {
        findings.push(
            Finding::new(FindingKind::RepetitiveDataStructure, Service::Generic, file, Some(line))
                .with_rationale("Repetitive data structure detected, an ideal candidate for VSC format")
                .with_remediation(
                    Remediation::new("VSC format for tabular data")
                        .savings("Up to 75% token reduction for flat structures"),
                )
                .with_detail(
                    "cost_consideration",
                    "Lists of dicts repeat every key for every row. VSC drops the keys and the structure.",
                )
                .with_detail("recommendation", "Convert list of dicts to VSC format before sending to LLM"),
        );
    }

    for prompt in &analyzer.system_prompts {
        let patterns = find_json_patterns(&prompt.text);
        if !patterns.is_empty() {
            let (tokens, savings) = estimate_savings(&patterns);
            findings.push(
                Finding::new(FindingKind::JsonSchemaInPrompt, Service::Generic, file, Some(prompt.line))
                    .with_subject("system_prompt")
                    .with_rationale(
                        "JSON schema/example embedded in system_prompt. This is sent to LLM on every request.",
                    )
                    .with_remediation(
                        Remediation::new("VSC format for schema definition")
                            .savings(&format!("~{savings} tokens per request (up to 75% reduction)")),
                    )
                    .with_detail("prompt_type", "system_prompt")
                    .with_detail(
                        "cost_consideration",
                        format!(
                            "JSON schemas in prompts spend tokens on every request. Estimated ~{tokens} tokens could be reduced to ~{} with VSC format.",
                            tokens - savings
                        ),
                    )
                    .with_detail("estimated_token_savings", savings)
                    .with_detail("json_patterns_found", patterns.len())
                    .with_detail("example", VSC_SCHEMA_EXAMPLE),
            );
        }

        for var in placeholder_names(&prompt.text) {
            if !is_json_variable(&var, &analyzer) {
                continue;
            }
            findings.push(
                Finding::new(FindingKind::JsonVariableInPrompt, Service::Generic, file, Some(prompt.line))
                    .with_subject(var.clone())
                    .with_rationale(format!("Variable '{var}' in prompt may contain JSON data"))
                    .with_remediation(Remediation::new("VSC format for data variables"))
                    .with_detail("variable", var.clone())
                    .with_detail(
                        "cost_consideration",
                        "If this variable contains flat, tabular JSON, VSC format can sharply reduce token usage.",
                    )
                    .with_detail(
                        "optimization",
                        json!({
                            "recommendation": format!("Convert '{var}' to VSC format before inserting into prompt"),
                            "use_when": "Variable contains flat, uniform data with known schema",
                        }),
                    ),
            );
        }
    }
    findings
}

/// Assigned from a serialisation call, or named like structured data.
fn is_json_variable(name: &str, analyzer: &PayloadAnalyzer) -> bool {
    let assigned = analyzer
        .serializations
        .iter()
        .any(|s| s.target.as_deref().is_some_and(|t| t.contains(name)));
    let lower = name.to_ascii_lowercase();
    assigned || JSON_NAME_HINTS.iter().any(|h| lower.contains(h))
}
