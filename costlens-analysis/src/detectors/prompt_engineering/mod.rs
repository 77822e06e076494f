//! Prompt-engineering detector: syntax-tree analysis of Python sources for
//! prompt builder functions and inference calls made inside loops.
//!
//! Findings from this detector are service-agnostic: the same patterns cost
//! money on any hosted model API.

mod analyzer;

use std::path::Path;

use costlens_core::constants::DOC_PROMPT_CACHING;
use costlens_core::{Finding, FindingKind, Remediation, Service};
use serde_json::json;

use self::analyzer::{PromptAnalyzer, PromptBuilder};
use super::traits::Detector;
use crate::engine::visitor::walk;
use crate::parsers::language::has_extension;
use crate::parsers::parse_python;

/// Static-token count above which a builder is a strong caching candidate.
pub const LARGE_STATIC_TOKENS: usize = 50;

pub struct PromptEngineeringDetector;

impl PromptEngineeringDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PromptEngineeringDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for PromptEngineeringDetector {
    fn id(&self) -> &str {
        "prompt_engineering"
    }

    fn service(&self) -> Service {
        Service::Generic
    }

    fn can_analyze(&self, path: &Path) -> bool {
        has_extension(path, &["py"])
    }

    fn analyze(&self, content: &str, file: &str) -> Vec<Finding> {
        let Some(tree) = parse_python(content) else {
            return Vec::new();
        };
        let mut analyzer = PromptAnalyzer::default();
        walk(tree.root_node(), content.as_bytes(), &mut analyzer);

        let mut findings = Vec::new();
        for builder in &analyzer.builders {
            let calls = analyzer.call_count(&builder.name);
            if calls == 0 {
                continue;
            }
            findings.push(builder_finding(builder, calls, file));
        }
        for site in &analyzer.loop_calls {
            findings.push(
                Finding::new(FindingKind::LlmApiCallInLoop, Service::Generic, file, Some(site.line))
                    .with_subject(site.function.clone())
                    .with_rationale(
                        "LLM calls in loops can result in many repeated API calls. Consider prompt caching if the same context is used across iterations.",
                    )
                    .with_remediation(Remediation::new("Batch processing or prompt caching"))
                    .with_detail("function_name", site.function.clone())
                    .with_detail("loop_type", site.loop_type)
                    .with_detail("api_call", site.api_call.clone())
                    .with_detail(
                        "description",
                        format!("LLM API call inside {} loop in function '{}'", site.loop_type, site.function),
                    )
                    .with_detail(
                        "recommendation",
                        "If the loop processes similar items with shared context, use prompt caching to avoid re-processing static content",
                    ),
            );
        }
        findings
    }
}

fn builder_finding(builder: &PromptBuilder, calls: usize, file: &str) -> Finding {
    let tokens = builder.estimated_static_tokens();
    let code_pattern = json!({
        "static_content_detected": tokens > 0,
        "dynamic_content_detected": builder.has_dynamic_content,
        "f_string_usage": builder.uses_f_string,
        "string_concatenation": builder.uses_concatenation,
    });
    let name = builder.name.as_str();

    if tokens > LARGE_STATIC_TOKENS {
        Finding::new(FindingKind::RecurringPromptWithStaticContent, Service::Generic, file, Some(builder.line))
            .with_subject(name)
            .with_rationale(format!(
                "Function '{name}' builds prompts with large static content and is called {calls} times"
            ))
            .with_remediation(
                Remediation::new("Bedrock Prompt Caching")
                    .savings("90% on cached tokens")
                    .documentation(DOC_PROMPT_CACHING),
            )
            .with_detail("function_name", name)
            .with_detail("call_count", calls)
            .with_detail("estimated_static_tokens", tokens)
            .with_detail(
                "cost_consideration",
                format!(
                    "Prompt caching can save 90% on repeated static content. This function has ~{tokens} static tokens and is called {calls} times."
                ),
            )
            .with_detail(
                "enrichment_required",
                json!({
                    "priority": "HIGH",
                    "why": "Must verify if estimated tokens meet model-specific minimum for prompt caching",
                    "action": "Check AWS documentation for minimum token requirements",
                    "documentation": DOC_PROMPT_CACHING,
                    "model_specific_minimums": {
                        "claude_3_7_sonnet": "1,024 tokens",
                        "claude_3_5_haiku": "2,048 tokens",
                        "claude_opus_4_5": "4,096 tokens",
                        "amazon_nova": "1,000 tokens (max 20K)",
                        "note": "If estimated tokens < minimum, prompt caching will NOT work for this model",
                    },
                }),
            )
            .with_detail("code_pattern", code_pattern)
    } else {
        Finding::new(FindingKind::PromptBuilderFunctionDetected, Service::Generic, file, Some(builder.line))
            .with_subject(name)
            .with_rationale(format!(
                "Function '{name}' builds prompts dynamically and is called {calls} time(s)"
            ))
            .with_remediation(
                Remediation::new("Bedrock Prompt Caching (if called frequently)")
                    .savings("Up to 90% on cached tokens")
                    .documentation(DOC_PROMPT_CACHING),
            )
            .with_detail("function_name", name)
            .with_detail("call_count", calls)
            .with_detail("estimated_static_tokens", tokens)
            .with_detail(
                "cost_consideration",
                format!(
                    "This function builds prompts with ~{tokens} tokens of static content. If called multiple times at runtime, consider prompt caching for the static portions."
                ),
            )
            .with_detail("code_pattern", code_pattern)
    }
}
