//! Prompt-level opportunities: repeated context, caching, prompt
//! optimisation tools, and prompt routing.

use costlens_core::constants::{
    CLAUDE_PROMPT_IMPROVER_URL, DOC_NOVA_PROMPT_OPTIMIZER, DOC_PROMPT_CACHING, DOC_PROMPT_ROUTING,
};
use costlens_core::{Finding, FindingKind, FxHashMap, Remediation, Service};
use serde_json::json;

use super::patterns::{MODEL_ID, PROMPT_ROUTER_ARN, ROUTER_MARKERS};
use super::FileScan;
use crate::engine::{is_suppressed, line_at, ExtractedString};
use crate::prompt::{complexity_score, has_complexity_cues, has_reasoning_markers};

/// Literals longer than this are treated as prompt context.
const LONG_LITERAL_CHARS: usize = 200;
/// Literals at least this long are worth caching or optimising.
const CACHEABLE_LITERAL_CHARS: usize = 300;
/// Shortest literal considered a routable prompt.
const ROUTABLE_PROMPT_CHARS: usize = 20;
const ROUTABLE_PROMPT_WORDS: usize = 3;
const ROUTING_SCORE_SPREAD: u8 = 2;

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(80).collect();
    if text.chars().count() > 80 {
        out.push_str("...");
    }
    out
}

/// The same long literal sent more than once.
pub(super) fn detect_repeated_context(scan: &FileScan<'_>) -> Vec<Finding> {
    let mut groups: FxHashMap<&str, Vec<&ExtractedString>> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();
    for lit in scan.prompt_literals().filter(|l| l.char_len() > LONG_LITERAL_CHARS) {
        let entry = groups.entry(lit.value.as_str()).or_default();
        if entry.is_empty() {
            order.push(lit.value.as_str());
        }
        entry.push(lit);
    }

    order
        .into_iter()
        .filter_map(|value| {
            let sites = groups.get(value)?;
            if sites.len() < 2 {
                return None;
            }
            let first = sites[0];
            let lines: Vec<u32> = sites.iter().map(|s| s.line).collect();
            Some(
                Finding::new(FindingKind::RepeatedPromptContext, Service::Bedrock, scan.file, Some(first.line))
                    .with_subject(preview(value))
                    .with_rationale(format!(
                        "The same {}-character context appears {} times in this file. Each request resends it as billed input tokens.",
                        first.char_len(),
                        sites.len()
                    ))
                    .with_remediation(
                        Remediation::new("Bedrock Prompt Caching")
                            .savings("up to 90% on cached input tokens")
                            .documentation(DOC_PROMPT_CACHING),
                    )
                    .with_detail("usage_count", sites.len())
                    .with_detail("lines", lines)
                    .with_detail("context_length", first.char_len())
                    .with_detail(
                        "cost_consideration",
                        "Repeated static context is a prompt caching candidate. Cached input tokens are billed at up to 90% less than uncached ones.",
                    )
                    .with_detail(
                        "optimization_questions",
                        json!([
                            "Is this context identical on every request?",
                            "Do requests using it arrive within the cache time-to-live?",
                            "Can the static part be placed before any per-request content?",
                        ]),
                    )
                    .with_detail("aws_feature", "Bedrock Prompt Caching")
                    .with_detail("potential_savings", "up to 90% reduction in cost for cached input tokens"),
            )
        })
        .collect()
}

/// Complex instructions that ask for analysis without any step-by-step scaffolding.
pub(super) fn detect_improvement_opportunities(scan: &FileScan<'_>) -> Vec<Finding> {
    scan.prompt_literals()
        .filter(|l| l.char_len() > LONG_LITERAL_CHARS)
        .filter(|l| has_complexity_cues(&l.value) && !has_reasoning_markers(&l.value))
        .map(|lit| {
            Finding::new(FindingKind::PromptImprovementOpportunity, Service::Bedrock, scan.file, Some(lit.line))
                .with_subject(preview(&lit.value))
                .with_rationale(
                    "A complex instruction without reasoning structure tends to produce retries and longer follow-up exchanges.",
                )
                .with_remediation(
                    Remediation::new("Claude Prompt Improver").documentation(CLAUDE_PROMPT_IMPROVER_URL),
                )
                .with_detail(
                    "issue",
                    "Prompt asks for complex analysis but gives no chain-of-thought structure (no step-by-step or numbered steps).",
                )
                .with_detail("complexity_score", complexity_score(&lit.value))
                .with_detail("optimization_tool", "Claude Prompt Improver")
                .with_detail("tool_url", CLAUDE_PROMPT_IMPROVER_URL)
                .with_detail(
                    "recommendation",
                    "Run the prompt through the improver, then compare output quality and token usage on a fixed evaluation set.",
                )
        })
        .collect()
}

/// Large static context and no cache hint anywhere in the file. One per file.
pub(super) fn detect_missing_caching(scan: &FileScan<'_>) -> Option<Finding> {
    if scan.has_cache_hint() {
        return None;
    }
    let lit = scan
        .prompt_literals()
        .find(|l| l.char_len() >= CACHEABLE_LITERAL_CHARS)?;
    Some(
        Finding::new(FindingKind::MissingPromptCaching, Service::Bedrock, scan.file, Some(lit.line))
            .with_subject(preview(&lit.value))
            .with_rationale(format!(
                "A {}-character prompt literal is sent without a cache point.",
                lit.char_len()
            ))
            .with_remediation(
                Remediation::new("Bedrock Prompt Caching")
                    .savings("up to 90% on cached input tokens")
                    .documentation(DOC_PROMPT_CACHING),
            )
            .with_detail("aws_feature", "Bedrock Prompt Caching")
            .with_detail("context_length", lit.char_len())
            .with_detail(
                "cost_consideration",
                "Add a cache point after the static prefix. Cache reads are billed at up to 90% less than regular input tokens.",
            ),
    )
}

/// Nova models with prompts large enough to benefit from the Nova optimiser.
pub(super) fn detect_nova_opportunity(scan: &FileScan<'_>) -> Option<Finding> {
    let nova: Vec<&super::ModelHit> = scan
        .models
        .iter()
        .filter(|m| m.parsed.family.as_deref() == Some("nova"))
        .collect();
    let first = nova.first()?;
    scan.prompt_literals()
        .find(|l| l.char_len() >= CACHEABLE_LITERAL_CHARS)?;

    let mut ids: Vec<&str> = Vec::new();
    for hit in &nova {
        if !ids.contains(&hit.full.as_str()) {
            ids.push(hit.full.as_str());
        }
    }

    Some(
        Finding::new(FindingKind::NovaOptimizationOpportunity, Service::Bedrock, scan.file, Some(first.line))
            .with_subject(first.id.clone())
            .with_rationale(
                "Nova models with long prompts can usually be served by shorter, optimised prompts with the same quality.",
            )
            .with_remediation(
                Remediation::new("Nova Prompt Optimizer").documentation(DOC_NOVA_PROMPT_OPTIMIZER),
            )
            .with_detail("optimization_tool", "Nova Prompt Optimizer")
            .with_detail("nova_models", ids)
            .with_detail("installation", "pip install nova-prompt-optimizer")
            .with_detail(
                "requirements",
                json!([
                    "Python 3.11 or newer",
                    "AWS credentials with Bedrock model access",
                    "A small labelled dataset of representative inputs and expected outputs",
                ]),
            )
            .with_detail(
                "when_to_use",
                "Prompts are long, stable, and run at volume against Nova models.",
            )
            .with_detail(
                "benefits",
                json!([
                    "Fewer input tokens per request",
                    "Prompts tuned to Nova's instruction format",
                    "Measured quality on your own evaluation set",
                ]),
            ),
    )
}

/// Existing prompt routers. One per distinct ARN.
pub(super) fn detect_prompt_routing(scan: &FileScan<'_>) -> Vec<Finding> {
    let mut seen: Vec<&str> = Vec::new();
    let mut findings = Vec::new();
    for m in PROMPT_ROUTER_ARN.find_iter(scan.content) {
        if seen.contains(&m.as_str()) || is_suppressed(scan.content, m.start(), m.end()) {
            continue;
        }
        seen.push(m.as_str());
        findings.push(
            Finding::new(
                FindingKind::PromptRoutingDetected,
                Service::Bedrock,
                scan.file,
                Some(line_at(scan.content, m.start())),
            )
            .with_subject(m.as_str())
            .with_rationale(
                "Intelligent prompt routing is in use. Routing quality decides how much traffic reaches the cheaper model.",
            )
            .with_remediation(Remediation::new("Bedrock Intelligent Prompt Routing").documentation(DOC_PROMPT_ROUTING))
            .with_detail("router_arn", m.as_str())
            .with_detail(
                "best_practices",
                json!([
                    "Keep both models in the router within the same family",
                    "Tune the response quality difference threshold against real traffic",
                    "Review routing decisions periodically as prompts change",
                ]),
            )
            .with_detail(
                "monitoring",
                "Track per-model invocation counts and token usage in CloudWatch to confirm the expected share of traffic reaches the smaller model.",
            ),
        );
    }
    findings
}

/// Prompts of mixed difficulty all sent to one model.
pub(super) fn detect_routing_opportunity(scan: &FileScan<'_>) -> Option<Finding> {
    if ROUTER_MARKERS.iter().any(|m| scan.content.contains(m)) {
        return None;
    }

    let mut models: Vec<&str> = Vec::new();
    for hit in &scan.models {
        if !models.contains(&hit.id.as_str()) {
            models.push(hit.id.as_str());
        }
    }
    let [model] = models.as_slice() else { return None };

    let scores: Vec<(u8, u32)> = scan
        .prompt_literals()
        .filter(|l| l.char_len() >= ROUTABLE_PROMPT_CHARS)
        .filter(|l| l.value.split_whitespace().count() >= ROUTABLE_PROMPT_WORDS)
        .filter(|l| !MODEL_ID.is_match(&scan.content[l.start..l.end]))
        .map(|l| (complexity_score(&l.value), l.line))
        .collect();
    if scores.len() < 2 {
        return None;
    }
    let min = scores.iter().map(|(s, _)| *s).min()?;
    let max = scores.iter().map(|(s, _)| *s).max()?;
    if max - min < ROUTING_SCORE_SPREAD {
        return None;
    }
    let first_line = scores.iter().map(|(_, line)| *line).min();

    Some(
        Finding::new(FindingKind::PromptRoutingOpportunity, Service::Bedrock, scan.file, first_line)
            .with_subject(*model)
            .with_rationale(
                "Prompts of very different complexity all go to the same model. Simple requests could be served by a smaller model.",
            )
            .with_remediation(
                Remediation::new("Bedrock Intelligent Prompt Routing")
                    .savings("up to 30% without compromising accuracy")
                    .documentation(DOC_PROMPT_ROUTING),
            )
            .with_detail("current_model", *model)
            .with_detail("prompt_count", scores.len())
            .with_detail(
                "complexity_variation",
                json!({ "min": min, "max": max, "range": max - min }),
            )
            .with_detail(
                "recommendation",
                "Route requests through a prompt router that pairs this model with a smaller model of the same family.",
            ),
    )
}
