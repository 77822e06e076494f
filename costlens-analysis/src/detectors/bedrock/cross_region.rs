//! Prompt caching behind cross-region inference profiles, and system prompts
//! that change per request.

use costlens_core::constants::{DOC_CROSS_REGION, DOC_PROMPT_CACHING};
use costlens_core::{Finding, FindingKind, Remediation, Service, Severity};

use super::FileScan;
use crate::model_id::CrossRegionScope;
use crate::prompt::{analyze_prompt_staticness_with, cross_region_caching_severity, PromptStaticness};

/// Names a primary system-prompt binding can use.
const SYSTEM_PROMPT_NAMES: &[&str] = &["system_prompt", "systemPrompt", "SYSTEM_PROMPT"];

pub(super) fn detect_caching_cross_region(scan: &FileScan<'_>) -> Vec<Finding> {
    let caching = scan.has_cache_hint();
    if !caching || !scan.models.iter().any(|m| m.parsed.is_cross_region()) {
        return Vec::new();
    }
    let staticness = analyze_prompt_staticness_with(scan.content, scan.flavor);

    let mut findings = Vec::new();
    for hit in scan.models.iter().filter(|m| m.parsed.is_cross_region()) {
        let scope = hit.parsed.scope();
        let Some(severity) = cross_region_caching_severity(scope, caching, staticness.is_static) else {
            continue;
        };
        findings.push(
            Finding::new(FindingKind::CachingCrossRegionAntipattern, Service::Bedrock, scan.file, Some(hit.line))
                .with_subject(hit.id.clone())
                .with_severity(severity)
                .with_rationale(describe(scope, &staticness))
                .with_remediation(
                    Remediation::new("Region-pinned inference for cached prompts").documentation(DOC_CROSS_REGION),
                )
                .with_detail("profile_type", scope.label())
                .with_detail("region_prefix", hit.parsed.region_prefix.clone())
                .with_detail("model_id", hit.id.clone())
                .with_detail("parsed", hit.parsed.to_json())
                .with_detail("prompt_analysis", staticness.to_json())
                .with_detail("description", describe(scope, &staticness)),
        );
    }
    findings
}

fn describe(scope: CrossRegionScope, staticness: &PromptStaticness) -> String {
    let spread = match scope {
        CrossRegionScope::Global => "any commercial region",
        _ => "several regions in one geography",
    };
    if staticness.is_static {
        format!(
            "Prompt caching with a cross-region profile that routes to {spread}. The system prompt looks static, so each region's cache warms once and stays useful."
        )
    } else {
        format!(
            "Prompt caching with a cross-region profile that routes to {spread}. The system prompt varies per request ({}), so cache entries are rarely reused and each region pays cache writes.",
            staticness.dynamic_variables.join(", ")
        )
    }
}

pub(super) fn detect_dynamic_system_prompt(scan: &FileScan<'_>) -> Option<Finding> {
    let names_system_prompt = SYSTEM_PROMPT_NAMES.iter().any(|n| scan.content.contains(n));
    let uses_inference = !scan.models.is_empty() || !scan.api_calls.is_empty();
    if !names_system_prompt && !uses_inference {
        return None;
    }

    let staticness = analyze_prompt_staticness_with(scan.content, scan.flavor);
    if staticness.is_static {
        return None;
    }

    let cached = scan.has_cache_hint();
    let severity = if cached { Severity::High } else { Severity::Medium };
    let recommendation = if cached {
        "Move per-request values out of the system prompt and into the user message so the cached prefix stays identical across requests."
    } else {
        "Keep the system prompt constant and pass per-request values in the user message. A constant prefix can then be cached."
    };

    Some(
        Finding::new(FindingKind::DynamicSystemPrompt, Service::Bedrock, scan.file, staticness.dynamic_line)
            .with_subject(staticness.dynamic_variables.join(", "))
            .with_severity(severity)
            .with_rationale(
                "The system prompt is built from runtime values, so every request sends a different prefix.",
            )
            .with_remediation(Remediation::new("Static system prompt").documentation(DOC_PROMPT_CACHING))
            .with_detail("dynamic_variables", staticness.dynamic_variables.clone())
            .with_detail("confidence", staticness.confidence.name())
            .with_detail("indicators", staticness.indicators.clone())
            .with_detail("cache_hint_present", cached)
            .with_detail("recommendation", recommendation),
    )
}
