//! Bedrock detector: clients, model ids, API calls, service tiers, and the
//! prompt-level caching and routing opportunities around them.

mod cross_region;
pub mod patterns;
mod prompts;

use std::path::Path;

use costlens_core::constants::{BEDROCK_PRICING_URL, DOC_MODELS_SUPPORTED, DOC_SERVICE_TIERS};
use costlens_core::{Finding, FindingKind, Remediation, Service};
use serde_json::json;

use self::patterns::*;
use super::traits::Detector;
use crate::engine::spans::call_text;
use crate::engine::string_extraction::StringKind;
use crate::engine::{extract_strings, is_suppressed, line_at, ExtractedString, SourceFlavor};
use crate::model_id::{parse_model_id, ParsedModelId};
use crate::parsers::language::has_extension;
use crate::parsers::Language;

const EXTENSIONS: &[&str] = &["py", "ts", "tsx", "js", "jsx"];

/// A model identifier literal found in the file.
#[derive(Debug, Clone)]
pub(crate) struct ModelHit {
    /// Identifier without the `:N` build tag.
    pub id: String,
    /// Identifier as written.
    pub full: String,
    pub line: u32,
    pub parsed: ParsedModelId,
}

/// An inference call found in the file.
#[derive(Debug, Clone)]
pub(crate) struct ApiCallHit {
    pub call_type: &'static str,
    pub line: u32,
}

/// Everything the sub-analyses share for one file.
pub(crate) struct FileScan<'a> {
    pub content: &'a str,
    pub file: &'a str,
    pub flavor: SourceFlavor,
    pub literals: Vec<ExtractedString>,
    pub models: Vec<ModelHit>,
    pub api_calls: Vec<ApiCallHit>,
}

impl FileScan<'_> {
    pub fn has_cache_hint(&self) -> bool {
        CACHE_HINTS.iter().any(|hint| self.content.contains(hint))
    }

    /// Literals that can carry prompt text.
    pub fn prompt_literals(&self) -> impl Iterator<Item = &ExtractedString> {
        self.literals
            .iter()
            .filter(|s| s.kind != StringKind::DocString)
    }
}

pub struct BedrockDetector;

impl BedrockDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BedrockDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for BedrockDetector {
    fn id(&self) -> &str {
        "bedrock"
    }

    fn service(&self) -> Service {
        Service::Bedrock
    }

    fn can_analyze(&self, path: &Path) -> bool {
        has_extension(path, EXTENSIONS)
    }

    fn analyze(&self, content: &str, file: &str) -> Vec<Finding> {
        let flavor = Language::from_path(Path::new(file))
            .map(|l| l.flavor())
            .unwrap_or(SourceFlavor::Python);

        let mut findings = detect_clients(content, file);

        let models = find_models(content);
        findings.extend(models.iter().map(|m| model_finding(m, file)));

        let (api_calls, call_findings) = detect_api_calls(content, file);
        findings.extend(call_findings);
        findings.extend(detect_service_tiers(content, file, &api_calls));
        findings.extend(detect_strands_models(content, file));

        let scan = FileScan {
            content,
            file,
            flavor,
            literals: extract_strings(content, flavor),
            models,
            api_calls,
        };
        findings.extend(prompts::detect_repeated_context(&scan));
        findings.extend(prompts::detect_improvement_opportunities(&scan));
        findings.extend(prompts::detect_missing_caching(&scan));
        findings.extend(prompts::detect_nova_opportunity(&scan));
        findings.extend(prompts::detect_prompt_routing(&scan));
        findings.extend(prompts::detect_routing_opportunity(&scan));
        findings.extend(cross_region::detect_caching_cross_region(&scan));
        findings.extend(cross_region::detect_dynamic_system_prompt(&scan));
        findings
    }
}

fn detect_clients(content: &str, file: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (pattern, sdk) in CLIENT_PATTERNS.iter() {
        for caps in pattern.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else { continue };
            if is_suppressed(content, whole.start(), whole.end()) {
                continue;
            }
            findings.push(
                Finding::new(
                    FindingKind::BedrockClientDetected,
                    Service::Bedrock,
                    file,
                    Some(line_at(content, whole.start())),
                )
                .with_subject(name.as_str())
                .with_rationale(
                    "Bedrock client initialised here. Every request through it is billed per input and output token.",
                )
                .with_detail("sdk", *sdk)
                .with_detail("client", name.as_str()),
            );
        }
    }
    findings.sort_by_key(|f| f.line);
    findings
}

/// Model id literals that survive the false-positive filter, in source order.
pub(crate) fn find_models(content: &str) -> Vec<ModelHit> {
    let mut hits = Vec::new();
    for caps in MODEL_ID.captures_iter(content) {
        let Some(id) = caps.get(1) else { continue };
        let full = id.as_str();
        let bare = strip_build_tag(full);
        let parsed = parse_model_id(full);
        let unprefixed = match &parsed.region_prefix {
            Some(prefix) => bare.strip_prefix(prefix.as_str()).map_or(bare, |s| s.trim_start_matches('.')),
            None => bare,
        };
        let after_provider = unprefixed.split_once('.').map_or("", |(_, rest)| rest);
        if !after_provider.contains('-') {
            continue;
        }
        if is_suppressed(content, id.start(), id.end()) {
            continue;
        }
        hits.push(ModelHit {
            id: bare.to_string(),
            full: full.to_string(),
            line: line_at(content, id.start()),
            parsed,
        });
    }
    hits
}

fn strip_build_tag(id: &str) -> &str {
    match id.rsplit_once(':') {
        Some((head, tag)) if !tag.is_empty() && tag.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => id,
    }
}

fn model_finding(hit: &ModelHit, file: &str) -> Finding {
    let scope = hit.parsed.scope();
    let mut finding = Finding::new(FindingKind::BedrockModelUsage, Service::Bedrock, file, Some(hit.line))
        .with_subject(hit.id.clone())
        .with_rationale(
            "Model choice is the largest driver of per-token cost. Confirm this is the smallest model that meets the quality bar for this call site.",
        )
        .with_remediation(
            Remediation::new("Model right-sizing")
                .savings("varies by model; smaller tiers are often several times cheaper per token")
                .documentation(DOC_MODELS_SUPPORTED),
        )
        .with_detail("model_id", hit.id.clone())
        .with_detail("parsed", hit.parsed.to_json())
        .with_detail("is_cross_region", hit.parsed.is_cross_region())
        .with_detail("cross_region_type", scope.label())
        .with_detail("pricing_reference", BEDROCK_PRICING_URL)
        .with_detail(
            "action_required",
            json!({
                "priority": "high",
                "next_steps": [
                    "Confirm the model is still available and not scheduled for end of life",
                    "Look up current on-demand input and output token prices for this model",
                    "Compare against a smaller tier of the same family for this workload",
                ],
            }),
        )
        .with_detail(
            "enrichment_instructions",
            json!({
                "auto_execute": true,
                "priority": "high",
                "critical_notes": [
                    "Resolve the exact model id, including any region prefix, before looking up prices",
                    "Cross-region inference profiles are priced like the source region's model",
                ],
                "steps": [
                    format!("Use the AWS CLI MCP server to run `aws bedrock get-foundation-model --model-identifier {}` and confirm lifecycle status", hit.parsed_base_id()),
                    "Use the AWS Pricing MCP server to fetch on-demand input and output token prices for this model",
                    "Report price per 1K input and output tokens next to this finding",
                ],
            }),
        );
    if let Some(label) = scope.label() {
        finding = finding.with_detail(
            "cross_region_warning",
            format!(
                "This is a {label} cross-region inference profile. Requests may be served from several regions, which lowers prompt-cache hit rates when prompts vary per request."
            ),
        );
    }
    finding
}

impl ModelHit {
    /// Identifier without the region prefix.
    fn parsed_base_id(&self) -> &str {
        match &self.parsed.region_prefix {
            Some(prefix) => self
                .id
                .strip_prefix(prefix.as_str())
                .map_or(self.id.as_str(), |s| s.trim_start_matches('.')),
            None => &self.id,
        }
    }
}

/// Inference calls, and their findings, in source order.
fn detect_api_calls(content: &str, file: &str) -> (Vec<ApiCallHit>, Vec<Finding>) {
    let mut hits: Vec<(usize, ApiCallHit, Finding)> = Vec::new();

    for caps in NATIVE_API_CALL.captures_iter(content) {
        let (Some(whole), Some(method)) = (caps.get(0), caps.get(1)) else { continue };
        if is_suppressed(content, method.start(), method.end()) {
            continue;
        }
        let call_type = call_type(method.as_str());
        let streaming = call_type.ends_with("stream");
        let line = line_at(content, method.start());
        let finding = Finding::new(FindingKind::BedrockApiCall, Service::Bedrock, file, Some(line))
            .with_subject(call_type)
            .with_rationale(if streaming {
                "Streaming call: tokens are billed the same as synchronous calls, but the caller stays connected for the whole generation."
            } else {
                "Synchronous inference call. Input tokens dominate cost when large static context is resent on every call."
            })
            .with_detail("call_type", call_type)
            .with_detail("method", method.as_str())
            .with_detail("pattern", if streaming { "streaming" } else { "synchronous" })
            .with_detail("api_style", "bedrock_native");
        hits.push((whole.start(), ApiCallHit { call_type, line }, finding));
    }

    let bedrock_confirmed = content.contains("bedrock-runtime");
    for m in OPENAI_CHAT_CALL.find_iter(content) {
        if is_suppressed(content, m.start(), m.end()) {
            continue;
        }
        let text = call_text(content, m.start(), m.end() - 1);
        let streaming = STREAM_FLAG.is_match(text);
        let line = line_at(content, m.start());
        let call_type = "chat_completions_create";
        let finding = Finding::new(FindingKind::BedrockApiCall, Service::Bedrock, file, Some(line))
            .with_subject(call_type)
            .with_rationale(if bedrock_confirmed {
                "OpenAI-compatible chat completion served by a Bedrock endpoint."
            } else {
                "OpenAI-compatible chat completion. No Bedrock endpoint was found in this file, so the provider is unconfirmed."
            })
            .with_detail("call_type", call_type)
            .with_detail("pattern", if streaming { "streaming" } else { "synchronous" })
            .with_detail("api_style", "openai_compatible")
            .with_detail("bedrock_confirmed", bedrock_confirmed);
        hits.push((m.start(), ApiCallHit { call_type, line }, finding));
    }

    hits.sort_by_key(|(offset, _, _)| *offset);
    hits.into_iter().map(|(_, hit, finding)| (hit, finding)).unzip()
}

fn detect_service_tiers(content: &str, file: &str, api_calls: &[ApiCallHit]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut any_tier = false;

    for caps in SERVICE_TIER.captures_iter(content) {
        let Some(tier) = caps.get(1) else { continue };
        any_tier = true;
        let Some(profile) = tier_profile(tier.as_str()) else { continue };
        findings.push(
            Finding::new(
                FindingKind::BedrockServiceTier,
                Service::Bedrock,
                file,
                Some(line_at(content, tier.start())),
            )
            .with_subject(profile.tier)
            .with_rationale(profile.cost_consideration)
            .with_remediation(Remediation::new("Bedrock service tiers").documentation(DOC_SERVICE_TIERS))
            .with_detail("service_tier", profile.tier)
            .with_detail("tier_category", profile.category)
            .with_detail("pricing_model", profile.pricing_model)
            .with_detail("typical_use_cases", profile.typical_use_cases)
            .with_detail("cost_consideration", profile.cost_consideration),
        );
    }

    if !any_tier {
        if let Some(first) = api_calls.first() {
            findings.push(
                Finding::new(FindingKind::BedrockServiceTierMissing, Service::Bedrock, file, Some(first.line))
                    .with_subject(first.call_type)
                    .with_rationale(
                        "No service tier is set, so every call runs on the default (Standard) tier.",
                    )
                    .with_remediation(
                        Remediation::new("Bedrock service tiers")
                            .savings("Flex is discounted relative to Standard")
                            .documentation(DOC_SERVICE_TIERS),
                    )
                    .with_detail("service_tier", "default (implicit)")
                    .with_detail("optimization_opportunity", true)
                    .with_detail("api_call", first.call_type)
                    .with_detail(
                        "recommendation",
                        "Set service_tier=\"flex\" for latency-tolerant work such as batch jobs and evaluations for cost savings over the default tier. Use \"priority\" only where latency matters.",
                    )
                    .with_detail("available_tiers", json!(["priority", "default", "flex", "reserved"])),
            );
        }
    }
    findings
}

fn detect_strands_models(content: &str, file: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for m in STRANDS_MODEL.find_iter(content) {
        if is_suppressed(content, m.start(), m.end()) {
            continue;
        }
        let text = call_text(content, m.start(), m.end() - 1);
        let model_id = STRANDS_MODEL_ID
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|c| c.as_str().to_string());
        let streaming = STRANDS_STREAMING
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|c| c.as_str() == "True");
        let model_tier = model_id.as_deref().map(parse_model_id).and_then(|p| p.tier);

        let (status, note) = match streaming {
            Some(true) => ("enabled", "Streaming is explicitly enabled."),
            Some(false) => ("disabled", "Streaming is explicitly disabled; responses arrive in one piece."),
            None => ("default (enabled)", "Strands BedrockModel streams by default."),
        };

        let mut finding = Finding::new(
            FindingKind::StrandsBedrockModelConfig,
            Service::Bedrock,
            file,
            Some(line_at(content, m.start())),
        )
        .with_rationale(
            "Strands agent model configuration. The model tier fixes the per-token price of every agent loop iteration.",
        )
        .with_detail("model_id", model_id.clone())
        .with_detail("model_tier", model_tier)
        .with_detail("streaming", streaming)
        .with_detail("streaming_assessment", json!({ "status": status, "note": note }));
        if let Some(id) = model_id {
            finding = finding.with_subject(id);
        }
        findings.push(finding);
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_tag_is_stripped() {
        assert_eq!(strip_build_tag("amazon.nova-pro-v1:0"), "amazon.nova-pro-v1");
        assert_eq!(strip_build_tag("amazon.nova-pro-v1"), "amazon.nova-pro-v1");
    }

    #[test]
    fn model_without_hyphen_is_ignored() {
        assert!(find_models(r#"url = "openai.com""#).is_empty());
    }

    #[test]
    fn base_id_drops_region() {
        let hits = find_models(r#"m = "eu.anthropic.claude-3-haiku-20240307-v1:0""#);
        assert_eq!(hits[0].parsed_base_id(), "anthropic.claude-3-haiku-20240307-v1");
    }
}
