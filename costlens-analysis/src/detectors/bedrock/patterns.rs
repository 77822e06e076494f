//! Pattern tables for the Bedrock detector.

use std::sync::LazyLock;

use crate::engine::Matcher;

/// Providers whose identifiers are recognised as model ids.
pub const MODEL_PROVIDERS: &[&str] = &[
    "amazon",
    "anthropic",
    "meta",
    "cohere",
    "mistral",
    "ai21",
    "stability",
    "deepseek",
    "openai",
    "qwen",
    "writer",
    "twelvelabs",
    "luma",
];

/// Client constructors: `(pattern, sdk)`.
pub static CLIENT_PATTERNS: LazyLock<Vec<(Matcher, &'static str)>> = LazyLock::new(|| {
    vec![
        (Matcher::new(r#"\.client\(\s*['"](bedrock-runtime|bedrock)['"]"#), "boto3"),
        (Matcher::new(r"\b(BedrockRuntimeClient)\s*\("), "aws-sdk-js-v3"),
        (Matcher::new(r"\bnew\s+(BedrockRuntime)\s*\("), "aws-sdk-js-v2"),
    ]
});

/// A quoted model identifier. Group 1 is the identifier with its build tag.
pub static MODEL_ID: LazyLock<Matcher> = LazyLock::new(|| {
    let regions = crate::model_id::REGION_PREFIXES.join("|");
    let providers = MODEL_PROVIDERS.join("|");
    Matcher::new(&format!(
        r#"["']((?:(?:{regions})\.)?(?:{providers})\.[A-Za-z0-9][A-Za-z0-9._-]*(?::\d+)?)["']"#
    ))
});

/// Native runtime calls. Longer names come first so alternation picks them.
pub static NATIVE_API_CALL: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::new(
        r"(?:\.|\bnew\s+)(invoke_model_with_response_stream|invokeModelWithResponseStream|InvokeModelWithResponseStreamCommand|converse_stream|converseStream|ConverseStreamCommand|invoke_model|invokeModel|InvokeModelCommand|converse|ConverseCommand)\s*\(",
    )
});

/// OpenAI-compatible chat completions.
pub static OPENAI_CHAT_CALL: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"\.chat\.completions\.create\s*\("));

pub static STREAM_FLAG: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"\bstream\s*[=:]\s*(?:True|true)\b"));

pub static SERVICE_TIER: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::new(r#"(?:service_tier|serviceTier)["']?\s*[:=]\s*["'](priority|flex|default|reserved)["']"#)
});

pub static STRANDS_MODEL: LazyLock<Matcher> = LazyLock::new(|| Matcher::new(r"\bBedrockModel\s*\("));

pub static STRANDS_MODEL_ID: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r#"model_id\s*=\s*["']([^"']+)["']"#));

pub static STRANDS_STREAMING: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"streaming\s*=\s*(True|False)\b"));

pub static PROMPT_ROUTER_ARN: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r#"arn:aws:bedrock:[^"'\s]*:prompt-router/[\w-]+"#));

/// Cache hints in request bodies.
pub const CACHE_HINTS: &[&str] = &["cache_control", "cacheControl", "cachePoint", "cache_point"];

/// Markers of an existing prompt router in the file.
pub const ROUTER_MARKERS: &[&str] = &["create_prompt_router", "prompt-router", "createPromptRouter"];

/// Snake-case name of a native call as written in any SDK.
pub fn call_type(method: &str) -> &'static str {
    match method {
        "invoke_model_with_response_stream"
        | "invokeModelWithResponseStream"
        | "InvokeModelWithResponseStreamCommand" => "invoke_model_with_response_stream",
        "converse_stream" | "converseStream" | "ConverseStreamCommand" => "converse_stream",
        "converse" | "ConverseCommand" => "converse",
        _ => "invoke_model",
    }
}

/// Pricing profile of one service tier.
pub struct TierProfile {
    pub tier: &'static str,
    pub category: &'static str,
    pub pricing_model: &'static str,
    pub typical_use_cases: &'static str,
    pub cost_consideration: &'static str,
}

pub const TIERS: &[TierProfile] = &[
    TierProfile {
        tier: "priority",
        category: "premium",
        pricing_model: "Price premium over Standard in exchange for preferential compute and lower latency",
        typical_use_cases: "Customer-facing chat, real-time assistants, latency-sensitive agent steps",
        cost_consideration: "Every request on this path pays the Priority premium. Confirm the latency requirement justifies it for all traffic, not only interactive requests.",
    },
    TierProfile {
        tier: "flex",
        category: "cost-optimized",
        pricing_model: "Discount relative to Standard in exchange for lower scheduling priority",
        typical_use_cases: "Batch summarization, evaluations, offline enrichment, background agents",
        cost_consideration: "Flex trades latency for price. Make sure callers tolerate longer and more variable response times.",
    },
    TierProfile {
        tier: "default",
        category: "standard",
        pricing_model: "Standard on-demand per-token pricing",
        typical_use_cases: "General workloads without strict latency or cost targets",
        cost_consideration: "Latency-tolerant traffic on this path could move to Flex for a discount.",
    },
    TierProfile {
        tier: "reserved",
        category: "ultra-premium",
        pricing_model: "Fixed price for reserved capacity over a committed term",
        typical_use_cases: "Mission-critical workloads that need a 99.5% uptime target and guaranteed throughput",
        cost_consideration: "Reserved capacity is paid whether or not it is used. Compare expected utilisation against on-demand cost.",
    },
];

pub fn tier_profile(tier: &str) -> Option<&'static TierProfile> {
    TIERS.iter().find(|t| t.tier == tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_pattern_requires_known_provider() {
        let caps = MODEL_ID.captures(r#"id = "us.anthropic.claude-3-7-sonnet-20250219-v1:0""#).unwrap();
        assert_eq!(&caps[1], "us.anthropic.claude-3-7-sonnet-20250219-v1:0");
        assert!(MODEL_ID.captures(r#"name = "acme.widget-v1""#).is_none());
    }

    #[test]
    fn longer_call_names_win() {
        let caps = NATIVE_API_CALL.captures("client.invoke_model_with_response_stream(").unwrap();
        assert_eq!(call_type(&caps[1]), "invoke_model_with_response_stream");
        let caps = NATIVE_API_CALL.captures("await client.send(new ConverseStreamCommand(").unwrap();
        assert_eq!(call_type(&caps[1]), "converse_stream");
    }

    #[test]
    fn every_tier_has_a_profile() {
        for tier in ["priority", "flex", "default", "reserved"] {
            assert!(tier_profile(tier).is_some());
        }
    }
}
