//! Shared constants: defaults, thresholds, and documentation pointers.

/// Default AgentCore idle session timeout in seconds (15 minutes).
pub const AGENTCORE_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 900;

/// Default AgentCore maximum session lifetime in seconds (8 hours).
pub const AGENTCORE_DEFAULT_MAX_LIFETIME_SECS: u64 = 28_800;

/// Rough characters-per-token ratio used for every token estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Lines between a serialisation call and an inference call that still count as "near".
pub const NEAR_CALL_LINE_WINDOW: u32 = 10;

pub const DOC_PROMPT_CACHING: &str =
    "https://docs.aws.amazon.com/bedrock/latest/userguide/prompt-caching.html";
pub const DOC_SERVICE_TIERS: &str =
    "https://docs.aws.amazon.com/bedrock/latest/userguide/service-tiers-inference.html";
pub const DOC_PROMPT_ROUTING: &str =
    "https://docs.aws.amazon.com/bedrock/latest/userguide/prompt-routing.html";
pub const DOC_CROSS_REGION: &str =
    "https://docs.aws.amazon.com/bedrock/latest/userguide/cross-region-inference.html";
pub const DOC_AGENTCORE_RUNTIME: &str =
    "https://docs.aws.amazon.com/bedrock-agentcore/latest/APIReference/API_CreateAgentRuntime.html";
pub const DOC_AGENTCORE_STOP_SESSION: &str =
    "https://docs.aws.amazon.com/bedrock-agentcore/latest/APIReference/API_StopRuntimeSession.html";
pub const DOC_MODELS_SUPPORTED: &str =
    "https://docs.aws.amazon.com/bedrock/latest/userguide/models-supported.html";
pub const BEDROCK_PRICING_URL: &str = "https://aws.amazon.com/bedrock/pricing/";
pub const DOC_NOVA_PROMPT_OPTIMIZER: &str = "https://github.com/aws/nova-prompt-optimizer";
pub const CLAUDE_PROMPT_IMPROVER_URL: &str =
    "https://docs.anthropic.com/en/docs/build-with-claude/prompt-engineering/prompt-improver";
