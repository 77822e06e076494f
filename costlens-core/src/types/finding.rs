//! Finding: the universal output record of every detector.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single detected pattern instance and its qualitative cost implication.
///
/// Built once by a detector through the `with_*` builder methods. After a
/// detector returns, the only mutation allowed is [`Finding::attach_file_link`],
/// which the enrichment layer applies at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub service: Service,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
    /// Kind-specific fields (parsed model ids, usage counts, questions...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_link: Option<String>,
}

impl Finding {
    pub fn new(kind: FindingKind, service: Service, file: &str, line: Option<u32>) -> Self {
        Self {
            kind,
            service,
            file: file.to_string(),
            line,
            subject: None,
            rationale: String::new(),
            severity: None,
            remediation: None,
            details: Map::new(),
            file_link: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_remediation(mut self, remediation: Remediation) -> Self {
        self.remediation = Some(remediation);
        self
    }

    /// Attach a kind-specific field. A later call with the same key wins.
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Look up a kind-specific field.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Convenience accessor for string-valued details.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }

    /// Set the display link. Returns false (and leaves the finding untouched)
    /// if a link is already present.
    pub fn attach_file_link(&mut self, link: String) -> bool {
        if self.file_link.is_some() {
            return false;
        }
        self.file_link = Some(link);
        true
    }
}

/// Structured remediation block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remediation {
    /// Named optimization technique, e.g. "Bedrock Prompt Caching".
    pub technique: String,
    /// Qualitative savings range, e.g. "up to 90% on cached tokens".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl Remediation {
    pub fn new(technique: &str) -> Self {
        Self {
            technique: technique.to_string(),
            savings: None,
            documentation: None,
        }
    }

    pub fn savings(mut self, savings: &str) -> Self {
        self.savings = Some(savings.to_string());
        self
    }

    pub fn documentation(mut self, url: &str) -> Self {
        self.documentation = Some(url.to_string());
        self
    }
}

/// Ordered severity classification carried by some finding kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The service family a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "bedrock")]
    Bedrock,
    #[serde(rename = "bedrock-agentcore")]
    AgentCore,
    #[serde(rename = "generic")]
    Generic,
    #[serde(rename = "cross-service")]
    CrossService,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bedrock => "bedrock",
            Self::AgentCore => "bedrock-agentcore",
            Self::Generic => "generic",
            Self::CrossService => "cross-service",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed vocabulary of everything a detector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    // Primary platform
    BedrockClientDetected,
    BedrockModelUsage,
    BedrockApiCall,
    BedrockServiceTier,
    BedrockServiceTierMissing,
    StrandsBedrockModelConfig,
    RepeatedPromptContext,
    PromptImprovementOpportunity,
    MissingPromptCaching,
    NovaOptimizationOpportunity,
    PromptRoutingDetected,
    PromptRoutingOpportunity,
    CachingCrossRegionAntipattern,
    DynamicSystemPrompt,
    // Agent runtime
    AgentcoreAppDetected,
    AgentcoreDecorator,
    AgentcoreSessionManagement,
    AgentcoreDeployment,
    AgentcoreAuthentication,
    AgentcoreStreaming,
    AgentcoreAsyncProcessing,
    AgentcoreLifecycleIdleTimeout,
    AgentcoreLifecycleMaxLifetime,
    AgentcoreLifecycleMissing,
    AgentcoreStopSessionDetected,
    // Prompt engineering
    RecurringPromptWithStaticContent,
    PromptBuilderFunctionDetected,
    LlmApiCallInLoop,
    // Payload shape
    JsonSerializationNearLlmCall,
    RepetitiveDataStructure,
    JsonSchemaInPrompt,
    JsonVariableInPrompt,
    // Correlation
    CrossServiceCostImpact,
}

impl FindingKind {
    /// Every kind, in declaration order.
    pub fn all() -> &'static [FindingKind] {
        &[
            Self::BedrockClientDetected, Self::BedrockModelUsage, Self::BedrockApiCall,
            Self::BedrockServiceTier, Self::BedrockServiceTierMissing,
            Self::StrandsBedrockModelConfig, Self::RepeatedPromptContext,
            Self::PromptImprovementOpportunity, Self::MissingPromptCaching,
            Self::NovaOptimizationOpportunity, Self::PromptRoutingDetected,
            Self::PromptRoutingOpportunity, Self::CachingCrossRegionAntipattern,
            Self::DynamicSystemPrompt,
            Self::AgentcoreAppDetected, Self::AgentcoreDecorator,
            Self::AgentcoreSessionManagement, Self::AgentcoreDeployment,
            Self::AgentcoreAuthentication, Self::AgentcoreStreaming,
            Self::AgentcoreAsyncProcessing, Self::AgentcoreLifecycleIdleTimeout,
            Self::AgentcoreLifecycleMaxLifetime, Self::AgentcoreLifecycleMissing,
            Self::AgentcoreStopSessionDetected,
            Self::RecurringPromptWithStaticContent, Self::PromptBuilderFunctionDetected,
            Self::LlmApiCallInLoop,
            Self::JsonSerializationNearLlmCall, Self::RepetitiveDataStructure,
            Self::JsonSchemaInPrompt, Self::JsonVariableInPrompt,
            Self::CrossServiceCostImpact,
        ]
    }

    /// Wire name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BedrockClientDetected => "bedrock_client_detected",
            Self::BedrockModelUsage => "bedrock_model_usage",
            Self::BedrockApiCall => "bedrock_api_call",
            Self::BedrockServiceTier => "bedrock_service_tier",
            Self::BedrockServiceTierMissing => "bedrock_service_tier_missing",
            Self::StrandsBedrockModelConfig => "strands_bedrock_model_config",
            Self::RepeatedPromptContext => "repeated_prompt_context",
            Self::PromptImprovementOpportunity => "prompt_improvement_opportunity",
            Self::MissingPromptCaching => "missing_prompt_caching",
            Self::NovaOptimizationOpportunity => "nova_optimization_opportunity",
            Self::PromptRoutingDetected => "prompt_routing_detected",
            Self::PromptRoutingOpportunity => "prompt_routing_opportunity",
            Self::CachingCrossRegionAntipattern => "caching_cross_region_antipattern",
            Self::DynamicSystemPrompt => "dynamic_system_prompt",
            Self::AgentcoreAppDetected => "agentcore_app_detected",
            Self::AgentcoreDecorator => "agentcore_decorator",
            Self::AgentcoreSessionManagement => "agentcore_session_management",
            Self::AgentcoreDeployment => "agentcore_deployment",
            Self::AgentcoreAuthentication => "agentcore_authentication",
            Self::AgentcoreStreaming => "agentcore_streaming",
            Self::AgentcoreAsyncProcessing => "agentcore_async_processing",
            Self::AgentcoreLifecycleIdleTimeout => "agentcore_lifecycle_idle_timeout",
            Self::AgentcoreLifecycleMaxLifetime => "agentcore_lifecycle_max_lifetime",
            Self::AgentcoreLifecycleMissing => "agentcore_lifecycle_missing",
            Self::AgentcoreStopSessionDetected => "agentcore_stop_session_detected",
            Self::RecurringPromptWithStaticContent => "recurring_prompt_with_static_content",
            Self::PromptBuilderFunctionDetected => "prompt_builder_function_detected",
            Self::LlmApiCallInLoop => "llm_api_call_in_loop",
            Self::JsonSerializationNearLlmCall => "json_serialization_near_llm_call",
            Self::RepetitiveDataStructure => "repetitive_data_structure",
            Self::JsonSchemaInPrompt => "json_schema_in_prompt",
            Self::JsonVariableInPrompt => "json_variable_in_prompt",
            Self::CrossServiceCostImpact => "cross_service_cost_impact",
        }
    }

    /// Parse from the wire name.
    pub fn parse_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == s)
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
