//! Runtime lifecycle limits: configured values against the service defaults,
//! and runtimes created without any lifecycle configuration.

use std::sync::LazyLock;

use costlens_core::constants::{
    AGENTCORE_DEFAULT_IDLE_TIMEOUT_SECS, AGENTCORE_DEFAULT_MAX_LIFETIME_SECS, DOC_AGENTCORE_RUNTIME,
};
use costlens_core::{Finding, FindingKind, Remediation, Service};
use serde_json::{json, Value};

use crate::engine::spans::call_text;
use crate::engine::{line_at, Matcher};

static LIFECYCLE_CONFIG: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r#"['"]?[Ll]ifecycle[Cc]onfiguration['"]?"#));

static IDLE_TIMEOUT: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::new(r#"['"]?[Ii]dle[Rr]untime[Ss]ession[Tt]imeout['"]?\s*[:=]\s*(\d+)"#)
});

static MAX_LIFETIME: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r#"['"]?[Mm]ax[Ll]ifetime['"]?\s*[:=]\s*(\d+)"#));

static CDK_RUNTIME: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::new(r"new\s+bedrockagentcore\.(?:CfnRuntime|Runtime)\s*\(")
});

static CDK_INLINE_LIFECYCLE: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::caseless(r"lifecycleConfiguration\s*:\s*\{"));

static CDK_OVERRIDE_LIFECYCLE: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::caseless(r#"\.addPropertyOverride\s*\(\s*['"]LifecycleConfiguration['"]"#)
});

/// Python control-plane calls. The pattern ends at the opening parenthesis.
static RUNTIME_API_CALL: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"\b(create_agent_runtime|update_agent_runtime)\s*\("));

static LIFECYCLE_KWARG: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::caseless(r"lifecycleConfiguration\s*="));

#[derive(Clone, Copy)]
enum Limit {
    IdleTimeout,
    MaxLifetime,
}

impl Limit {
    fn default_secs(self) -> u64 {
        match self {
            Self::IdleTimeout => AGENTCORE_DEFAULT_IDLE_TIMEOUT_SECS,
            Self::MaxLifetime => AGENTCORE_DEFAULT_MAX_LIFETIME_SECS,
        }
    }

    fn kind(self) -> FindingKind {
        match self {
            Self::IdleTimeout => FindingKind::AgentcoreLifecycleIdleTimeout,
            Self::MaxLifetime => FindingKind::AgentcoreLifecycleMaxLifetime,
        }
    }

    fn assess(self, configured: u64) -> String {
        let default = self.default_secs();
        match self {
            Self::IdleTimeout => {
                let minutes = configured as f64 / 60.0;
                if configured > default {
                    format!(
                        "COST ALERT: Idle timeout ({configured}s / {minutes:.1}min) is HIGHER than default ({default}s). Instances stay alive longer when idle, increasing costs. Consider reducing if workload allows."
                    )
                } else if configured < default {
                    format!(
                        "Cost optimized: Idle timeout ({configured}s / {minutes:.1}min) is lower than default ({default}s). Instances terminate faster when idle, reducing costs."
                    )
                } else {
                    format!(
                        "Using default idle timeout ({default}s / 15min). Consider reducing for cost savings if workload allows."
                    )
                }
            }
            Self::MaxLifetime => {
                let hours = configured as f64 / 3600.0;
                if configured > default {
                    format!(
                        "COST ALERT: Max lifetime ({configured}s / {hours:.1}h) is HIGHER than default ({default}s / 8h). Instances can run longer, increasing costs. Ensure this is necessary for your workload."
                    )
                } else if configured < default {
                    format!(
                        "Cost optimized: Max lifetime ({configured}s / {hours:.1}h) is lower than default ({default}s / 8h). Instances terminate sooner, reducing costs."
                    )
                } else {
                    format!(
                        "Using default max lifetime ({default}s / 8h). Consider reducing for cost savings if workload completes faster."
                    )
                }
            }
        }
    }
}

/// Configured idle-timeout and max-lifetime values. Only files that mention a
/// lifecycle configuration are considered.
pub(super) fn detect_configured_limits(content: &str, file: &str) -> Vec<Finding> {
    if !LIFECYCLE_CONFIG.is_match(content) {
        return Vec::new();
    }
    let mut findings = Vec::new();
    for (pattern, limit) in [(&*IDLE_TIMEOUT, Limit::IdleTimeout), (&*MAX_LIFETIME, Limit::MaxLifetime)] {
        for caps in pattern.captures_iter(content) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else { continue };
            let Ok(configured) = value.as_str().parse::<u64>() else { continue };
            let note = limit.assess(configured);
            let mut finding = Finding::new(limit.kind(), Service::AgentCore, file, Some(line_at(content, whole.start())))
                .with_subject(format!("{configured}s"))
                .with_rationale(note.clone())
                .with_detail("configured_value", configured)
                .with_detail("default_value", limit.default_secs())
                .with_detail("unit", "seconds")
                .with_detail("cost_consideration", note);
            if configured > limit.default_secs() {
                finding = finding.with_severity(costlens_core::Severity::Medium);
            }
            findings.push(finding);
        }
    }
    findings
}

fn missing_lifecycle(file: &str, line: u32, subject: &str, description: String) -> Finding {
    Finding::new(FindingKind::AgentcoreLifecycleMissing, Service::AgentCore, file, Some(line))
        .with_subject(subject)
        .with_rationale(
            "Defaults may not be optimal for your workload. Instances stay alive for 15 minutes after idle and up to 8 hours maximum. If your workload completes faster, you're paying for unused compute time.",
        )
        .with_remediation(
            Remediation::new("Explicit lifecycle configuration")
                .savings("Reducing idle timeout from 15min to 5min can save ~67% on idle time costs")
                .documentation(DOC_AGENTCORE_RUNTIME),
        )
        .with_detail("description", description)
        .with_detail("issue", "Using AWS default lifecycle settings without explicit configuration")
        .with_detail("defaults_being_used", defaults_being_used())
        .with_detail(
            "optimization_opportunity",
            json!({
                "assess_workload": "Measure actual task completion time and idle periods",
                "if_tasks_complete_quickly": "Reduce idleRuntimeSessionTimeout (e.g., 300s = 5min) to terminate faster",
                "if_workload_is_short": "Reduce maxLifetime (e.g., 3600s = 1hr) if tasks never run that long",
            }),
        )
        .with_detail(
            "next_steps",
            json!([
                "Monitor actual runtime session durations in CloudWatch",
                "Identify average task completion time",
                "Set idleRuntimeSessionTimeout slightly above average idle time",
                "Set maxLifetime based on longest expected task duration",
            ]),
        )
}

fn defaults_being_used() -> Value {
    json!({
        "idleRuntimeSessionTimeout": format!("{AGENTCORE_DEFAULT_IDLE_TIMEOUT_SECS} seconds (15 minutes)"),
        "maxLifetime": format!("{AGENTCORE_DEFAULT_MAX_LIFETIME_SECS} seconds (8 hours)"),
    })
}

/// CDK runtime constructs with neither an inline lifecycle block nor a
/// property override. One finding, on the first construct.
pub(super) fn detect_cdk_runtime_without_lifecycle(content: &str, file: &str) -> Option<Finding> {
    let runtime = CDK_RUNTIME.find(content)?;
    if CDK_INLINE_LIFECYCLE.is_match(content) || CDK_OVERRIDE_LIFECYCLE.is_match(content) {
        return None;
    }
    Some(missing_lifecycle(
        file,
        line_at(content, runtime.start()),
        runtime.as_str().trim_end_matches(['(', ' ']),
        "AgentCore Runtime created without explicit lifecycleConfiguration".to_string(),
    ))
}

/// Python `create_agent_runtime` / `update_agent_runtime` calls whose own
/// argument list has no `lifecycleConfiguration=`.
pub(super) fn detect_api_calls_without_lifecycle(content: &str, file: &str) -> Vec<Finding> {
    RUNTIME_API_CALL
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let api = caps.get(1)?.as_str();
            let text = call_text(content, whole.start(), whole.end() - 1);
            if LIFECYCLE_KWARG.is_match(text) {
                return None;
            }
            Some(
                missing_lifecycle(
                    file,
                    line_at(content, whole.start()),
                    api,
                    format!("{api} call without explicit lifecycleConfiguration"),
                )
                .with_detail("api_call", api),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_compare_against_defaults() {
        let src = r#"
config = {
    "lifecycleConfiguration": {
        "idleRuntimeSessionTimeout": 1800,
        "maxLifetime": 3600,
    }
}
"#;
        let found = detect_configured_limits(src, "deploy.py");
        assert_eq!(found.len(), 2);
        let idle = &found[0];
        assert_eq!(idle.kind, FindingKind::AgentcoreLifecycleIdleTimeout);
        assert!(idle.detail_str("cost_consideration").unwrap().starts_with("COST ALERT"));
        let max = &found[1];
        assert_eq!(max.detail("configured_value"), Some(&json!(3600)));
        assert!(max.detail_str("cost_consideration").unwrap().starts_with("Cost optimized"));
    }

    #[test]
    fn limits_need_a_lifecycle_block() {
        assert!(detect_configured_limits("maxLifetime = 100", "a.py").is_empty());
    }

    #[test]
    fn each_call_is_checked_on_its_own() {
        let src = r#"
client.create_agent_runtime(
    agentRuntimeName="a",
    lifecycleConfiguration={"idleRuntimeSessionTimeout": 300},
)
client.update_agent_runtime(agentRuntimeId="a")
"#;
        let found = detect_api_calls_without_lifecycle(src, "a.py");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].detail_str("api_call"), Some("update_agent_runtime"));
        assert_eq!(found[0].line, Some(6));
    }

    #[test]
    fn cdk_override_counts_as_configured() {
        let src = "const rt = new bedrockagentcore.CfnRuntime(this, 'Rt', {});\nrt.addPropertyOverride('LifecycleConfiguration', {});\n";
        assert!(detect_cdk_runtime_without_lifecycle(src, "stack.ts").is_none());
        let bare = "const rt = new bedrockagentcore.Runtime(this, 'Rt', {});\n";
        let found = detect_cdk_runtime_without_lifecycle(bare, "stack.ts").expect("missing lifecycle");
        assert_eq!(found.line, Some(1));
    }
}
