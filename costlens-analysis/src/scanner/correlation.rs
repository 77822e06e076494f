//! Cross-service correlation over one scan's findings.

use costlens_core::constants::DOC_AGENTCORE_RUNTIME;
use costlens_core::{Finding, FindingKind, FxHashMap, Remediation, Service, Severity};
use serde_json::json;

/// Services seen in one file, gathered in a single pass.
#[derive(Default)]
struct FileSignals {
    has_runtime: bool,
    has_streaming: bool,
}

/// Findings implied by combinations of findings in the same file, in order
/// of each file's first finding.
pub fn correlate(findings: &[Finding]) -> Vec<Finding> {
    let mut order: Vec<&str> = Vec::new();
    let mut signals: FxHashMap<&str, FileSignals> = FxHashMap::default();
    for f in findings {
        let entry = signals.entry(f.file.as_str()).or_insert_with(|| {
            order.push(f.file.as_str());
            FileSignals::default()
        });
        entry.has_runtime |= f.service == Service::AgentCore;
        entry.has_streaming |=
            f.kind == FindingKind::BedrockApiCall && f.detail_str("pattern") == Some("streaming");
    }

    order
        .into_iter()
        .filter(|file| signals.get(file).is_some_and(|s| s.has_runtime && s.has_streaming))
        .map(streaming_in_runtime)
        .collect()
}

fn streaming_in_runtime(file: &str) -> Finding {
    Finding::new(FindingKind::CrossServiceCostImpact, Service::CrossService, file, None)
        .with_subject("streaming_in_agentcore_runtime")
        .with_severity(Severity::Medium)
        .with_rationale(
            "AgentCore Runtime charges based on compute time. Streaming responses take longer to complete than synchronous responses, extending the billing period.",
        )
        .with_remediation(Remediation::new("Synchronous or batched responses").documentation(DOC_AGENTCORE_RUNTIME))
        .with_detail("pattern", "streaming_in_agentcore_runtime")
        .with_detail("services", json!(["bedrock", "bedrock-agentcore"]))
        .with_detail(
            "cost_consideration",
            "Bedrock streaming responses in AgentCore Runtime extend compute billing time. While streaming improves user experience, it keeps the runtime active longer.",
        )
        .with_detail(
            "optimization_questions",
            json!([
                "Does the user need to see responses in real-time?",
                "Could responses be batched or returned synchronously?",
                "Is the extended compute time worth the UX improvement?",
                "For long responses, is streaming necessary, or would pagination work?",
            ]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming_call(file: &str) -> Finding {
        Finding::new(FindingKind::BedrockApiCall, Service::Bedrock, file, Some(3))
            .with_detail("pattern", "streaming")
    }

    #[test]
    fn needs_both_services_in_one_file() {
        let runtime = Finding::new(FindingKind::AgentcoreAppDetected, Service::AgentCore, "a.py", Some(1));
        assert!(correlate(&[runtime.clone(), streaming_call("b.py")]).is_empty());

        let found = correlate(&[runtime, streaming_call("a.py")]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, "a.py");
        assert_eq!(found[0].severity, Some(Severity::Medium));
    }

    #[test]
    fn synchronous_calls_do_not_correlate() {
        let runtime = Finding::new(FindingKind::AgentcoreDecorator, Service::AgentCore, "a.py", Some(1));
        let sync = Finding::new(FindingKind::BedrockApiCall, Service::Bedrock, "a.py", Some(2))
            .with_detail("pattern", "synchronous");
        assert!(correlate(&[runtime, sync]).is_empty());
    }

    #[test]
    fn files_keep_first_appearance_order() {
        let runtime = |file: &str| Finding::new(FindingKind::AgentcoreAppDetected, Service::AgentCore, file, Some(1));
        let findings = [
            streaming_call("z.py"),
            runtime("a.py"),
            runtime("z.py"),
            streaming_call("a.py"),
            streaming_call("m.py"),
        ];
        let files: Vec<_> = correlate(&findings).into_iter().map(|f| f.file).collect();
        assert_eq!(files, vec!["z.py", "a.py"]);
    }
}
