//! AgentCore runtime detector: app setup, decorators, sessions, deployment,
//! auth, streaming, background work, lifecycle limits, and session stops.

mod lifecycle;

use std::path::Path;
use std::sync::LazyLock;

use costlens_core::constants::DOC_AGENTCORE_STOP_SESSION;
use costlens_core::{Finding, FindingKind, Remediation, Service};

use super::traits::Detector;
use crate::engine::{line_at, Matcher};
use crate::parsers::language::has_extension;

const EXTENSIONS: &[&str] = &["py", "ts", "tsx", "js", "jsx", "sh", "bash", "yml", "yaml"];

static APP_PATTERNS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher::caseless(r"BedrockAgentCoreApp\s*\("),
        Matcher::caseless(r"from\s+bedrock_agentcore\s+import"),
        Matcher::caseless(r"import\s+bedrock_agentcore"),
    ]
});

static DECORATORS: LazyLock<Vec<(Matcher, &'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Matcher::new(r"@app\.entrypoint"),
            "entrypoint",
            "Main agent logic. Compute time is charged per invocation.",
        ),
        (
            Matcher::new(r"@app\.async_task"),
            "async_task",
            "Background task. Extends compute time while the agent reports HealthyBusy.",
        ),
        (Matcher::new(r"@app\.ping"), "ping", "Health check endpoint with minimal cost impact."),
    ]
});

static SESSION_PATTERNS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher::new(r"RequestContext"),
        Matcher::new(r"context\.session_id"),
        Matcher::new(r"--session-id"),
    ]
});

/// Group 1 distinguishes local and hybrid launches from a direct deploy.
static LAUNCH: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::new(r"agentcore\s+launch(?:\s+(--local-build|--local))?"));

static AUTH_PATTERNS: LazyLock<Vec<(Matcher, &'static str)>> = LazyLock::new(|| {
    vec![
        (Matcher::caseless(r"customJWTAuthorizer"), "jwt"),
        (Matcher::caseless(r"IAM\s+SigV4"), "iam"),
        (Matcher::caseless(r"--authorizer-config"), "authorizer_config"),
    ]
});

static STREAMING_PATTERNS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher::new(r"(?s)async\s+def\s+\w+.*?yield"),
        Matcher::new(r"app\.stream_async"),
        Matcher::new(r"for\s+event\s+in\s+stream"),
    ]
});

static ASYNC_PATTERNS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher::new(r"asyncio\.create_task"),
        Matcher::new(r"app\.add_async_task"),
        Matcher::new(r"threading\.Thread"),
        Matcher::new(r"HealthyBusy"),
    ]
});

static STOP_SESSION: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::caseless(r"StopRuntimeSession|stop_runtime_session|stop_session")
});

pub struct AgentCoreDetector;

impl AgentCoreDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AgentCoreDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for AgentCoreDetector {
    fn id(&self) -> &str {
        "agentcore"
    }

    fn service(&self) -> Service {
        Service::AgentCore
    }

    fn can_analyze(&self, path: &Path) -> bool {
        has_extension(path, EXTENSIONS)
    }

    fn analyze(&self, content: &str, file: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        findings.extend(detect_app(content, file));
        findings.extend(detect_decorators(content, file));
        findings.extend(first_per_pattern(
            content,
            file,
            &SESSION_PATTERNS,
            FindingKind::AgentcoreSessionManagement,
            "Sessions time out after 15 minutes of inactivity. Ending them explicitly stops idle billing sooner.",
        ));
        findings.extend(detect_deployments(content, file));
        findings.extend(detect_auth(content, file));
        findings.extend(first_per_pattern(
            content,
            file,
            &STREAMING_PATTERNS,
            FindingKind::AgentcoreStreaming,
            "Streaming responses improve perceived latency but keep the runtime busy for the whole stream.",
        ));
        findings.extend(first_per_pattern(
            content,
            file,
            &ASYNC_PATTERNS,
            FindingKind::AgentcoreAsyncProcessing,
            "Background tasks keep the agent in HealthyBusy state, extending compute time. Monitor task duration.",
        ));
        findings.extend(lifecycle::detect_configured_limits(content, file));
        let path = Path::new(file);
        if has_extension(path, &["ts", "tsx", "js", "jsx"]) {
            findings.extend(lifecycle::detect_cdk_runtime_without_lifecycle(content, file));
        }
        if has_extension(path, &["py"]) {
            findings.extend(lifecycle::detect_api_calls_without_lifecycle(content, file));
        }
        findings.extend(detect_stop_session(content, file));
        findings
    }
}

fn agentcore_finding(kind: FindingKind, file: &str, line: Option<u32>) -> Finding {
    Finding::new(kind, Service::AgentCore, file, line)
}

fn detect_app(content: &str, file: &str) -> Option<Finding> {
    let m = APP_PATTERNS.iter().find_map(|p| p.find(content))?;
    Some(
        agentcore_finding(FindingKind::AgentcoreAppDetected, file, Some(line_at(content, m.start())))
            .with_subject(m.as_str())
            .with_rationale("AgentCore Runtime charges for compute time and memory allocation of every session.")
            .with_detail(
                "cost_consideration",
                "AgentCore Runtime charges based on compute time and memory allocation",
            ),
    )
}

fn detect_decorators(content: &str, file: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (pattern, decorator_type, note) in DECORATORS.iter() {
        for m in pattern.find_iter(content) {
            findings.push(
                agentcore_finding(FindingKind::AgentcoreDecorator, file, Some(line_at(content, m.start())))
                    .with_subject(*decorator_type)
                    .with_rationale(*note)
                    .with_detail("decorator_type", *decorator_type)
                    .with_detail("cost_consideration", *note),
            );
        }
    }
    findings
}

/// One finding for the first match of each pattern.
fn first_per_pattern(
    content: &str,
    file: &str,
    patterns: &[Matcher],
    kind: FindingKind,
    note: &str,
) -> Vec<Finding> {
    patterns
        .iter()
        .filter_map(|p| p.find(content))
        .map(|m| {
            agentcore_finding(kind, file, Some(line_at(content, m.start())))
                .with_subject(m.as_str().lines().next().unwrap_or_default().trim())
                .with_rationale(note)
                .with_detail("cost_consideration", note)
        })
        .collect()
}

fn detect_deployments(content: &str, file: &str) -> Vec<Finding> {
    LAUNCH
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (deployment_type, note) = match caps.get(1).map(|m| m.as_str()) {
                Some("--local-build") => (
                    "hybrid_build",
                    "Hybrid build: container built locally, deployed to the managed runtime.",
                ),
                Some(_) => ("local_dev", "Local development. No cloud runtime cost while iterating."),
                None => (
                    "direct_deploy",
                    "Direct deploy to the managed runtime. Recommended for production.",
                ),
            };
            Some(
                agentcore_finding(FindingKind::AgentcoreDeployment, file, Some(line_at(content, whole.start())))
                    .with_subject(deployment_type)
                    .with_rationale(note)
                    .with_detail("deployment_type", deployment_type)
                    .with_detail("cost_consideration", note),
            )
        })
        .collect()
}

/// Reported once per file, without a line.
fn detect_auth(content: &str, file: &str) -> Option<Finding> {
    let (_, auth_type) = AUTH_PATTERNS.iter().find(|(p, _)| p.is_match(content))?;
    Some(
        agentcore_finding(FindingKind::AgentcoreAuthentication, file, None)
            .with_subject(*auth_type)
            .with_rationale(format!("Authentication pattern detected: {auth_type}"))
            .with_detail("auth_type", *auth_type)
            .with_detail(
                "cost_consideration",
                "Authentication adds minimal overhead but ensures secure access",
            ),
    )
}

fn detect_stop_session(content: &str, file: &str) -> Option<Finding> {
    let m = STOP_SESSION.find(content)?;
    Some(
        agentcore_finding(
            FindingKind::AgentcoreStopSessionDetected,
            file,
            Some(line_at(content, m.start())),
        )
        .with_subject(m.as_str())
        .with_rationale(
            "Stopping sessions explicitly ends billing immediately instead of waiting for the idle timeout (15 minutes by default).",
        )
        .with_remediation(Remediation::new("StopRuntimeSession").documentation(DOC_AGENTCORE_STOP_SESSION))
        .with_detail(
            "description",
            "EXCELLENT: Proactive session termination detected using StopRuntimeSession",
        )
        .with_detail(
            "benefit",
            "Eliminates idle time charges by terminating sessions immediately when work is complete",
        )
        .with_detail(
            "best_practice",
            "Call StopRuntimeSession after completing agent tasks to avoid paying for idle compute time",
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn launch_flags_classify_deployment() {
        let script = "agentcore launch\nagentcore launch --local\nagentcore launch --local-build\n";
        let found = detect_deployments(script, "deploy.sh");
        let types: Vec<_> = found.iter().filter_map(|f| f.detail_str("deployment_type")).collect();
        assert_eq!(types, ["direct_deploy", "local_dev", "hybrid_build"]);
    }

    #[test]
    fn session_patterns_report_once_each() {
        let src = "ctx: RequestContext\nx = RequestContext()\nsid = context.session_id\n";
        let found = first_per_pattern(
            src,
            "a.py",
            &SESSION_PATTERNS,
            FindingKind::AgentcoreSessionManagement,
            "note",
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].line, Some(1));
        assert_eq!(found[1].line, Some(3));
    }

    #[test]
    fn auth_has_no_line() {
        let found = detect_auth("--authorizer-config '{...}'", "run.sh");
        let finding = found.expect("auth finding");
        assert_eq!(finding.line, None);
        assert_eq!(finding.detail_str("auth_type"), Some("authorizer_config"));
    }

    #[test]
    fn stop_session_reported_once() {
        let src = "client.stop_runtime_session(a)\nclient.stop_runtime_session(b)\n";
        let found = AgentCoreDetector::new().analyze(src, "agent.py");
        assert_eq!(
            kinds(&found).iter().filter(|k| **k == FindingKind::AgentcoreStopSessionDetected).count(),
            1
        );
    }
}
