//! Directory scans over temporary project trees.

use std::fs;
use std::path::Path;

use costlens_analysis::scanner::{walk_directory, Scanner};
use costlens_core::{FindingKind, ScanConfig, ScanError, Service};
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

const AGENT_APP: &str = r#"from bedrock_agentcore import BedrockAgentCoreApp
import boto3

app = BedrockAgentCoreApp()
client = boto3.client("bedrock-runtime")

@app.entrypoint
def handler(payload):
    return client.converse_stream(modelId="amazon.nova-lite-v1:0", messages=payload)
"#;

const PLAIN_CALL: &str = r#"import boto3

client = boto3.client("bedrock-runtime")
resp = client.converse(modelId="anthropic.claude-3-haiku-20240307-v1:0", messages=[])
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    costlens_core::tracing::init_tracing();
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/agent.py", AGENT_APP);
    write(root, "src/client.py", PLAIN_CALL);
    write(root, "src/handler.ts", "export const x = 1;\n");
    write(root, "src/handler.js", "exports.x = 1;\n");
    write(root, "src/test_agent.py", PLAIN_CALL);
    write(root, "node_modules/pkg/index.js", PLAIN_CALL);
    write(root, ".venv/lib/site.py", PLAIN_CALL);
    write(root, "pkg.egg-info/setup.py", PLAIN_CALL);
    write(root, "README.md", "# notes\n");
    dir
}

fn names(paths: impl Iterator<Item = String>) -> Vec<String> {
    paths
        .map(|p| Path::new(&p).file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn walker_applies_skip_rules_and_sorts() {
    let dir = project();
    let outcome = walk_directory(dir.path(), &ScanConfig::default(), &AtomicBool::new(false)).unwrap();
    let found = names(outcome.files.iter().map(|f| f.path.to_string_lossy().into_owned()));
    assert_eq!(found, ["agent.py", "client.py", "handler.ts"]);
    assert_eq!(outcome.skipped_directories, 3);
}

#[test]
fn test_files_can_be_included() {
    let dir = project();
    let config = ScanConfig {
        skip_test_files: Some(false),
        ..ScanConfig::default()
    };
    let outcome = walk_directory(dir.path(), &config, &AtomicBool::new(false)).unwrap();
    assert_eq!(outcome.files.len(), 4);
}

#[test]
fn max_files_caps_in_path_order() {
    let dir = project();
    let config = ScanConfig {
        max_files: Some(1),
        ..ScanConfig::default()
    };
    let outcome = walk_directory(dir.path(), &config, &AtomicBool::new(false)).unwrap();
    let found = names(outcome.files.iter().map(|f| f.path.to_string_lossy().into_owned()));
    assert_eq!(found, ["agent.py"]);
}

#[test]
fn scan_correlates_streaming_inside_runtime() {
    let dir = project();
    let report = Scanner::new(ScanConfig::default()).scan(dir.path()).unwrap();

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.total_findings, report.findings.len());
    assert_eq!(report.cross_cutting_count, 1);
    assert!(report.warning.is_none());

    let last = report.findings.last().unwrap();
    assert_eq!(last.kind, FindingKind::CrossServiceCostImpact);
    assert_eq!(last.service, Service::CrossService);
    assert!(last.file.ends_with("agent.py"));
    assert_eq!(last.detail_str("pattern"), Some("streaming_in_agentcore_runtime"));
}

#[test]
fn findings_are_grouped_by_file_in_path_order() {
    let dir = project();
    let report = Scanner::new(ScanConfig::default()).scan(dir.path()).unwrap();
    let per_file: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind != FindingKind::CrossServiceCostImpact)
        .map(|f| f.file.clone())
        .collect();
    let mut sorted = per_file.clone();
    sorted.sort();
    assert_eq!(per_file, sorted);
}

#[test]
fn findings_with_lines_get_file_links() {
    let dir = project();
    let report = Scanner::new(ScanConfig::default()).scan(dir.path()).unwrap();
    for finding in &report.findings {
        match finding.line {
            Some(line) => {
                let link = finding.file_link.as_deref().unwrap();
                assert!(link.contains(&format!(":{line}](file://")), "{link}");
            }
            None => assert!(finding.file_link.is_none()),
        }
    }
}

#[test]
fn file_links_can_be_turned_off() {
    let dir = project();
    let config = ScanConfig {
        file_links: Some(false),
        ..ScanConfig::default()
    };
    let report = Scanner::new(config).scan(dir.path()).unwrap();
    assert!(report.findings.iter().all(|f| f.file_link.is_none()));
}

#[test]
fn disabled_detector_contributes_nothing() {
    let dir = project();
    let config = ScanConfig {
        disabled_detectors: vec!["agentcore".to_string()],
        ..ScanConfig::default()
    };
    let report = Scanner::new(config).scan(dir.path()).unwrap();
    assert!(report.findings.iter().all(|f| f.service != Service::AgentCore));
    assert_eq!(report.cross_cutting_count, 0);
}

#[test]
fn estimate_counts_without_analysing() {
    let dir = project();
    let estimate = Scanner::new(ScanConfig::default()).estimate(dir.path()).unwrap();
    assert_eq!(estimate.file_count, 3);
    assert!(estimate.total_size_bytes > 0);
    assert!(!estimate.is_large());
}

#[test]
fn empty_tree_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let report = Scanner::new(ScanConfig::default()).scan(dir.path()).unwrap();
    assert_eq!(report.files_scanned, 0);
    assert_eq!(report.total_findings, 0);
}

#[test]
fn bad_roots_are_errors() {
    let dir = TempDir::new().unwrap();
    let scanner = Scanner::new(ScanConfig::default());

    let missing = dir.path().join("nope");
    assert!(matches!(scanner.scan(&missing), Err(ScanError::RootNotFound { .. })));

    let file = dir.path().join("a.py");
    fs::write(&file, "x = 1\n").unwrap();
    assert!(matches!(scanner.scan(&file), Err(ScanError::NotADirectory { .. })));
}

#[test]
fn earlier_cancellation_does_not_block_the_next_scan() {
    let dir = project();
    let scanner = Scanner::new(ScanConfig::default());
    scanner.cancellation().cancel();
    assert!(scanner.scan(dir.path()).is_ok());
}

#[test]
fn scan_one_reads_and_correlates() {
    let dir = project();
    let scanner = Scanner::new(ScanConfig::default());
    let findings = scanner.scan_one(&dir.path().join("src/agent.py"));
    assert!(findings.iter().any(|f| f.kind == FindingKind::AgentcoreAppDetected));
    assert_eq!(findings.last().map(|f| f.kind), Some(FindingKind::CrossServiceCostImpact));
}

#[test]
fn scan_one_on_unreadable_input_is_empty() {
    let dir = TempDir::new().unwrap();
    let scanner = Scanner::new(ScanConfig::default());
    assert!(scanner.scan_one(&dir.path().join("missing.py")).is_empty());

    let binary = dir.path().join("blob.py");
    fs::write(&binary, [0xff, 0xfe, 0x00, 0x81]).unwrap();
    assert!(scanner.scan_one(&binary).is_empty());
}

#[test]
fn report_serialises_with_type_tags() {
    let dir = project();
    let report = Scanner::new(ScanConfig::default()).scan(dir.path()).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    let first = &value["findings"][0];
    assert!(first["type"].is_string());
    assert!(value.get("warning").is_none());
}
