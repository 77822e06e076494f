//! Repeated analysis of the same input gives the same output.

use costlens_analysis::detectors::create_default_registry;
use costlens_analysis::Scanner;
use costlens_core::ScanConfig;
use std::path::Path;

const SOURCE: &str = r#"import boto3, json

client = boto3.client("bedrock-runtime")
MODEL = "us.anthropic.claude-3-7-sonnet-20250219-v1:0"

def build_prompt(user):
    return f"You are a support agent for a large retailer. Answer briefly. {user}"

def run(items):
    for item in items:
        body = json.dumps(item)
        client.invoke_model(modelId=MODEL, body=body)

system_prompt = f"Help {customer}"
build_prompt("x")
"#;

#[test]
fn detectors_are_idempotent() {
    let registry = create_default_registry();
    let first = registry.run_for(Path::new("a.py"), SOURCE, "a.py");
    let second = registry.run_for(Path::new("a.py"), SOURCE, "a.py");
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn repeated_scans_match_except_timing() {
    let dir = tempfile::TempDir::new().unwrap();
    for name in ["a.py", "b.py", "c.py"] {
        std::fs::write(dir.path().join(name), SOURCE).unwrap();
    }
    let scanner = Scanner::new(ScanConfig::default());
    let first = scanner.scan(dir.path()).unwrap();
    let second = scanner.scan(dir.path()).unwrap();
    assert_eq!(first.findings, second.findings);
    assert_eq!(first.files_scanned, 3);
}
