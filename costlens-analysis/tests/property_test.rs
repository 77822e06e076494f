//! Arbitrary input never panics the parser, the filter, or the detectors.

use std::path::Path;

use costlens_analysis::detectors::{
    AgentCoreDetector, BedrockDetector, Detector, PayloadDetector, PromptEngineeringDetector,
};
use costlens_analysis::engine::is_suppressed;
use costlens_analysis::model_id::parse_model_id;
use costlens_analysis::Scanner;
use costlens_core::{FindingKind, ScanConfig};
use proptest::prelude::*;
use serde_json::json;

const CODE_CHARS: &str = "[a-zA-Z0-9_ .,:;=+#/*(){}\\[\\]\"'`$\\néüß中文😀-]{0,240}";

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn model_id_parser_never_panics(id in "[a-z0-9.:_-]{0,60}") {
        let parsed = parse_model_id(&id);
        if let Some(version) = parsed.version {
            prop_assert!(!version.is_empty());
        }
    }

    #[test]
    fn suppression_accepts_any_span(content in CODE_CHARS, a in 0usize..300, b in 0usize..300) {
        let len = content.len();
        let (start, end) = (a.min(b).min(len), a.max(b).min(len));
        let _ = is_suppressed(&content, start, end);
    }

    #[test]
    fn detectors_never_panic(content in CODE_CHARS) {
        for file in ["a.py", "a.ts", "deploy.sh"] {
            let _ = BedrockDetector::new().analyze(&content, file);
            let _ = AgentCoreDetector::new().analyze(&content, file);
            let _ = PromptEngineeringDetector::new().analyze(&content, file);
            let _ = PayloadDetector::new().analyze(&content, file);
        }
    }

    #[test]
    fn multibyte_system_prompts_never_panic(
        before in "[a-z éü中😀{}]{0,30}",
        after in "[a-z éü中😀{}()]{0,30}",
    ) {
        let src = format!("system_prompt = f\"{before}{{user}}{after}\"\nclient.converse(modelId=m)\n");
        let _ = BedrockDetector::new().analyze(&src, "a.py");
        let ts = format!("const systemPrompt = `${{JSON.stringify(rows)}} {before}`;\n// {after}\n");
        let _ = BedrockDetector::new().analyze(&ts, "a.ts");
    }
}

// Fixed sources with accented text and emoji in prompts, comments, and strings.

#[test]
fn bedrock_handles_multibyte_prompts() {
    let src = "\
import boto3
client = boto3.client(\"bedrock-runtime\")
# Résumé des requêtes 😀
system_prompt = f\"Réponds à {utilisateur} en français 🇫🇷\"
resp = client.converse(modelId=\"anthropic.claude-3-haiku-20240307-v1:0\", system=[{\"text\": system_prompt}])
";
    let found = BedrockDetector::new().analyze(src, "agent.py");
    let models: Vec<_> = found.iter().filter(|f| f.kind == FindingKind::BedrockModelUsage).collect();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].line, Some(5));
    let dynamic: Vec<_> = found.iter().filter(|f| f.kind == FindingKind::DynamicSystemPrompt).collect();
    assert_eq!(dynamic[0].subject.as_deref(), Some("utilisateur"));
}

#[test]
fn agentcore_handles_multibyte_comments() {
    let src = "\
from bedrock_agentcore import BedrockAgentCoreApp
# 应用入口 ✨
app = BedrockAgentCoreApp()

@app.entrypoint
def handler(payload):
    return {\"réponse\": \"données reçues 👍\"}
";
    let found = AgentCoreDetector::new().analyze(src, "app.py");
    let apps: Vec<_> = found.iter().filter(|f| f.kind == FindingKind::AgentcoreAppDetected).collect();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].line, Some(3));
}

#[test]
fn prompt_builder_counts_characters_not_bytes() {
    let text = "é".repeat(200);
    let src = format!("def build_prompt(user):\n    return f\"{text}{{user}}\"\n\nbuild_prompt(\"x\")\n");
    let found = PromptEngineeringDetector::new().analyze(&src, "p.py");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, FindingKind::PromptBuilderFunctionDetected);
    assert_eq!(found[0].detail("estimated_static_tokens"), Some(&json!(50)));
}

#[test]
fn payload_handles_multibyte_neighbours() {
    let src = "body = json.dumps(rows)  # données 📦\nresp = bedrock_runtime.invoke_model(body=body)  # 送信\n";
    let found = PayloadDetector::new().analyze(src, "a.py");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, FindingKind::JsonSerializationNearLlmCall);

    let ts = "const body = JSON.stringify(rows); // ✓ déjà\nawait bedrock_runtime.invoke_model(body);\n";
    assert_eq!(PayloadDetector::new().analyze(ts, "a.ts").len(), 1);
}

#[test]
fn analyze_content_handles_multibyte_source() {
    let scanner = Scanner::new(ScanConfig::default());
    let src = "client = boto3.client(\"bedrock-runtime\")  # クライアント\nmodel = \"amazon.nova-lite-v1:0\"  # ñandú 🐦\n";
    let found = scanner.analyze_content(Path::new("agent.py"), src);
    assert!(found.iter().any(|f| f.kind == FindingKind::BedrockClientDetected));
    assert!(found.iter().any(|f| f.kind == FindingKind::BedrockModelUsage && f.line == Some(2)));
}

