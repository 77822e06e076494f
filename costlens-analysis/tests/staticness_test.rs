//! Static/dynamic classification of system prompts and the cross-region
//! caching severity it feeds.

use costlens_analysis::detectors::{BedrockDetector, Detector};
use costlens_analysis::engine::SourceFlavor;
use costlens_analysis::prompt::{analyze_prompt_staticness, analyze_prompt_staticness_with, Confidence};
use costlens_core::{Finding, FindingKind, Severity};

#[test]
fn plain_literal_is_static() {
    let a = analyze_prompt_staticness("system_prompt = \"You are a helpful assistant.\"\n");
    assert!(a.is_static);
    assert!(a.dynamic_variables.is_empty());
    assert_eq!(a.confidence, Confidence::High);
}

#[test]
fn fstring_identifier_is_dynamic() {
    let a = analyze_prompt_staticness("system_prompt = f\"Help {user_name} with {topic}.\"\n");
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["topic", "user_name"]);
}

#[test]
fn attribute_chain_reduces_to_base_name() {
    let a = analyze_prompt_staticness("system_prompt = f\"Hello {request.user.name}\"\n");
    assert_eq!(a.dynamic_variables, vec!["request"]);
}

#[test]
fn adjacent_literals_in_parentheses_are_static() {
    let src = "system_prompt = (\n    \"You are terse. \"\n    \"Answer in one line.\"\n)\n";
    assert!(analyze_prompt_staticness(src).is_static);
}

#[test]
fn format_call_with_arguments_is_dynamic() {
    let a = analyze_prompt_staticness("system_prompt = \"Hi {}\".format(name)\n");
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["name"]);
}

#[test]
fn json_illustration_in_fstring_is_not_a_variable() {
    let src = "system_prompt = f\"Reply as {{\\\"id\\\": 1, \\\"name\\\": \\\"x\\\"}} for {user}\"\n";
    let a = analyze_prompt_staticness(src);
    assert_eq!(a.dynamic_variables, vec!["user"]);
}

#[test]
fn no_binding_is_static_with_low_confidence() {
    let a = analyze_prompt_staticness("x = 1\n");
    assert!(a.is_static);
    assert_eq!(a.confidence, Confidence::Low);
    assert_eq!(a.sites_found, 0);
}

#[test]
fn call_on_constant_receiver_reads_its_argument() {
    let a = analyze_prompt_staticness("system_prompt = f\"Settings: {CONFIG.get(user)}\"\n");
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["user"]);

    let a = analyze_prompt_staticness("system_prompt = f\"Largest: {MAX(rows)}\"\n");
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["rows"]);
}

#[test]
fn call_without_arguments_reports_the_callee() {
    let a = analyze_prompt_staticness("system_prompt = f\"Today is {NOW()}\"\n");
    assert_eq!(a.dynamic_variables, vec!["NOW"]);
}

#[test]
fn bare_constant_placeholder_is_static() {
    let a = analyze_prompt_staticness("system_prompt = f\"Keep answers under {MAX_WORDS} words.\"\n");
    assert!(a.is_static);
    assert_eq!(a.confidence, Confidence::High);

    let a = analyze_prompt_staticness("system_prompt = f\"Limit: {LIMITS.MAX_WORDS}\"\n");
    assert!(a.is_static);
}

#[test]
fn constant_combined_with_a_variable_is_dynamic() {
    let a = analyze_prompt_staticness("system_prompt = f\"Budget {MAX_TOKENS * retries}\"\n");
    assert_eq!(a.dynamic_variables, vec!["retries"]);
}

#[test]
fn template_literal_placeholders_are_dynamic() {
    let src = "const systemPrompt = `Rows: ${JSON.stringify(rows)}`;\n";
    let a = analyze_prompt_staticness_with(src, SourceFlavor::CLike);
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["rows"]);

    let src = "const agent = new Agent({ systemPrompt: `Help ${user.name} today.` });\n";
    let a = analyze_prompt_staticness_with(src, SourceFlavor::CLike);
    assert_eq!(a.dynamic_variables, vec!["user"]);
}

#[test]
fn template_literal_without_placeholders_is_static() {
    let src = "const systemPrompt = `You are a careful reviewer.`;\n";
    let a = analyze_prompt_staticness_with(src, SourceFlavor::CLike);
    assert!(a.is_static);
    assert_eq!(a.confidence, Confidence::High);
}

#[test]
fn percent_formatting_is_dynamic() {
    let a = analyze_prompt_staticness("system_prompt = \"Help %s with %s\" % (user_name, topic)\n");
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["topic", "user_name"]);
}

#[test]
fn concatenation_with_a_name_is_dynamic() {
    let a = analyze_prompt_staticness("system_prompt = \"You help \" + customer + \".\"\n");
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["customer"]);
}

#[test]
fn concatenation_of_literals_is_static() {
    let a = analyze_prompt_staticness("system_prompt = \"You are terse. \" + \"Answer briefly.\"\n");
    assert!(a.is_static);
}

#[test]
fn name_is_followed_through_assignments() {
    let src = "\
header = f\"Serve {tenant}.\"
intro = header
body = intro
system_prompt = body
";
    let a = analyze_prompt_staticness(src);
    assert!(!a.is_static);
    assert_eq!(a.dynamic_variables, vec!["tenant"]);
    assert_eq!(a.dynamic_line, Some(1));
}

#[test]
fn resolution_stops_at_the_depth_limit() {
    let src = "\
header = f\"Serve {tenant}.\"
intro = header
body = intro
outro = body
system_prompt = outro
";
    let a = analyze_prompt_staticness(src);
    assert!(a.is_static);
    assert_eq!(a.confidence, Confidence::Low);
}

#[test]
fn whole_call_reads_its_arguments() {
    let a = analyze_prompt_staticness("system_prompt = render_prompt(customer)\n");
    assert_eq!(a.dynamic_variables, vec!["customer"]);

    let a = analyze_prompt_staticness("system_prompt = load_prompt()\n");
    assert!(a.is_static);
    assert_eq!(a.confidence, Confidence::Low);
}

fn agent_source(model: &str, prompt: &str, cached: bool) -> String {
    let cache = if cached { ", {\"cachePoint\": {\"type\": \"default\"}}" } else { "" };
    format!(
        "import boto3\n\
         client = boto3.client(\"bedrock-runtime\")\n\
         MODEL = \"{model}\"\n\
         def ask(user_name, q):\n\
         \x20   system_prompt = {prompt}\n\
         \x20   return client.converse(modelId=MODEL, system=[{{\"text\": system_prompt}}{cache}], messages=q)\n"
    )
}

fn cross_region(findings: &[Finding]) -> Vec<&Finding> {
    findings
        .iter()
        .filter(|f| f.kind == FindingKind::CachingCrossRegionAntipattern)
        .collect()
}

const DYNAMIC: &str = "f\"You help {user_name}.\"";
const STATIC: &str = "\"You help everyone.\"";

#[test]
fn global_profile_with_dynamic_prompt_is_high() {
    let src = agent_source("global.anthropic.claude-sonnet-4-20250514-v1:0", DYNAMIC, true);
    let findings = BedrockDetector::new().analyze(&src, "agent.py");
    let found = cross_region(&findings);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Some(Severity::High));
    assert_eq!(found[0].line, Some(3));
}

#[test]
fn geographic_profile_with_dynamic_prompt_is_medium() {
    let src = agent_source("us.anthropic.claude-sonnet-4-20250514-v1:0", DYNAMIC, true);
    let findings = BedrockDetector::new().analyze(&src, "agent.py");
    assert_eq!(cross_region(&findings)[0].severity, Some(Severity::Medium));
}

#[test]
fn static_prompt_is_info_for_either_marker() {
    for model in [
        "global.anthropic.claude-sonnet-4-20250514-v1:0",
        "us.anthropic.claude-sonnet-4-20250514-v1:0",
    ] {
        let src = agent_source(model, STATIC, true);
        let findings = BedrockDetector::new().analyze(&src, "agent.py");
        assert_eq!(cross_region(&findings)[0].severity, Some(Severity::Info), "{model}");
    }
}

#[test]
fn no_cache_hint_means_no_cross_region_finding() {
    for prompt in [DYNAMIC, STATIC] {
        let src = agent_source("global.anthropic.claude-sonnet-4-20250514-v1:0", prompt, false);
        let findings = BedrockDetector::new().analyze(&src, "agent.py");
        assert!(cross_region(&findings).is_empty());
    }
}

#[test]
fn single_region_model_never_triggers() {
    let src = agent_source("anthropic.claude-sonnet-4-20250514-v1:0", DYNAMIC, true);
    let findings = BedrockDetector::new().analyze(&src, "agent.py");
    assert!(cross_region(&findings).is_empty());
}

#[test]
fn call_in_placeholder_on_global_profile_is_high() {
    let prompt = "f\"Settings: {CONFIG.get(user_name)}\"";
    let src = agent_source("global.anthropic.claude-sonnet-4-20250514-v1:0", prompt, true);
    let findings = BedrockDetector::new().analyze(&src, "agent.py");
    assert_eq!(cross_region(&findings)[0].severity, Some(Severity::High));
}

#[test]
fn typescript_template_on_global_profile_is_high() {
    let src = "\
const client = new BedrockRuntimeClient({});
const modelId = \"global.anthropic.claude-sonnet-4-20250514-v1:0\";
export async function ask(rows) {
  const systemPrompt = `Rows: ${JSON.stringify(rows)}`;
  const system = [{ text: systemPrompt }, { cachePoint: { type: \"default\" } }];
  return client.send(new ConverseCommand({ modelId, system, messages: [] }));
}
";
    let findings = BedrockDetector::new().analyze(src, "agent.ts");
    let found = cross_region(&findings);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Some(Severity::High));
    assert_eq!(found[0].line, Some(2));
}
