//! Markdown display links for findings: `[name:line](file://<abs>:<line>)`.

use std::path::{Path, PathBuf};

use costlens_core::Finding;

/// Absolute form of `file`, resolved against `root` when relative.
fn absolute(file: &str, root: Option<&Path>) -> PathBuf {
    let path = Path::new(file);
    let joined = match root {
        Some(root) if path.is_relative() && !path.starts_with(root) => root.join(path),
        _ => path.to_path_buf(),
    };
    joined
        .canonicalize()
        .or_else(|_| std::path::absolute(&joined))
        .unwrap_or(joined)
}

/// Link text for one location.
pub fn file_link(file: &str, line: Option<u32>, root: Option<&Path>) -> String {
    let path = absolute(file, root);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    let target = path.to_string_lossy().replace('\\', "/");
    match line {
        Some(line) => format!("[{name}:{line}](file://{target}:{line})"),
        None => format!("[{name}](file://{target})"),
    }
}

/// Attach a link to every finding that has a line and no link yet.
/// Returns how many findings were linked.
pub fn enrich(findings: &mut [Finding], root: Option<&Path>) -> usize {
    let mut linked = 0;
    for finding in findings.iter_mut().filter(|f| f.line.is_some()) {
        let link = file_link(&finding.file, finding.line, root);
        if finding.attach_file_link(link) {
            linked += 1;
        }
    }
    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use costlens_core::{FindingKind, Service};

    #[test]
    fn link_has_name_line_and_absolute_target() {
        let link = file_link("/srv/app/agent.py", Some(12), None);
        assert!(link.starts_with("[agent.py:12](file:///"));
        assert!(link.ends_with("agent.py:12)"));
    }

    #[test]
    fn existing_links_are_kept() {
        let mut findings = vec![
            Finding::new(FindingKind::BedrockApiCall, Service::Bedrock, "/srv/a.py", Some(1)),
            Finding::new(FindingKind::AgentcoreAuthentication, Service::AgentCore, "/srv/a.py", None),
        ];
        findings[0].file_link = Some("custom".into());
        assert_eq!(enrich(&mut findings, None), 0);
        assert_eq!(findings[0].file_link.as_deref(), Some("custom"));
        assert!(findings[1].file_link.is_none());
    }
}
