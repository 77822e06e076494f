//! Parallel file walker using the `ignore` crate's `WalkParallel`.
//!
//! Prunes dependency, build, VCS and hidden directories, skips test files and
//! compiled JavaScript that has a TypeScript source next to it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use costlens_core::config::ScanConfig;
use costlens_core::errors::ScanError;
use crossbeam_channel as channel;

use super::types::DiscoveredFile;

/// Directory names never descended into.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    // Python
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    ".nox",
    "venv",
    ".venv",
    "env",
    ".env",
    "virtualenv",
    "site-packages",
    "*.egg-info",
    // JavaScript
    "node_modules",
    ".npm",
    ".yarn",
    ".pnp",
    "bower_components",
    "jspm_packages",
    // Build output
    "dist",
    "build",
    "out",
    "target",
    "bin",
    "obj",
    ".next",
    ".nuxt",
    ".output",
    ".vercel",
    ".netlify",
    // Infrastructure tooling
    "cdk.out",
    ".cdk.staging",
    "cdk_output",
    ".terraform",
    "terraform.tfstate.d",
    // Version control and editors
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    ".vscode",
    ".idea",
    ".eclipse",
    ".settings",
    // Scratch and generated docs
    "logs",
    "tmp",
    "temp",
    ".cache",
    "site",
    "_site",
    // Tests
    "tests",
    "test",
    "__tests__",
    "spec",
    "specs",
];

/// Hidden directories that are still scanned.
const VISIBLE_DOT_DIRS: &[&str] = &[".github", ".gitlab"];

/// Result of one walk.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Sorted by path; truncated to `max_files`.
    pub files: Vec<DiscoveredFile>,
    /// Directories pruned by the skip rules.
    pub skipped_directories: usize,
}

/// Whether a directory named `name` is pruned.
pub fn should_skip_dir(name: &str, extra: &[String]) -> bool {
    let matches = |pattern: &str| match pattern.strip_prefix('*') {
        Some(suffix) => name.ends_with(suffix),
        None => name == pattern,
    };
    if DEFAULT_SKIP_DIRS.iter().any(|p| matches(p)) || extra.iter().any(|p| matches(p)) {
        return true;
    }
    name.starts_with('.') && !VISIBLE_DOT_DIRS.contains(&name)
}

/// Whether a file passes the name, extension and sibling rules.
/// Size is enforced by the walker itself.
pub fn should_scan_file(path: &Path, config: &ScanConfig, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) else {
        return false;
    };
    if !extensions.contains(&ext) {
        return false;
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if config.effective_skip_test_files() && (name.starts_with("test_") || name.starts_with("test-")) {
        return false;
    }
    match ext.as_str() {
        "js" => !path.with_extension("ts").exists(),
        "jsx" => !path.with_extension("tsx").exists(),
        _ => true,
    }
}

fn check_root(root: &Path) -> Result<(), ScanError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound { path: root.to_path_buf() });
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory { path: root.to_path_buf() });
    }
    Ok(())
}

/// Walk a directory tree in parallel, collecting scannable files.
///
/// Returns files sorted by path for deterministic output.
pub fn walk_directory(
    root: &Path,
    config: &ScanConfig,
    cancelled: &AtomicBool,
) -> Result<WalkOutcome, ScanError> {
    check_root(root)?;

    let (tx, rx) = channel::unbounded::<DiscoveredFile>();
    let (skip_tx, skip_rx) = channel::unbounded::<PathBuf>();

    let extra_skips = config.skip_dirs.clone();
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .parents(false)
        .max_filesize(Some(config.effective_max_file_size()))
        .follow_links(config.follow_symlinks.unwrap_or(false))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir || entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if should_skip_dir(&name, &extra_skips) {
                let _ = skip_tx.send(entry.path().to_path_buf());
                return false;
            }
            true
        });

    let threads = config.effective_threads();
    if threads > 0 {
        builder.threads(threads);
    }

    let walker = builder.build_parallel();
    let extensions = config.effective_extensions();
    let stop = Arc::new(AtomicBool::new(cancelled.load(Ordering::Relaxed)));

    walker.run(|| {
        let tx = tx.clone();
        let stop = Arc::clone(&stop);
        let extensions = extensions.clone();
        Box::new(move |entry| {
            if stop.load(Ordering::Relaxed) {
                return ignore::WalkState::Quit;
            }
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "walk entry skipped");
                    return ignore::WalkState::Continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            let path = entry.path();
            if !should_scan_file(path, config, &extensions) {
                return ignore::WalkState::Continue;
            }
            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(_) => return ignore::WalkState::Continue,
            };
            let _ = tx.send(DiscoveredFile { path: path.to_path_buf(), size });
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut files: Vec<DiscoveredFile> = rx.try_iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    if let Some(max) = config.max_files {
        files.truncate(max);
    }
    let skipped_directories = skip_rx.try_iter().count();

    Ok(WalkOutcome { files, skipped_directories })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_rules() {
        assert!(should_skip_dir("node_modules", &[]));
        assert!(should_skip_dir("costlens.egg-info", &[]));
        assert!(should_skip_dir(".cache", &[]));
        assert!(!should_skip_dir(".github", &[]));
        assert!(!should_skip_dir("src", &[]));
        assert!(should_skip_dir("generated", &["generated".to_string()]));
        assert!(should_skip_dir("api_gen", &["*_gen".to_string()]));
    }

    #[test]
    fn test_files_are_skipped_by_name() {
        let config = ScanConfig::default();
        let exts = config.effective_extensions();
        assert!(!should_scan_file(Path::new("/nope/test_agent.py"), &config, &exts));
        assert!(!should_scan_file(Path::new("/nope/Test-Stack.ts"), &config, &exts));
        assert!(should_scan_file(Path::new("/nope/agent.py"), &config, &exts));
        assert!(!should_scan_file(Path::new("/nope/notes.md"), &config, &exts));
    }
}
