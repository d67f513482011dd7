use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::context::{extractor, resolver};
use crate::models::candidate::{RelationKind, ResolvedCandidate};
use crate::models::source::{Language, SourceFile};

/// Directory names conventionally holding tests, searched for a
/// corresponding test file.
const TEST_DIR_NAMES: &[&str] = &["tests", "test", "spec", "__tests__"];

/// Test file names conventionally corresponding to a source file stem.
fn test_file_names(stem: &str, language: Language) -> Vec<String> {
    match language {
        Language::Python => vec![
            format!("test_{}.py", stem),
            format!("{}_test.py", stem),
        ],
        Language::JavaScript => vec![
            format!("{}.test.js", stem),
            format!("{}.spec.js", stem),
        ],
        Language::TypeScript => vec![
            format!("{}.test.ts", stem),
            format!("{}.spec.ts", stem),
        ],
        Language::CSharp => vec![
            format!("{}Tests.cs", stem),
            format!("{}Test.cs", stem),
        ],
        Language::VisualBasic => vec![format!("{}Tests.vb", stem)],
        Language::Java => vec![format!("{}Test.java", stem)],
        Language::Html | Language::Unknown => Vec::new(),
    }
}

/// Locate the test file corresponding to the issue file, if any.
///
/// The issue file's own directory is checked first, then conventional test
/// directories anywhere under the root, walked in sorted order so the
/// result is deterministic for a given filesystem snapshot.
fn find_test_match(issue_file: &Path, repo_root: &Path) -> Option<PathBuf> {
    let stem = issue_file.file_stem()?.to_str()?;
    let language = Language::from_path(issue_file);
    let names = test_file_names(stem, language);
    if names.is_empty() {
        return None;
    }

    let issue_dir = issue_file.parent().unwrap_or_else(|| Path::new(""));
    for name in &names {
        let candidate = issue_dir.join(name);
        if repo_root.join(&candidate).is_file() {
            return Some(candidate);
        }
    }

    for entry in WalkDir::new(repo_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let relative = match entry.path().strip_prefix(repo_root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let in_test_dir = relative
            .components()
            .any(|c| c.as_os_str().to_str().map_or(false, |s| TEST_DIR_NAMES.contains(&s)));
        if !in_test_dir {
            continue;
        }
        let file_name = entry.file_name().to_str().unwrap_or_default();
        if names.iter().any(|n| n == file_name) {
            return Some(relative.to_path_buf());
        }
    }

    None
}

/// Build the ranked candidate list for one issue file.
///
/// Candidates come out in selection priority order: the issue file's own
/// resolved references (in first-appearance order), then the corresponding
/// test file, then same-directory siblings ordered by filename. A path
/// appears at most once; its first occurrence carries the highest-priority
/// relation it is reachable by. Deterministic for a given filesystem
/// snapshot.
pub fn build_candidates(source: &SourceFile, repo_root: &Path) -> Vec<ResolvedCandidate> {
    let issue_file = Path::new(&source.path);

    let mut candidates: Vec<ResolvedCandidate> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    seen.insert(issue_file.to_path_buf());

    // Direct imports, in the order references first appear in the file
    for reference in extractor::extract(source) {
        if let Some(path) = resolver::resolve(&reference, issue_file, repo_root) {
            if seen.insert(path.clone()) {
                candidates.push(ResolvedCandidate::new(path, RelationKind::DirectImport));
            }
        }
    }

    // Corresponding test file, at most one
    if let Some(path) = find_test_match(issue_file, repo_root) {
        if seen.insert(path.clone()) {
            candidates.push(ResolvedCandidate::new(path, RelationKind::TestMatch));
        }
    }

    // Same-directory siblings, ordered by filename
    let issue_dir = issue_file.parent().unwrap_or_else(|| Path::new(""));
    let full_dir = repo_root.join(issue_dir);
    let mut siblings: Vec<PathBuf> = Vec::new();
    if let Ok(entries) = fs::read_dir(&full_dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                siblings.push(issue_dir.join(entry.file_name()));
            }
        }
    }
    siblings.sort();
    for path in siblings {
        if seen.insert(path.clone()) {
            candidates.push(ResolvedCandidate::new(path, RelationKind::Sibling));
        }
    }

    debug!(
        "Built {} candidates for issue file {:?}",
        candidates.len(),
        issue_file
    );
    candidates
}
