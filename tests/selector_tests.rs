use std::fs;
use std::path::{Path, PathBuf};

use issue_mender::context::selector::{build_snippet, select};
use issue_mender::models::bundle::ContextBudget;
use issue_mender::models::candidate::{RelationKind, ResolvedCandidate};
use issue_mender::models::source::SourceFile;
use issue_mender::utils::token_counter::approximate_tokens;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
}

fn issue_source() -> SourceFile {
    let content = (1..=20)
        .map(|n| format!("line {}\n", n))
        .collect::<String>();
    SourceFile::new("src/a.py".to_string(), content)
}

fn candidate(path: &str) -> ResolvedCandidate {
    ResolvedCandidate::new(PathBuf::from(path), RelationKind::DirectImport)
}

#[test]
fn snippet_windows_and_marks_the_flagged_line() {
    let source = issue_source();
    let snippet = build_snippet(&source, 10, 2);

    let lines: Vec<&str> = snippet.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("   8 | line 8"));
    assert!(lines[2].starts_with(">>>"));
    assert!(lines[2].contains("  10 | line 10"));
    assert!(lines[4].contains("  12 | line 12"));
}

#[test]
fn snippet_clips_at_file_start() {
    let source = issue_source();
    let snippet = build_snippet(&source, 1, 5);

    let lines: Vec<&str> = snippet.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with(">>>"));
}

#[test]
fn snippet_clips_at_file_end() {
    let source = issue_source();
    let snippet = build_snippet(&source, 20, 5);

    let lines: Vec<&str> = snippet.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[5].starts_with(">>>"));
}

#[test]
fn snippet_is_always_included() {
    let repo = TempDir::new().unwrap();
    let budget = ContextBudget {
        max_files: 0,
        max_tokens: 1,
        context_lines: 2,
    };

    let bundle = select(&[], &issue_source(), 10, &budget, repo.path());
    assert!(!bundle.snippet.is_empty());
    assert!(bundle.files.is_empty());
}

#[test]
fn file_count_budget_excludes_later_candidates() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "src/b.py", "b = 1\n");
    write(repo.path(), "src/c.py", "c = 1\n");
    let candidates = [candidate("src/b.py"), candidate("src/c.py")];

    let budget = ContextBudget {
        max_files: 1,
        max_tokens: 8000,
        context_lines: 2,
    };
    let bundle = select(&candidates, &issue_source(), 10, &budget, repo.path());

    // Budget tokens remain, but the file count is the binding limit
    assert_eq!(bundle.files.len(), 1);
    assert_eq!(bundle.files[0].path, PathBuf::from("src/b.py"));
    assert!(!bundle.budget_exhausted);
}

#[test]
fn token_total_never_exceeds_budget() {
    let repo = TempDir::new().unwrap();
    let big = "x".repeat(7).to_string() + "\n";
    write(repo.path(), "src/b.py", &big.repeat(100));
    write(repo.path(), "src/c.py", &big.repeat(100));
    let candidates = [candidate("src/b.py"), candidate("src/c.py")];

    let source = issue_source();
    let budget = ContextBudget {
        max_files: 5,
        max_tokens: approximate_tokens(&build_snippet(&source, 10, 2)) + 50,
        context_lines: 2,
    };
    let bundle = select(&candidates, &source, 10, &budget, repo.path());

    assert!(bundle.total_tokens <= budget.max_tokens);
}

#[test]
fn oversized_candidate_is_truncated_and_stops_selection() {
    let repo = TempDir::new().unwrap();
    let line = "x".repeat(7).to_string() + "\n"; // 8 chars, 2 tokens per line
    write(repo.path(), "src/b.py", &line.repeat(1000));
    write(repo.path(), "src/c.py", "c = 1\n");
    let candidates = [candidate("src/b.py"), candidate("src/c.py")];

    let source = issue_source();
    let snippet_tokens = approximate_tokens(&build_snippet(&source, 10, 2));
    let budget = ContextBudget {
        max_files: 5,
        max_tokens: snippet_tokens + 20,
        context_lines: 2,
    };
    let bundle = select(&candidates, &source, 10, &budget, repo.path());

    // Truncation terminates the scan: c.py is never considered
    assert_eq!(bundle.files.len(), 1);
    assert!(bundle.files[0].truncated);
    assert!(bundle.budget_exhausted);
    assert!(bundle.total_tokens <= budget.max_tokens);
}

#[test]
fn truncation_never_splits_a_line() {
    let repo = TempDir::new().unwrap();
    let content = (1..=200)
        .map(|n| format!("statement_number_{}\n", n))
        .collect::<String>();
    write(repo.path(), "src/b.py", &content);
    let candidates = [candidate("src/b.py")];

    let source = issue_source();
    let snippet_tokens = approximate_tokens(&build_snippet(&source, 10, 2));
    let budget = ContextBudget {
        max_files: 5,
        max_tokens: snippet_tokens + 25,
        context_lines: 2,
    };
    let bundle = select(&candidates, &source, 10, &budget, repo.path());

    let kept = &bundle.files[0].content;
    assert!(bundle.files[0].truncated);
    assert!(kept.ends_with('\n'));
    // Every retained line is a complete line from the original
    for line in kept.lines() {
        assert!(content.contains(&format!("{}\n", line)));
    }
}

#[test]
fn exact_fit_without_truncation_does_not_flag_exhaustion() {
    let repo = TempDir::new().unwrap();
    let line = "x".repeat(7).to_string() + "\n"; // 8 chars, 2 tokens per line
    write(repo.path(), "src/b.py", &line.repeat(10)); // exactly 20 tokens
    write(repo.path(), "src/c.py", "c = 1\n");
    let candidates = [candidate("src/b.py"), candidate("src/c.py")];

    let source = issue_source();
    let snippet_tokens = approximate_tokens(&build_snippet(&source, 10, 2));
    let budget = ContextBudget {
        max_files: 5,
        max_tokens: snippet_tokens + 20,
        context_lines: 2,
    };
    let bundle = select(&candidates, &source, 10, &budget, repo.path());

    // b.py consumes the budget exactly; c.py is excluded, but nothing was
    // cut so the bundle is not flagged as exhausted
    assert_eq!(bundle.files.len(), 1);
    assert!(!bundle.files[0].truncated);
    assert_eq!(bundle.total_tokens, budget.max_tokens);
    assert!(!bundle.budget_exhausted);
}

#[test]
fn small_candidates_all_fit() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "src/b.py", "b = 1\n");
    write(repo.path(), "src/c.py", "c = 2\n");
    let candidates = [candidate("src/b.py"), candidate("src/c.py")];

    let budget = ContextBudget::default();
    let bundle = select(&candidates, &issue_source(), 10, &budget, repo.path());

    assert_eq!(bundle.files.len(), 2);
    assert!(bundle.files.iter().all(|f| !f.truncated));
    assert!(!bundle.budget_exhausted);
}
