use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::models::bundle::{ContextBudget, ContextBundle, ContextFile};
use crate::models::candidate::ResolvedCandidate;
use crate::models::source::SourceFile;
use crate::utils::token_counter::{approximate_tokens, chars_for_tokens};

/// Marker prefixed to the flagged line in a snippet.
const FLAG_MARKER: &str = ">>>";

/// Build the issue file's snippet: the window of `context_lines` either side
/// of the flagged line, clipped to file bounds, every line numbered and the
/// flagged line marked.
pub fn build_snippet(file: &SourceFile, line_number: usize, context_lines: usize) -> String {
    let lines: Vec<&str> = file.content.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let flagged = line_number.clamp(1, lines.len());
    let start = flagged.saturating_sub(context_lines).max(1);
    let end = (flagged + context_lines).min(lines.len());

    let mut snippet = String::new();
    for n in start..=end {
        let marker = if n == flagged { FLAG_MARKER } else { "   " };
        snippet.push_str(&format!("{} {:4} | {}\n", marker, n, lines[n - 1]));
    }
    snippet
}

/// Cut `content` so its token count fits in `remaining_tokens`, ending at a
/// line boundary. Returns an empty string when not even the first line fits.
fn truncate_at_line_boundary(content: &str, remaining_tokens: usize) -> String {
    let max_chars = chars_for_tokens(remaining_tokens);
    let mut kept = String::new();

    for line in content.lines() {
        // +1 for the newline that closes the line
        if kept.chars().count() + line.chars().count() + 1 > max_chars {
            break;
        }
        kept.push_str(line);
        kept.push('\n');
    }

    kept
}

/// Greedy, priority-ordered selection of candidate files into a bundle.
///
/// The snippet is always included and never counted against `max_files`.
/// Candidates are taken in builder order while both the file-count and the
/// token budget hold. A candidate that alone exceeds the remaining budget
/// is truncated to fit, still counted as accepted, and terminates the scan:
/// one truncated file beats fragments from many.
pub fn select(
    candidates: &[ResolvedCandidate],
    issue_file: &SourceFile,
    line_number: usize,
    budget: &ContextBudget,
    repo_root: &Path,
) -> ContextBundle {
    let snippet = build_snippet(issue_file, line_number, budget.context_lines);
    let mut total_tokens = approximate_tokens(&snippet);
    let mut files = Vec::new();
    let mut budget_exhausted = false;

    for candidate in candidates {
        if files.len() >= budget.max_files {
            break;
        }
        if total_tokens >= budget.max_tokens {
            break;
        }

        let full_path = repo_root.join(&candidate.path);
        let content = match fs::read_to_string(&full_path) {
            Ok(content) => content,
            Err(e) => {
                // Unreadable candidates are dropped like unresolved references
                warn!("Skipping unreadable candidate {:?}: {}", full_path, e);
                continue;
            }
        };

        let tokens = approximate_tokens(&content);
        if total_tokens + tokens <= budget.max_tokens {
            total_tokens += tokens;
            files.push(ContextFile {
                path: candidate.path.clone(),
                relation: candidate.relation,
                content,
                truncated: false,
            });
            continue;
        }

        // Too big for what's left: truncate to the remaining budget and stop
        let remaining = budget.max_tokens - total_tokens;
        let truncated = truncate_at_line_boundary(&content, remaining);
        if !truncated.is_empty() {
            total_tokens += approximate_tokens(&truncated);
            files.push(ContextFile {
                path: candidate.path.clone(),
                relation: candidate.relation,
                content: truncated,
                truncated: true,
            });
        }
        budget_exhausted = true;
        break;
    }

    debug!(
        "Selected {} context files, ~{} tokens (exhausted: {})",
        files.len(),
        total_tokens,
        budget_exhausted
    );

    ContextBundle {
        snippet,
        files,
        total_tokens,
        budget_exhausted,
    }
}
