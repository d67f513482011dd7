use crate::models::bundle::ContextBundle;
use crate::models::issue::Issue;

/// System prompt for fix generation.
///
/// The response schema is fixed; the orchestrator parses it directly and
/// applies a single repair pass when the model wraps it in prose or fences.
pub const FIX_SYSTEM_PROMPT: &str = r#"You are an expert software engineer fixing a single flagged code-quality issue.

You will receive:
- The issue metadata (severity, type, rule, file, line, message).
- A snippet of the flagged file. Line numbers are included and the flagged line is marked with >>>.
- Related files from the same repository, each labeled with why it was included (direct import, corresponding test, or sibling module). Use them to understand the surrounding code; do not modify them.

Produce a fix for the flagged code only.

Respond with a single JSON object and nothing else, using exactly these keys:

{
  "explanation": "why the issue occurs and what the fix changes",
  "fixed_code": "the corrected code for the flagged region",
  "confidence": "high, medium, or low",
  "suggested_comment": "a short review comment suitable for posting on the issue"
}

Notes:
- Do not wrap the JSON in a code fence or add any text before or after it.
- "confidence" must be exactly one of: high, medium, low.
- Keep "fixed_code" limited to the code that needs to change, preserving the file's existing style and indentation.
"#;

/// Build the user payload for one issue: metadata, marked snippet, and the
/// relation-labeled context files the selector accepted.
pub fn build_fix_user_prompt(issue: &Issue, bundle: &ContextBundle) -> String {
    let mut prompt = format!(
        r#"Issue to fix:
- Key: {}
- Rule: {}
- Severity: {}
- Type: {}
- File: {}
- Line: {}
- Message: {}

Flagged code (line {} marked with >>>):
<snippet>
{}</snippet>
"#,
        issue.key,
        issue.rule,
        issue.severity,
        issue.issue_type,
        issue.file_path(),
        issue.line_or_first(),
        issue.message,
        issue.line_or_first(),
        bundle.snippet,
    );

    for file in &bundle.files {
        prompt.push_str(&format!(
            "\nRelated file ({}): {}{}\n<content>\n{}\n</content>\n",
            file.relation.label(),
            file.path.display(),
            if file.truncated { " (truncated)" } else { "" },
            file.content.trim_end_matches('\n'),
        ));
    }

    prompt
}
