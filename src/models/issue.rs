use serde::{Deserialize, Serialize};

/// A single flagged location reported by the quality server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Server-assigned unique key
    pub key: String,

    /// Rule identifier (e.g. "csharpsquid:S1172")
    pub rule: String,

    /// Severity label as reported (e.g. "MAJOR", "CRITICAL")
    pub severity: String,

    /// Issue type (e.g. "BUG", "CODE_SMELL")
    #[serde(rename = "type")]
    pub issue_type: String,

    /// Component key: `<project>:<relative/path>`
    pub component: String,

    /// 1-based line the issue is flagged on. Absent for file-level issues;
    /// those are treated as line 1.
    #[serde(default)]
    pub line: Option<usize>,

    /// Human-readable message for the rule violation
    pub message: String,
}

impl Issue {
    /// The repository-relative path of the flagged file, obtained by
    /// stripping the project prefix from the component key.
    pub fn file_path(&self) -> &str {
        match self.component.split_once(':') {
            Some((_, path)) => path,
            None => &self.component,
        }
    }

    /// Flagged line, defaulting to 1 for file-level issues.
    pub fn line_or_first(&self) -> usize {
        self.line.unwrap_or(1).max(1)
    }
}
