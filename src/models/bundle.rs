use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::candidate::RelationKind;

/// Budget limits for one issue's context bundle.
///
/// Read-only for the pipeline run; supplied from configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContextBudget {
    /// Maximum number of related files included alongside the snippet
    pub max_files: usize,

    /// Approximate token ceiling for the whole bundle
    pub max_tokens: usize,

    /// Snippet window half-width around the flagged line
    pub context_lines: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_files: 3,
            max_tokens: 8000,
            context_lines: 5,
        }
    }
}

/// One related file that made it into the bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFile {
    pub path: PathBuf,
    pub relation: RelationKind,
    pub content: String,
    /// True when the content was cut to fit the remaining token budget
    pub truncated: bool,
}

/// The budget-bounded context handed to the fix-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBundle {
    /// The issue file's snippet, line-numbered, flagged line marked
    pub snippet: String,

    /// Related files in selection order
    pub files: Vec<ContextFile>,

    /// Running approximate token total; never exceeds the budget's ceiling
    pub total_tokens: usize,

    /// True when a candidate had to be truncated to fit the remaining
    /// token budget, ending selection early. Informational, not an error.
    pub budget_exhausted: bool,
}
