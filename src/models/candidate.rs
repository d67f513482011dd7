use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Why a candidate file was proposed as context for an issue.
///
/// Ordering is the selection priority: direct imports beat the matching
/// test file, which beats plain directory siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    DirectImport,
    TestMatch,
    Sibling,
}

impl RelationKind {
    /// Label used when presenting the file to the fix-generation service.
    pub fn label(&self) -> &'static str {
        match self {
            RelationKind::DirectImport => "direct import",
            RelationKind::TestMatch => "corresponding test",
            RelationKind::Sibling => "sibling module",
        }
    }
}

/// A reference successfully mapped to an existing repository file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCandidate {
    /// Path relative to the repository root
    pub path: PathBuf,

    /// The reason this file was proposed
    pub relation: RelationKind,

    /// Traversal depth. Only depth 0 (the issue file's own references) is
    /// ever produced; the field exists so deeper traversal can be added
    /// without a model change.
    pub depth: u8,
}

impl ResolvedCandidate {
    pub fn new(path: PathBuf, relation: RelationKind) -> Self {
        Self {
            path,
            relation,
            depth: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_priority() {
        assert!(RelationKind::DirectImport < RelationKind::TestMatch);
        assert!(RelationKind::TestMatch < RelationKind::Sibling);
    }
}
