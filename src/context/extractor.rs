use log::debug;
use regex::Regex;

use crate::models::reference::{RawReference, ReferenceSyntax};
use crate::models::source::{Language, SourceFile};

/// One extraction rule: a line-level pattern whose first capture group is
/// the reference text, plus the syntax tag to attach.
struct ExtractionRule {
    pattern: Regex,
    syntax: ReferenceSyntax,
    /// Dotted references get their separators normalized to `/`
    dotted: bool,
}

fn rules_for(language: Language) -> Vec<ExtractionRule> {
    let rule = |pattern: &str, syntax, dotted| ExtractionRule {
        pattern: Regex::new(pattern).unwrap(),
        syntax,
        dotted,
    };

    match language {
        Language::Python => vec![
            rule(
                r"^\s*from\s+([\w.]+)\s+import\s+",
                ReferenceSyntax::Import,
                true,
            ),
            rule(r"^\s*import\s+([\w.]+)", ReferenceSyntax::Import, true),
        ],
        Language::JavaScript | Language::TypeScript => vec![
            rule(
                r#"import\s+(?:[\w{},*\s]+\s+from\s+)?['"]([^'"]+)['"]"#,
                ReferenceSyntax::EsImport,
                false,
            ),
            rule(
                r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
                ReferenceSyntax::Require,
                false,
            ),
            rule(
                r#"export\s+(?:[\w{},*\s]+\s+)?from\s+['"]([^'"]+)['"]"#,
                ReferenceSyntax::EsImport,
                false,
            ),
        ],
        Language::CSharp => vec![rule(
            r"^\s*using\s+(?:static\s+)?([\w.]+)\s*;",
            ReferenceSyntax::Using,
            true,
        )],
        Language::VisualBasic => vec![rule(
            r"^\s*Imports\s+([\w.]+)",
            ReferenceSyntax::Imports,
            true,
        )],
        Language::Java => vec![rule(
            r"^\s*import\s+(?:static\s+)?([\w.]+)\s*;",
            ReferenceSyntax::Import,
            true,
        )],
        Language::Html => vec![
            rule(
                r#"<script[^>]*\bsrc\s*=\s*['"]([^'"]+)['"]"#,
                ReferenceSyntax::ScriptSrc,
                false,
            ),
            rule(
                r#"<link[^>]*\bhref\s*=\s*['"]([^'"]+)['"]"#,
                ReferenceSyntax::LinkHref,
                false,
            ),
        ],
        // Unknown languages contribute no candidates. Policy, not an error.
        Language::Unknown => Vec::new(),
    }
}

/// Extract raw references from a source file.
///
/// A bounded lexical scan, line by line, every rule applied to every line.
/// References are reported in order of appearance within each line.
/// Deterministic: re-scanning the same text always yields the same sequence.
pub fn extract(file: &SourceFile) -> Vec<RawReference> {
    let rules = rules_for(file.language);
    if rules.is_empty() {
        return Vec::new();
    }

    let mut references = Vec::new();
    for (idx, line) in file.content.lines().enumerate() {
        // A line can carry several references; collect every rule's matches
        // and order them by position so first appearance wins
        let mut found: Vec<(usize, RawReference)> = Vec::new();
        for rule in &rules {
            for captures in rule.pattern.captures_iter(line) {
                if let Some(m) = captures.get(1) {
                    let text = if rule.dotted {
                        m.as_str().replace('.', "/")
                    } else {
                        m.as_str().to_string()
                    };
                    debug!("Extracted reference '{}' at {}:{}", text, file.path, idx + 1);
                    found.push((m.start(), RawReference::new(text, idx + 1, rule.syntax)));
                }
            }
        }
        found.sort_by_key(|(start, _)| *start);
        references.extend(found.into_iter().map(|(_, reference)| reference));
    }

    references
}
