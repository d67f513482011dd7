use std::path::Path;

use serde::{Deserialize, Serialize};

/// Language tag derived from a file extension.
///
/// This is a closed enumeration: every extraction rule set and test-naming
/// convention table matches on it exhaustively, with `Unknown` as the
/// explicit "contributes nothing" default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    CSharp,
    VisualBasic,
    Java,
    Html,
    Unknown,
}

impl Language {
    /// Derive the language tag from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => Language::Python,
            Some("js") | Some("jsx") | Some("mjs") => Language::JavaScript,
            Some("ts") | Some("tsx") => Language::TypeScript,
            Some("cs") => Language::CSharp,
            Some("vb") => Language::VisualBasic,
            Some("java") => Language::Java,
            Some("html") | Some("htm") | Some("cshtml") => Language::Html,
            _ => Language::Unknown,
        }
    }

    /// Extensions tried when resolving a reference that originates from a
    /// file of this language, in resolution order.
    pub fn resolution_extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::JavaScript => &["js", "jsx", "mjs", "json"],
            Language::TypeScript => &["ts", "tsx", "d.ts", "js"],
            Language::CSharp => &["cs"],
            Language::VisualBasic => &["vb"],
            Language::Java => &["java"],
            Language::Html => &["js", "css", "html"],
            Language::Unknown => &[],
        }
    }
}

/// A source file read from the repository under analysis.
///
/// Immutable once read; owned by the pipeline invocation that read it and
/// discarded after the issue is processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the repository root
    pub path: String,

    /// Language tag derived from the extension
    pub language: Language,

    /// Full text of the file
    pub content: String,
}

impl SourceFile {
    pub fn new(path: String, content: String) -> Self {
        let language = Language::from_path(Path::new(&path));
        Self {
            path,
            language,
            content,
        }
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension() {
        assert_eq!(Language::from_path(Path::new("a/b.py")), Language::Python);
        assert_eq!(Language::from_path(Path::new("x.tsx")), Language::TypeScript);
        assert_eq!(Language::from_path(Path::new("Page.cshtml")), Language::Html);
        assert_eq!(Language::from_path(Path::new("README")), Language::Unknown);
    }

    #[test]
    fn source_file_derives_language() {
        let file = SourceFile::new("src/app.cs".to_string(), "class App {}".to_string());
        assert_eq!(file.language, Language::CSharp);
        assert_eq!(file.line_count(), 1);
    }
}
