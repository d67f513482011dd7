/// The syntactic form a reference was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSyntax {
    /// C# `using X.Y;`
    Using,
    /// VB `Imports X.Y`
    Imports,
    /// Python/Java `import X.Y` / `from X import Y`
    Import,
    /// JS/TS `require('./x')`
    Require,
    /// JS/TS `import ... from './x'`
    EsImport,
    /// HTML `<script src="...">`
    ScriptSrc,
    /// HTML `<link href="...">`
    LinkHref,
}

/// A raw reference string extracted from a source file.
///
/// Ephemeral: produced by one extraction pass and consumed by the resolver.
/// Dotted references arrive with separators already normalized to `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    /// The reference text (a relative path or a dot-path turned into `/`)
    pub text: String,

    /// 1-based line the reference was found on
    pub line: usize,

    /// The syntax that produced it
    pub syntax: ReferenceSyntax,
}

impl RawReference {
    pub fn new(text: impl Into<String>, line: usize, syntax: ReferenceSyntax) -> Self {
        Self {
            text: text.into(),
            line,
            syntax,
        }
    }

    /// Whether the reference text is a path (relative or rooted) rather than
    /// a translated namespace.
    pub fn is_path_like(&self) -> bool {
        matches!(
            self.syntax,
            ReferenceSyntax::Require
                | ReferenceSyntax::EsImport
                | ReferenceSyntax::ScriptSrc
                | ReferenceSyntax::LinkHref
        )
    }
}
