use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::models::reference::{RawReference, ReferenceSyntax};
use crate::models::source::Language;

/// Collapse `.` and `..` components of a repo-relative path. Returns None
/// when the path escapes the repository root.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<std::ffi::OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return None;
                }
            }
            Component::Normal(p) => parts.push(p.to_os_string()),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.iter().collect())
}

/// Try a repo-relative path literally, then with each extension appropriate
/// to the origin file's language. Returns the first candidate that exists.
fn try_with_extensions(
    repo_root: &Path,
    relative: &Path,
    language: Language,
) -> Option<PathBuf> {
    if repo_root.join(relative).is_file() {
        return Some(relative.to_path_buf());
    }

    for ext in language.resolution_extensions() {
        let candidate = PathBuf::from(format!("{}.{}", relative.display(), ext));
        if repo_root.join(&candidate).is_file() {
            return Some(candidate);
        }
    }

    None
}

/// Map a raw reference to an existing repository file, if any.
///
/// `origin_file` is the repo-relative path of the file the reference came
/// from. Returns a repo-relative path. Failure to resolve is expected noise
/// over an uncontrolled codebase and must never abort the pipeline; callers
/// drop a `None` silently.
pub fn resolve(
    reference: &RawReference,
    origin_file: &Path,
    repo_root: &Path,
) -> Option<PathBuf> {
    let text = reference.text.as_str();

    // URLs are never repository files
    if text.contains("://") || text.starts_with("//") {
        return None;
    }

    let language = Language::from_path(origin_file);
    let origin_dir = origin_file.parent().unwrap_or_else(|| Path::new(""));

    let explicit_relative = text.starts_with("./") || text.starts_with("../");
    let markup = matches!(
        reference.syntax,
        ReferenceSyntax::ScriptSrc | ReferenceSyntax::LinkHref
    );

    let relative = if let Some(rooted) = text.strip_prefix('/') {
        // Rooted: resolve against the repository root
        normalize(Path::new(rooted))?
    } else if explicit_relative || markup {
        // Relative (markup references are same-directory-relative even
        // without a ./ prefix): resolve against the origin file's directory
        normalize(&origin_dir.join(text))?
    } else if reference.is_path_like() {
        // Bare module specifier (e.g. a package name): not a repository file
        return None;
    } else {
        // Dotted/namespaced, already separator-normalized: under the root
        normalize(Path::new(text))?
    };

    let resolved = try_with_extensions(repo_root, &relative, language);
    match &resolved {
        Some(path) => debug!("Resolved '{}' -> {:?}", text, path),
        None => debug!("Could not resolve '{}' from {:?}", text, origin_file),
    }
    resolved
}
