use std::fs;
use std::path::{Path, PathBuf};

use issue_mender::context::resolver::resolve;
use issue_mender::models::reference::{RawReference, ReferenceSyntax};
use tempfile::TempDir;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "content\n").unwrap();
}

#[test]
fn resolves_relative_path_with_extension_search() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "src/b.py");

    let reference = RawReference::new("./b", 1, ReferenceSyntax::Require);
    let resolved = resolve(&reference, Path::new("src/a.py"), repo.path());
    assert_eq!(resolved, Some(PathBuf::from("src/b.py")));
}

#[test]
fn resolves_literal_path_before_extensions() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "src/utils/validate.js");

    let reference = RawReference::new("./utils/validate.js", 1, ReferenceSyntax::EsImport);
    let resolved = resolve(&reference, Path::new("src/app.js"), repo.path());
    assert_eq!(resolved, Some(PathBuf::from("src/utils/validate.js")));
}

#[test]
fn resolves_parent_relative_path() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "lib/y.ts");

    let reference = RawReference::new("../lib/y", 1, ReferenceSyntax::EsImport);
    let resolved = resolve(&reference, Path::new("src/app.ts"), repo.path());
    assert_eq!(resolved, Some(PathBuf::from("lib/y.ts")));
}

#[test]
fn resolves_dotted_namespace_under_root() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "Company/Models.cs");

    // Extraction already normalized Company.Models to Company/Models
    let reference = RawReference::new("Company/Models", 1, ReferenceSyntax::Using);
    let resolved = resolve(&reference, Path::new("App.cs"), repo.path());
    assert_eq!(resolved, Some(PathBuf::from("Company/Models.cs")));
}

#[test]
fn resolves_rooted_markup_reference_against_root() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "js/app.js");

    let reference = RawReference::new("/js/app.js", 1, ReferenceSyntax::ScriptSrc);
    let resolved = resolve(&reference, Path::new("pages/index.html"), repo.path());
    assert_eq!(resolved, Some(PathBuf::from("js/app.js")));
}

#[test]
fn markup_reference_is_same_directory_relative() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "pages/js/app.js");

    let reference = RawReference::new("js/app.js", 1, ReferenceSyntax::ScriptSrc);
    let resolved = resolve(&reference, Path::new("pages/index.html"), repo.path());
    assert_eq!(resolved, Some(PathBuf::from("pages/js/app.js")));
}

#[test]
fn missing_file_resolves_to_none() {
    let repo = TempDir::new().unwrap();

    let reference = RawReference::new("./missing", 1, ReferenceSyntax::Require);
    assert_eq!(resolve(&reference, Path::new("src/a.py"), repo.path()), None);
}

#[test]
fn url_reference_resolves_to_none() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "cdn/lib.js");

    let reference = RawReference::new(
        "https://cdn.example.com/lib.js",
        1,
        ReferenceSyntax::ScriptSrc,
    );
    assert_eq!(
        resolve(&reference, Path::new("index.html"), repo.path()),
        None
    );
}

#[test]
fn bare_module_specifier_resolves_to_none() {
    let repo = TempDir::new().unwrap();
    // A same-named local file must not shadow a package import
    touch(repo.path(), "src/react.js");

    let reference = RawReference::new("react", 1, ReferenceSyntax::EsImport);
    assert_eq!(resolve(&reference, Path::new("src/app.js"), repo.path()), None);
}

#[test]
fn resolved_path_exists_and_is_readable() {
    let repo = TempDir::new().unwrap();
    touch(repo.path(), "src/b.py");

    let reference = RawReference::new("./b", 1, ReferenceSyntax::Require);
    let resolved = resolve(&reference, Path::new("src/a.py"), repo.path()).unwrap();
    assert!(fs::read_to_string(repo.path().join(resolved)).is_ok());
}
