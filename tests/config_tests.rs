use std::fs;
use std::io::Write;

use issue_mender::config::{Config, StartupError};
use tempfile::{NamedTempFile, TempDir};

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.context.max_related_files, 3);
    assert_eq!(config.context.max_context_tokens, 8000);
    assert_eq!(config.context.context_lines, 5);
    assert_eq!(config.sonar.page_size, 100);
}

#[test]
fn budget_mirrors_context_config() {
    let config = Config::default();
    let budget = config.context.budget();
    assert_eq!(budget.max_files, 3);
    assert_eq!(budget.max_tokens, 8000);
    assert_eq!(budget.context_lines, 5);
}

#[test]
fn loads_config_from_file_with_defaults_filled_in() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "sonar": {{
                "base_url": "https://sonar.example.com",
                "token": "squ_abc",
                "project_key": "my-project"
            }},
            "llm": {{
                "model_type": "anthropic",
                "model": "claude-3-5-sonnet-20241022",
                "api_key": "sk-test",
                "base_url": null,
                "timeout": 60,
                "max_tokens": 4096,
                "temperature": 0.0
            }},
            "context": {{
                "repository_root": "/tmp"
            }},
            "output": {{
                "json_path": "out.json",
                "markdown_path": "out.md"
            }}
        }}"#
    )
    .unwrap();

    let config = Config::from_file(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.sonar.project_key, "my-project");
    // Omitted keys fall back to the documented defaults
    assert_eq!(config.context.max_related_files, 3);
    assert_eq!(config.context.max_context_tokens, 8000);
    assert_eq!(config.sonar.max_issues, 50);
}

#[test]
fn missing_config_file_is_an_error() {
    assert!(Config::from_file(Some("/nonexistent/config.json")).is_err());
}

#[test]
fn validate_rejects_missing_repository_root() {
    let mut config = Config::default();
    config.llm.api_key = "sk-test".to_string();
    config.context.repository_root = "/definitely/not/a/real/dir".into();

    match config.validate() {
        Err(StartupError::UnreadableRepositoryRoot(_)) => {}
        other => panic!("expected unreadable repository root, got {:?}", other),
    }
}

#[test]
fn validate_rejects_empty_api_key() {
    let repo = TempDir::new().unwrap();
    let mut config = Config::default();
    config.context.repository_root = repo.path().to_path_buf();
    config.llm.api_key = "  ".to_string();

    match config.validate() {
        Err(StartupError::UnusableGenerationConfig(_)) => {}
        other => panic!("expected unusable generation config, got {:?}", other),
    }
}

#[test]
fn validate_rejects_unparseable_base_url() {
    let repo = TempDir::new().unwrap();
    let mut config = Config::default();
    config.context.repository_root = repo.path().to_path_buf();
    config.llm.api_key = "sk-test".to_string();
    config.llm.base_url = Some("not a url".to_string());

    assert!(config.validate().is_err());
}

#[test]
fn validate_accepts_a_usable_config() {
    let repo = TempDir::new().unwrap();
    fs::write(repo.path().join("marker"), "x").unwrap();
    let mut config = Config::default();
    config.context.repository_root = repo.path().to_path_buf();
    config.llm.api_key = "sk-test".to_string();

    assert!(config.validate().is_ok());
}
