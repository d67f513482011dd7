use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::bundle::ContextBudget;

/// Fatal conditions surfaced before any issue is processed. Everything else
/// is converted into a per-issue result and never aborts the batch.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Repository root is not a readable directory: {0}")]
    UnreadableRepositoryRoot(PathBuf),

    #[error("Generation config is unusable: {0}")]
    UnusableGenerationConfig(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sonar: SonarConfig,
    pub llm: LLMConfig,
    pub context: ContextConfig,
    pub output: OutputConfig,
}

/// Connection settings for the issue server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarConfig {
    pub base_url: String,
    pub token: String,
    pub project_key: String,

    /// Severities to fetch (empty means all)
    #[serde(default)]
    pub severities: Vec<String>,

    /// Hard cap on issues fetched per run
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,

    /// Page size for the search endpoint
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_max_issues() -> usize {
    50
}

fn default_page_size() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model_type: String,
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout: u64, // in seconds
    pub max_tokens: usize,
    pub temperature: f64,
}

/// Context assembly settings for one issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Path to the local checkout of the analyzed repository
    pub repository_root: PathBuf,

    #[serde(default = "default_max_related_files")]
    pub max_related_files: usize,

    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

fn default_max_related_files() -> usize {
    3
}

fn default_max_context_tokens() -> usize {
    8000
}

fn default_context_lines() -> usize {
    5
}

impl ContextConfig {
    pub fn budget(&self) -> ContextBudget {
        ContextBudget {
            max_files: self.max_related_files,
            max_tokens: self.max_context_tokens,
            context_lines: self.context_lines,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

impl Config {
    pub fn from_file(path: Option<&str>) -> Result<Self> {
        let path = path.unwrap_or("config.json");
        let file = File::open(path).context(format!("Failed to open config file: {}", path))?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Startup validation: the only fatal checks in the pipeline.
    pub fn validate(&self) -> std::result::Result<(), StartupError> {
        if !self.context.repository_root.is_dir() {
            return Err(StartupError::UnreadableRepositoryRoot(
                self.context.repository_root.clone(),
            ));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(StartupError::UnusableGenerationConfig(
                "API key is empty".to_string(),
            ));
        }
        if let Some(base_url) = &self.llm.base_url {
            if reqwest::Url::parse(base_url).is_err() {
                return Err(StartupError::UnusableGenerationConfig(format!(
                    "Invalid base URL: {}",
                    base_url
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sonar: SonarConfig {
                base_url: "http://localhost:9000".to_string(),
                token: String::new(),
                project_key: String::new(),
                severities: vec!["BLOCKER".to_string(), "CRITICAL".to_string(), "MAJOR".to_string()],
                max_issues: default_max_issues(),
                page_size: default_page_size(),
            },
            llm: LLMConfig {
                model_type: "anthropic".to_string(),
                model: "claude-3-5-sonnet-20241022".to_string(),
                api_key: String::new(),
                base_url: None,
                timeout: 60,
                max_tokens: 4096,
                temperature: 0.0,
            },
            context: ContextConfig {
                repository_root: PathBuf::from("."),
                max_related_files: default_max_related_files(),
                max_context_tokens: default_max_context_tokens(),
                context_lines: default_context_lines(),
            },
            output: OutputConfig {
                json_path: PathBuf::from("fix-results.json"),
                markdown_path: PathBuf::from("fix-results.md"),
            },
        }
    }
}
