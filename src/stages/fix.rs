use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::sync::Notify;

use crate::config::Config;
use crate::context::{graph, selector};
use crate::llm::client::{LLMClient, TokenUsage};
use crate::llm::prompts::{build_fix_user_prompt, FIX_SYSTEM_PROMPT};
use crate::models::bundle::{ContextBudget, ContextBundle};
use crate::models::fix::{
    bounded_excerpt, Confidence, FixErrorKind, FixOutcome, FixPayload, FixResult,
};
use crate::models::issue::Issue;
use crate::models::source::SourceFile;
use crate::utils::json_utils::extract_json_object;

/// Cooperative cancellation for an in-flight batch. Aborting between issues
/// never corrupts already-recorded results; an issue cancelled mid-call is
/// recorded as a generation failure with reason "cancelled".
#[derive(Clone, Default)]
pub struct CancelFlag {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a waiter that registers after this
        // call still wakes immediately
        self.inner.notify.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    async fn cancelled(&self) {
        while !self.is_cancelled() {
            self.inner.notify.notified().await;
        }
    }
}

/// The schema the generation service is instructed to respond with.
/// Confidence arrives as a free string and is coerced after parsing.
#[derive(Debug, Deserialize)]
struct RawFixPayload {
    explanation: String,
    fixed_code: String,
    confidence: String,
    suggested_comment: String,
}

/// Parse a generation response into a fix payload.
///
/// Tries the text as-is first; on failure applies one repair pass (strip
/// fenced-code delimiters and surrounding prose, extract the outermost
/// JSON object) and re-parses once. No further retries.
pub fn parse_fix_response(raw: &str, tokens_used: usize) -> Result<FixPayload> {
    let parsed: RawFixPayload = match serde_json::from_str(raw.trim()) {
        Ok(parsed) => parsed,
        Err(first_err) => {
            debug!("Direct parse failed ({}), attempting repair pass", first_err);
            let repaired = extract_json_object(raw)?;
            serde_json::from_str(&repaired)?
        }
    };

    Ok(FixPayload {
        explanation: parsed.explanation,
        fixed_code: parsed.fixed_code,
        confidence: Confidence::from_label(&parsed.confidence),
        suggested_comment: parsed.suggested_comment,
        tokens_used,
    })
}

fn failed_result(issue: &Issue, kind: FixErrorKind, detail: String) -> FixResult {
    FixResult {
        issue_key: issue.key.clone(),
        file_path: issue.file_path().to_string(),
        line: issue.line_or_first(),
        rule: issue.rule.clone(),
        message: issue.message.clone(),
        outcome: FixOutcome::Failed { kind, detail },
    }
}

/// Assemble the context bundle for one issue from the local checkout.
pub fn build_context(
    issue: &Issue,
    source: &SourceFile,
    budget: &ContextBudget,
    repo_root: &Path,
) -> ContextBundle {
    let candidates = graph::build_candidates(source, repo_root);
    selector::select(
        &candidates,
        source,
        issue.line_or_first(),
        budget,
        repo_root,
    )
}

/// Process one issue: build the request, invoke the generation service
/// once, validate/repair the response.
///
/// Every failure is converted into the result's error descriptor; this
/// function never propagates an error to the batch.
pub async fn process_issue(
    issue: &Issue,
    bundle: &ContextBundle,
    client: &dyn LLMClient,
    config: &Config,
    cancel: &CancelFlag,
) -> (FixResult, TokenUsage) {
    let user_prompt = build_fix_user_prompt(issue, bundle);

    let response = tokio::select! {
        response = client.completion(
            FIX_SYSTEM_PROMPT,
            &user_prompt,
            config.llm.max_tokens,
            config.llm.temperature,
        ) => response,
        _ = cancel.cancelled() => {
            return (
                failed_result(issue, FixErrorKind::GenerationFailed, "cancelled".to_string()),
                TokenUsage::default(),
            );
        }
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!("Generation failed for {}: {:#}", issue.key, e);
            return (
                failed_result(issue, FixErrorKind::GenerationFailed, format!("{:#}", e)),
                TokenUsage::default(),
            );
        }
    };

    let usage = response.usage;
    let result = match parse_fix_response(&response.content, usage.total_tokens) {
        Ok(payload) => FixResult {
            issue_key: issue.key.clone(),
            file_path: issue.file_path().to_string(),
            line: issue.line_or_first(),
            rule: issue.rule.clone(),
            message: issue.message.clone(),
            outcome: FixOutcome::Fixed(payload),
        },
        Err(e) => {
            warn!("Malformed response for {}: {:#}", issue.key, e);
            failed_result(
                issue,
                FixErrorKind::MalformedResponse,
                bounded_excerpt(&response.content),
            )
        }
    };

    (result, usage)
}

/// Aggregate outcome of one batch run.
pub struct BatchSummary {
    pub results: Vec<FixResult>,
    pub usage: TokenUsage,
    pub fixed: usize,
    pub failed: usize,
}

/// Run the pipeline over a batch of issues, one at a time.
///
/// Issues share no mutable state; the only cross-issue state is the
/// append-only result collection and the aggregate counters owned here.
/// A cancelled batch stops between issues with all recorded results intact.
pub async fn run_batch(
    config: &Config,
    issues: &[Issue],
    client: &dyn LLMClient,
    cancel: &CancelFlag,
) -> BatchSummary {
    let repo_root = &config.context.repository_root;
    let budget = config.context.budget();

    info!(
        "Processing {} issues with {} (budget: {} files, {} tokens)",
        issues.len(),
        client.name(),
        budget.max_files,
        budget.max_tokens
    );

    let progress_bar = ProgressBar::new(issues.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap(),
    );

    let mut results = Vec::new();
    let mut usage = TokenUsage::default();

    for issue in issues {
        if cancel.is_cancelled() {
            info!("Batch cancelled after {} issues", results.len());
            break;
        }

        let file_path = issue.file_path().to_string();
        let full_path = repo_root.join(&file_path);

        let (result, issue_usage) = match fs::read_to_string(&full_path) {
            Ok(content) => {
                let source = SourceFile::new(file_path.clone(), content);
                let bundle = build_context(issue, &source, &budget, repo_root);
                process_issue(issue, &bundle, client, config, cancel).await
            }
            Err(e) => {
                warn!("Cannot read flagged file {:?}: {}", full_path, e);
                (
                    failed_result(
                        issue,
                        FixErrorKind::GenerationFailed,
                        format!("Failed to read flagged file {:?}: {}", full_path, e),
                    ),
                    TokenUsage::default(),
                )
            }
        };

        usage.add(&issue_usage);
        progress_bar.inc(1);
        progress_bar.set_message(format!("Processed: {}", file_path));
        results.push(result);
    }

    progress_bar.finish_with_message("Batch complete");

    let fixed = results.iter().filter(|r| r.is_fixed()).count();
    let failed = results.len() - fixed;
    let cost = client.calculate_cost(&usage);
    info!(
        "Batch finished: {} fixed, {} failed, usage {}, cost {}",
        fixed, failed, usage, cost
    );

    BatchSummary {
        results,
        usage,
        fixed,
        failed,
    }
}
