use serde::{Deserialize, Serialize};

/// Maximum length of the raw-response excerpt kept on a malformed result.
pub const RAW_EXCERPT_MAX_CHARS: usize = 400;

/// Confidence label attached to a generated fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Parse a label, coercing anything unrecognized to `Low`. A strange
    /// label is never grounds for rejecting an otherwise valid fix.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            "low" => Confidence::Low,
            _ => Confidence::Low,
        }
    }
}

/// A validated fix returned by the generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixPayload {
    pub explanation: String,
    pub fixed_code: String,
    pub confidence: Confidence,
    pub suggested_comment: String,
    /// Token usage reported by the service, propagated unmodified
    #[serde(default)]
    pub tokens_used: usize,
}

/// Why an issue produced no usable fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixErrorKind {
    /// The response could not be parsed as the fix schema, even after the
    /// repair pass
    MalformedResponse,
    /// The generation call itself failed (transport, timeout, cancellation)
    GenerationFailed,
}

/// Outcome of one issue. Immutable once created; owned by the caller's
/// result collection until persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResult {
    pub issue_key: String,
    pub file_path: String,
    pub line: usize,
    pub rule: String,
    pub message: String,
    pub outcome: FixOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixOutcome {
    Fixed(FixPayload),
    Failed {
        kind: FixErrorKind,
        /// Failure message or a bounded excerpt of the raw response
        detail: String,
    },
}

impl FixResult {
    pub fn is_fixed(&self) -> bool {
        matches!(self.outcome, FixOutcome::Fixed(_))
    }
}

/// Bound a raw response to an excerpt suitable for a FixResult.
pub fn bounded_excerpt(raw: &str) -> String {
    if raw.chars().count() <= RAW_EXCERPT_MAX_CHARS {
        raw.to_string()
    } else {
        raw.chars().take(RAW_EXCERPT_MAX_CHARS).collect()
    }
}
