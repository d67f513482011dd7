use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;

use crate::models::fix::{FixOutcome, FixResult};
use crate::stages::fix::BatchSummary;

/// Write the batch results as pretty-printed JSON.
pub fn write_json(summary: &BatchSummary, path: &Path) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create report file: {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &summary.results)
        .context("Failed to serialize results")?;
    info!("Wrote JSON report to {:?}", path);
    Ok(())
}

/// Write a Markdown summary of the batch.
pub fn write_markdown(summary: &BatchSummary, path: &Path) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create report file: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# Fix Report")?;
    writeln!(writer)?;
    writeln!(writer, "Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{} issues processed: {} fixed, {} failed. Token usage: {}.",
        summary.results.len(),
        summary.fixed,
        summary.failed,
        summary.usage
    )?;

    for result in &summary.results {
        writeln!(writer)?;
        writeln!(
            writer,
            "## {} — {}:{}",
            result.issue_key, result.file_path, result.line
        )?;
        writeln!(writer)?;
        writeln!(writer, "Rule `{}`: {}", result.rule, result.message)?;
        writeln!(writer)?;

        match &result.outcome {
            FixOutcome::Fixed(payload) => {
                writeln!(writer, "**Confidence:** {:?}", payload.confidence)?;
                writeln!(writer)?;
                writeln!(writer, "{}", payload.explanation)?;
                writeln!(writer)?;
                writeln!(writer, "```")?;
                writeln!(writer, "{}", payload.fixed_code.trim_end_matches('\n'))?;
                writeln!(writer, "```")?;
                if !payload.suggested_comment.is_empty() {
                    writeln!(writer)?;
                    writeln!(writer, "> {}", payload.suggested_comment)?;
                }
            }
            FixOutcome::Failed { kind, detail } => {
                writeln!(writer, "**Failed** ({:?}): {}", kind, detail)?;
            }
        }
    }

    writer.flush()?;
    info!("Wrote Markdown report to {:?}", path);
    Ok(())
}

/// Write both report formats.
pub fn write_reports(summary: &BatchSummary, json_path: &Path, markdown_path: &Path) -> Result<()> {
    write_json(summary, json_path)?;
    write_markdown(summary, markdown_path)?;
    Ok(())
}

/// One-line rendering of a result for log output.
pub fn one_line_summary(result: &FixResult) -> String {
    match &result.outcome {
        FixOutcome::Fixed(payload) => format!(
            "{} {}:{} fixed ({:?})",
            result.issue_key, result.file_path, result.line, payload.confidence
        ),
        FixOutcome::Failed { kind, .. } => format!(
            "{} {}:{} failed ({:?})",
            result.issue_key, result.file_path, result.line, kind
        ),
    }
}
