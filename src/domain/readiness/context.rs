//! Partial context handed to a dependent sub-problem.
//!
//! Computed on every read from a snapshot taken under the coordinator lock.

use std::collections::BTreeMap;

use serde::Serialize;

use super::config::ReadinessConfig;
use super::progress::SubProblemProgress;

/// What a sub-problem's dependencies have produced so far.
#[derive(Debug, Clone, Serialize)]
pub struct PartialContext {
    /// Progress snapshot per registered dependency.
    pub dependencies: BTreeMap<usize, SubProblemProgress>,
    /// Listed dependencies that were never registered.
    pub missing: Vec<usize>,
    /// Prompt-ready text.
    pub formatted: String,
    /// Every listed dependency is registered and ready.
    pub all_ready: bool,
    /// Every listed dependency is registered and complete.
    pub all_complete: bool,
}

impl PartialContext {
    /// Builds the context from snapshots of the listed dependencies.
    ///
    /// `snapshots` holds one entry per listed dependency, in listing order;
    /// `None` marks an unregistered index.
    pub(crate) fn build(
        snapshots: Vec<(usize, Option<SubProblemProgress>)>,
        config: &ReadinessConfig,
    ) -> Self {
        let mut dependencies = BTreeMap::new();
        let mut missing = Vec::new();
        let mut sections = Vec::new();
        let mut all_ready = true;
        let mut all_complete = true;

        for (index, snapshot) in snapshots {
            match snapshot {
                Some(progress) => {
                    all_ready &= progress.is_ready(config.early_start_threshold);
                    all_complete &= progress.is_complete;
                    sections.push(format_dependency(&progress, config));
                    dependencies.insert(index, progress);
                }
                None => {
                    all_ready = false;
                    all_complete = false;
                    missing.push(index);
                }
            }
        }

        Self {
            dependencies,
            missing,
            formatted: sections.join("\n\n"),
            all_ready,
            all_complete,
        }
    }
}

/// Formats one dependency, preferring the most conclusive output:
/// final recommendation, then recent insights, then the latest summary.
fn format_dependency(progress: &SubProblemProgress, config: &ReadinessConfig) -> String {
    let mut out = format!(
        "### Sub-problem {} ({}): {}\n",
        progress.index, progress.id, progress.goal
    );

    if progress.is_complete {
        out.push_str("Status: complete\n");
        match (&progress.recommendation, &progress.synthesis) {
            (Some(recommendation), _) => {
                out.push_str(&format!("Recommendation: {recommendation}"));
            }
            (None, Some(synthesis)) => {
                out.push_str(&format!(
                    "Synthesis: {}",
                    truncate(synthesis, config.summary_preview_chars)
                ));
            }
            (None, None) => out.push_str("No final output recorded."),
        }
        return out;
    }

    out.push_str(&format!(
        "Status: in progress (round {}/{})\n",
        progress.completed_rounds, progress.max_rounds
    ));

    let insights = progress.recent_insights(config.max_insights);
    if !insights.is_empty() {
        out.push_str("Early insights:");
        for insight in insights {
            out.push_str(&format!("\n- {insight}"));
        }
    } else if let Some(summary) = progress.latest_summary() {
        out.push_str(&format!(
            "Latest round summary: {}",
            truncate(summary, config.summary_preview_chars)
        ));
    } else {
        out.push_str("No output yet.");
    }
    out
}

/// Cuts `text` to at most `max_chars` characters, marking the cut.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
