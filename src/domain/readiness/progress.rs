//! Progress record for one registered sub-problem.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Everything a sub-problem has produced so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubProblemProgress {
    pub index: usize,
    pub id: String,
    pub goal: String,
    /// Last round number reported. Assigned as reported, not maxed.
    pub completed_rounds: u32,
    pub max_rounds: u32,
    pub round_summaries: Vec<String>,
    pub early_insights: Vec<String>,
    pub expert_panel: Vec<String>,
    pub is_complete: bool,
    pub synthesis: Option<String>,
    pub recommendation: Option<String>,
    pub registered_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SubProblemProgress {
    /// Fresh record with no rounds run.
    pub fn new(
        index: usize,
        id: impl Into<String>,
        goal: impl Into<String>,
        max_rounds: u32,
        expert_panel: Vec<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            index,
            id: id.into(),
            goal: goal.into(),
            completed_rounds: 0,
            max_rounds,
            round_summaries: Vec::new(),
            early_insights: Vec::new(),
            expert_panel,
            is_complete: false,
            synthesis: None,
            recommendation: None,
            registered_at: now,
            updated_at: now,
        }
    }

    /// Apply one finished round.
    pub fn record_round(&mut self, round_num: u32, summary: String, insights: Vec<String>) {
        self.round_summaries.push(summary);
        self.early_insights.extend(insights);
        self.completed_rounds = round_num;
        self.updated_at = Timestamp::now();
    }

    /// Store final outputs.
    pub fn complete(&mut self, synthesis: String, recommendation: Option<String>) {
        self.is_complete = true;
        self.synthesis = Some(synthesis);
        self.recommendation = recommendation;
        self.updated_at = Timestamp::now();
    }

    /// Whether dependents may start from this sub-problem's partial output.
    pub fn is_ready(&self, early_start_threshold: u32) -> bool {
        self.is_complete || self.completed_rounds >= early_start_threshold
    }

    /// Most recent round summary.
    pub fn latest_summary(&self) -> Option<&str> {
        self.round_summaries.last().map(String::as_str)
    }

    /// Up to `limit` most recent insights, oldest first.
    pub fn recent_insights(&self, limit: usize) -> &[String] {
        let start = self.early_insights.len().saturating_sub(limit);
        &self.early_insights[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> SubProblemProgress {
        SubProblemProgress::new(0, "sp-0", "Decide", 5, vec!["economist".to_string()])
    }

    #[test]
    fn new_record_is_not_ready() {
        let p = progress();
        assert_eq!(p.completed_rounds, 0);
        assert!(!p.is_ready(2));
        assert!(p.latest_summary().is_none());
    }

    #[test]
    fn record_round_assigns_round_number() {
        let mut p = progress();
        p.record_round(3, "third".to_string(), vec![]);
        p.record_round(2, "retry of second".to_string(), vec![]);

        assert_eq!(p.completed_rounds, 2);
        assert_eq!(p.round_summaries.len(), 2);
        assert_eq!(p.latest_summary(), Some("retry of second"));
    }

    #[test]
    fn completion_counts_as_ready() {
        let mut p = progress();
        p.complete("synthesis".to_string(), None);
        assert!(p.is_ready(2));
        assert!(p.is_complete);
    }

    #[test]
    fn recent_insights_keeps_newest() {
        let mut p = progress();
        p.record_round(
            1,
            "s".to_string(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
        );

        assert_eq!(p.recent_insights(3), &["b", "c", "d"]);
        assert_eq!(p.recent_insights(10).len(), 4);
    }
}
