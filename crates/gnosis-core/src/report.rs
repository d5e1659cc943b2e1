//! Session reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluator::ShortAnswerPolicy;
use crate::session::{QuestionOutcome, QuestionState, QuizSession};

/// A snapshot of a graded quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Short-answer policy the session was graded with.
    pub policy: ShortAnswerPolicy,
    /// Questions judged correct.
    pub score: usize,
    /// Gradable questions.
    pub total: usize,
    /// Questions that were never checked.
    pub unanswered: usize,
    pub outcomes: Vec<QuestionOutcome>,
}

impl SessionReport {
    /// Build a report from the current state of a session.
    pub fn from_session(session: &QuizSession) -> Self {
        let outcomes = session.outcomes();
        let unanswered = outcomes
            .iter()
            .filter(|o| o.state == QuestionState::Unanswered)
            .count();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            policy: session.evaluator().config().policy,
            score: session.score(),
            total: session.total(),
            unanswered,
            outcomes,
        }
    }

    /// Fraction of questions answered correctly (0.0 for an empty quiz).
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 / self.total as f64 * 100.0
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
