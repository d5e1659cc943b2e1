//! The `gnosis grade` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use gnosis_client::config::load_config_from;
use gnosis_core::model::parse_option_choice;
use gnosis_core::parser::load_result_file;
use gnosis_core::report::SessionReport;
use gnosis_core::session::{QuestionState, QuizSession};

/// Answers for a saved quiz, keyed by position.
#[derive(Debug, Default, Deserialize)]
pub struct AnswerSheet {
    #[serde(default)]
    pub mcq: Vec<Option<McqChoice>>,
    #[serde(default)]
    pub short_answer: Vec<Option<String>>,
}

/// An MCQ answer: a 0-based index, or a letter / 1-based number as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum McqChoice {
    Index(usize),
    Label(String),
}

impl AnswerSheet {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answer sheet: {}", path.display()))
    }
}

/// Apply every answer on the sheet to the session.
///
/// Entries past the end of the quiz and unparseable choices are skipped
/// with a warning; the question stays unanswered.
pub fn apply_sheet(session: &mut QuizSession, sheet: &AnswerSheet) {
    for (i, choice) in sheet.mcq.iter().enumerate() {
        let Some(choice) = choice else { continue };
        let option_count = session
            .quiz()
            .and_then(|q| q.mcq.get(i))
            .map(|item| item.options.len())
            .unwrap_or(0);
        let index = match choice {
            McqChoice::Index(idx) => Some(*idx),
            McqChoice::Label(label) => parse_option_choice(label, option_count),
        };
        let Some(index) = index else {
            tracing::warn!(question = i, ?choice, "unrecognized mcq choice");
            continue;
        };
        if let Err(e) = session.apply_mcq_answer(i, index) {
            tracing::warn!(question = i, "skipping mcq answer: {e}");
        }
    }

    for (i, text) in sheet.short_answer.iter().enumerate() {
        let Some(text) = text else { continue };
        let checked = session
            .set_short_answer_draft(i, text.as_str())
            .and_then(|()| session.apply_short_answer_check(i));
        if let Err(e) = checked {
            tracing::warn!(question = i, "skipping short answer: {e}");
        }
    }
}

pub fn execute(
    result_path: PathBuf,
    answers_path: PathBuf,
    report_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let result = load_result_file(&result_path)?;
    let sheet = AnswerSheet::load(&answers_path)?;

    let mut session = QuizSession::new(config.create_evaluator());
    session.reset_on_new_result(result);
    apply_sheet(&mut session, &sheet);

    let report = SessionReport::from_session(&session);
    print_table(&report);
    println!(
        "Score: {} / {} ({:.1}%)",
        report.score,
        report.total,
        report.percentage()
    );

    if let Some(path) = report_path {
        report.save_json(&path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_table(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    if report.outcomes.is_empty() {
        println!("No gradable questions.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Question", "Your answer", "Correct answer", "Result"]);

    for outcome in &report.outcomes {
        let verdict = match outcome.state {
            QuestionState::Answered(true) => "correct",
            QuestionState::Answered(false) => "incorrect",
            QuestionState::Unanswered => "-",
        };
        table.add_row(vec![
            Cell::new(&outcome.key),
            Cell::new(outcome.response.as_deref().unwrap_or("")),
            Cell::new(&outcome.correct_answer),
            Cell::new(verdict),
        ]);
    }

    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnosis_core::model::{
        GenerationResult, McqItem, QuestionKey, Quiz, QuizResult, ShortAnswerItem,
    };

    fn session() -> QuizSession {
        let mut session = QuizSession::default();
        session.reset_on_new_result(GenerationResult::Quiz(QuizResult {
            quiz: Quiz {
                mcq: vec![
                    McqItem {
                        question: "Which structure links nodes?".into(),
                        options: vec!["Array".into(), "Linked List".into(), "Tree".into()],
                        correct_answer: "B".into(),
                    },
                    McqItem {
                        question: "Which is LIFO?".into(),
                        options: vec!["Queue".into(), "Stack".into()],
                        correct_answer: "Stack".into(),
                    },
                ],
                short_answer: vec![ShortAnswerItem {
                    question: "Stack order".into(),
                    correct_answer: "LIFO".into(),
                }],
            },
            warning: None,
        }));
        session
    }

    fn sheet(json: &str) -> AnswerSheet {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn mixed_choice_forms() {
        let mut s = session();
        apply_sheet(&mut s, &sheet(r#"{"mcq": [1, "b"], "short_answer": ["lifo"]}"#));
        assert_eq!(s.selection(0), Some(1));
        assert_eq!(s.selection(1), Some(1));
        assert_eq!(s.score(), 3);
    }

    #[test]
    fn nulls_and_missing_stay_unanswered() {
        let mut s = session();
        apply_sheet(&mut s, &sheet(r#"{"mcq": [null, "2"]}"#));
        assert_eq!(s.state(QuestionKey::Mcq(0)), QuestionState::Unanswered);
        assert_eq!(s.state(QuestionKey::Short(0)), QuestionState::Unanswered);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn out_of_range_entries_are_skipped() {
        let mut s = session();
        apply_sheet(
            &mut s,
            &sheet(r#"{"mcq": [7, "z", "A"], "short_answer": ["lifo", "extra"]}"#),
        );
        assert_eq!(s.state(QuestionKey::Mcq(0)), QuestionState::Unanswered);
        assert_eq!(s.state(QuestionKey::Mcq(1)), QuestionState::Unanswered);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn empty_sheet() {
        let mut s = session();
        apply_sheet(&mut s, &sheet("{}"));
        assert_eq!(s.score(), 0);
        assert_eq!(s.total(), 3);
    }
}
