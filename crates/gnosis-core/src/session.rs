//! Quiz session state: responses, verdicts, and the running score.
//!
//! A session holds the current generation result and everything the user
//! has done with it. Each transition is synchronous and recomputes the
//! score before returning. Receiving a new result discards all prior state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::SessionError;
use crate::evaluator::Evaluator;
use crate::model::{option_letter, GenerationResult, QuestionKey, Quiz};

/// Per-question lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "correct", rename_all = "snake_case")]
pub enum QuestionState {
    Unanswered,
    Answered(bool),
}

/// What the user entered for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Index of the selected MCQ option.
    Selected(usize),
    /// Free text typed for a short answer.
    Text(String),
}

/// The outcome of one question, as shown in summaries and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// Question key, e.g. "mcq-0".
    pub key: String,
    pub question: String,
    /// The user's response rendered as text, if any.
    #[serde(default)]
    pub response: Option<String>,
    /// Human-readable correct answer.
    pub correct_answer: String,
    pub state: QuestionState,
}

/// Mutable state for one generation result.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    evaluator: Evaluator,
    result: Option<GenerationResult>,
    responses: BTreeMap<QuestionKey, Response>,
    verdicts: BTreeMap<QuestionKey, bool>,
    score: usize,
}

impl QuizSession {
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            evaluator,
            ..Default::default()
        }
    }

    /// Replace the current result and reset every response and verdict.
    #[instrument(level = "debug", skip_all, fields(mode = %result.mode()))]
    pub fn reset_on_new_result(&mut self, result: GenerationResult) {
        self.responses.clear();
        self.verdicts.clear();
        self.score = 0;
        self.result = Some(result);
        debug!(total = self.total(), "session reset for new result");
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    /// The current quiz, if the current result is one.
    pub fn quiz(&self) -> Option<&Quiz> {
        self.result.as_ref().and_then(GenerationResult::quiz)
    }

    /// Select an option for an MCQ and record the verdict.
    ///
    /// Re-selecting replaces the previous selection and verdict.
    pub fn apply_mcq_answer(&mut self, question: usize, option: usize) -> Result<bool, SessionError> {
        let key = QuestionKey::Mcq(question);
        let item = self
            .quiz()
            .and_then(|q| q.mcq.get(question))
            .ok_or(SessionError::UnknownQuestion(key))?;
        if option >= item.options.len() {
            return Err(SessionError::UnknownOption { key, option });
        }

        let correct = self
            .evaluator
            .evaluate_mcq(&item.options, option, &item.correct_answer);
        self.responses.insert(key, Response::Selected(option));
        self.record_verdict(key, correct);
        Ok(correct)
    }

    /// Update the typed text for a short answer without evaluating it.
    pub fn set_short_answer_draft(
        &mut self,
        question: usize,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        let key = QuestionKey::Short(question);
        self.require(key)?;
        self.responses.insert(key, Response::Text(value.into()));
        Ok(())
    }

    /// Evaluate the current draft of a short answer and record the verdict.
    ///
    /// A question with no draft is checked as blank input.
    pub fn apply_short_answer_check(&mut self, question: usize) -> Result<bool, SessionError> {
        let key = QuestionKey::Short(question);
        let item = self
            .quiz()
            .and_then(|q| q.short_answer.get(question))
            .ok_or(SessionError::UnknownQuestion(key))?;
        let draft = self.draft(question).unwrap_or_default();

        let correct = self
            .evaluator
            .evaluate_short_answer(draft, &item.correct_answer);
        self.record_verdict(key, correct);
        Ok(correct)
    }

    /// Number of questions currently judged correct.
    pub fn score(&self) -> usize {
        self.score
    }

    /// Number of gradable questions in the current result.
    pub fn total(&self) -> usize {
        self.quiz().map(Quiz::total).unwrap_or(0)
    }

    pub fn state(&self, key: QuestionKey) -> QuestionState {
        match self.verdicts.get(&key) {
            Some(&correct) => QuestionState::Answered(correct),
            None => QuestionState::Unanswered,
        }
    }

    pub fn selection(&self, question: usize) -> Option<usize> {
        match self.responses.get(&QuestionKey::Mcq(question)) {
            Some(Response::Selected(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn draft(&self, question: usize) -> Option<&str> {
        match self.responses.get(&QuestionKey::Short(question)) {
            Some(Response::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Outcomes for every question in display order.
    pub fn outcomes(&self) -> Vec<QuestionOutcome> {
        let Some(quiz) = self.quiz() else {
            return Vec::new();
        };

        let mcq = quiz.mcq.iter().enumerate().map(|(i, item)| {
            let response = self.selection(i).and_then(|s| {
                item.options
                    .get(s)
                    .map(|text| format!("{}. {}", option_letter(s), text))
            });
            QuestionOutcome {
                key: QuestionKey::Mcq(i).to_string(),
                question: item.question.clone(),
                response,
                correct_answer: item.display_answer(),
                state: self.state(QuestionKey::Mcq(i)),
            }
        });

        let short = quiz
            .short_answer
            .iter()
            .enumerate()
            .map(|(i, item)| QuestionOutcome {
                key: QuestionKey::Short(i).to_string(),
                question: item.question.clone(),
                response: self.draft(i).map(str::to_string),
                correct_answer: item.correct_answer.clone(),
                state: self.state(QuestionKey::Short(i)),
            });

        mcq.chain(short).collect()
    }

    fn require(&self, key: QuestionKey) -> Result<(), SessionError> {
        match self.quiz() {
            Some(quiz) if quiz.contains(key) => Ok(()),
            _ => Err(SessionError::UnknownQuestion(key)),
        }
    }

    fn record_verdict(&mut self, key: QuestionKey, correct: bool) {
        self.verdicts.insert(key, correct);
        self.recalc_score();
        debug!(%key, correct, score = self.score, total = self.total(), "answer evaluated");
    }

    fn recalc_score(&mut self) {
        let Some(quiz) = self.quiz() else {
            self.score = 0;
            return;
        };
        let score = quiz
            .keys()
            .filter(|k| self.verdicts.get(k).copied().unwrap_or(false))
            .count();
        self.score = score;
    }
}
