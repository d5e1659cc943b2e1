//! Answer evaluation for multiple-choice and short-answer questions.
//!
//! MCQ answers are checked against both the option text and the option's
//! positional letter, since the generation API returns either form.
//! Short answers are matched approximately according to a configurable
//! [`ShortAnswerPolicy`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::option_letter;

/// Words that never count as significant in a short-answer reference.
pub static DEFAULT_STOP_WORDS: &[&str] = &[
    // articles
    "a", "an", "the",
    // auxiliary verbs
    "am", "is", "are", "was", "were", "be", "been", "being", "do", "does", "did", "has", "have",
    "had", "can", "could", "will", "would", "shall", "should", "may", "might", "must",
    // prepositions
    "of", "in", "on", "at", "to", "for", "by", "with", "from", "into", "onto", "about", "over",
    "under", "between", "through",
    // conjunctions and pronouns
    "and", "or", "but", "nor", "not", "so", "as", "if", "than", "then", "that", "this", "these",
    "those", "it", "its", "which", "who", "what", "when", "where",
];

/// Tokens shorter than this never count as significant.
pub const DEFAULT_MIN_SIGNIFICANT_LEN: usize = 3;

/// Trim surrounding whitespace and lower-case.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Check an MCQ selection.
///
/// Correct when the selected option's text, or its positional letter,
/// equals `correct_answer` after normalization. An out-of-range selection
/// is never correct.
pub fn evaluate_mcq(options: &[String], selected: usize, correct_answer: &str) -> bool {
    let Some(label) = options.get(selected) else {
        return false;
    };
    let correct = normalize(correct_answer);
    if normalize(label) == correct {
        return true;
    }
    normalize(&option_letter(selected).to_string()) == correct
}

/// How short answers are compared with their reference answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortAnswerPolicy {
    /// Normalized input must equal the normalized reference.
    ExactMatch,
    /// Exact match, or the input's first word is a significant word of the
    /// reference.
    #[default]
    FirstSignificantWord,
}

/// Evaluator settings, loaded from the `[evaluator]` config table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default)]
    pub policy: ShortAnswerPolicy,
    #[serde(default = "default_stop_words")]
    pub stop_words: BTreeSet<String>,
    #[serde(default = "default_min_significant_len")]
    pub min_significant_len: usize,
}

fn default_stop_words() -> BTreeSet<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_min_significant_len() -> usize {
    DEFAULT_MIN_SIGNIFICANT_LEN
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            policy: ShortAnswerPolicy::default(),
            stop_words: default_stop_words(),
            min_significant_len: default_min_significant_len(),
        }
    }
}

impl EvaluatorConfig {
    /// Config for the exact-match policy with default stop words.
    pub fn exact_match() -> Self {
        Self {
            policy: ShortAnswerPolicy::ExactMatch,
            ..Self::default()
        }
    }
}

/// Decides whether a response counts as correct.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        let stop_words = config.stop_words.iter().map(|w| normalize(w)).collect();
        Self {
            config: EvaluatorConfig {
                stop_words,
                ..config
            },
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Check an MCQ selection. See [`evaluate_mcq`].
    pub fn evaluate_mcq(&self, options: &[String], selected: usize, correct_answer: &str) -> bool {
        evaluate_mcq(options, selected, correct_answer)
    }

    /// Check a short answer under the configured policy.
    ///
    /// Blank input is never correct.
    pub fn evaluate_short_answer(&self, user_value: &str, correct_answer: &str) -> bool {
        let user = normalize(user_value);
        if user.is_empty() {
            return false;
        }
        if user == normalize(correct_answer) {
            return true;
        }
        match self.config.policy {
            ShortAnswerPolicy::ExactMatch => false,
            ShortAnswerPolicy::FirstSignificantWord => {
                let Some(first) = user.split_whitespace().next() else {
                    return false;
                };
                self.significant_tokens(correct_answer)
                    .iter()
                    .any(|t| t == first)
            }
        }
    }

    /// Normalized whitespace-delimited tokens of `text` that are long enough
    /// and not stop words.
    pub fn significant_tokens(&self, text: &str) -> Vec<String> {
        normalize(text)
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.config.min_significant_len)
            .filter(|t| !self.config.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }
}
