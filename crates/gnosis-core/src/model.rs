//! Core data model types for gnosis.
//!
//! These types mirror what the generation API accepts and returns: the
//! learning request, and either a quiz (multiple-choice and short-answer
//! questions) or a block of study notes.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GenerationError;
use crate::evaluator::normalize;

/// What the generation API should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Quiz,
    Notes,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Quiz => write!(f, "quiz"),
            Mode::Notes => write!(f, "notes"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quiz" => Ok(Mode::Quiz),
            "notes" => Ok(Mode::Notes),
            other => Err(format!("unknown mode: {other} (expected 'quiz' or 'notes')")),
        }
    }
}

/// A PDF uploaded alongside the request.
#[derive(Clone)]
pub struct FileUpload {
    /// File name sent in the multipart form (e.g. "lecture-3.pdf").
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

impl FileUpload {
    /// Read a file from disk, keeping only its file name for the upload.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read upload: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// A single learning request submitted to the generation API.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub mode: Mode,
    /// Natural-language instruction, e.g. "quiz me on stack operations".
    pub user_request: String,
    pub topic: Option<String>,
    /// Pasted notes or other source material.
    pub text_input: Option<String>,
    pub file: Option<FileUpload>,
}

impl GenerationRequest {
    /// Check the request against the API's input contract before sending it.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let has_request = !self.user_request.trim().is_empty();
        let has_text = self
            .text_input
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());

        if !has_request && !has_text && self.file.is_none() {
            return Err(GenerationError::InvalidRequest(
                "provide a PDF, text input, or a request".into(),
            ));
        }

        if let Some(file) = &self.file {
            if !file.file_name.to_lowercase().ends_with(".pdf") {
                return Err(GenerationError::InvalidRequest(format!(
                    "only PDF files are supported, got '{}'",
                    file.file_name
                )));
            }
        }

        Ok(())
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McqItem {
    #[serde(default, deserialize_with = "loose_string")]
    pub question: String,
    /// Options in display order; labeled A, B, C… by position.
    #[serde(default, deserialize_with = "loose_strings")]
    pub options: Vec<String>,
    /// Either the full text of the correct option or its letter.
    #[serde(default, deserialize_with = "loose_string")]
    pub correct_answer: String,
}

/// How an MCQ's `correct_answer` resolves against its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKey {
    /// The answer is the text of the option at this index.
    OptionText(usize),
    /// The answer is a positional letter naming this index.
    Letter(usize),
    /// Neither option text nor letter matches; no selection can be correct
    /// except through an accidental text match.
    Unresolved,
}

impl McqItem {
    /// Classify `correct_answer` as option text or positional letter.
    ///
    /// Option text wins when both readings are possible.
    pub fn answer_key(&self) -> AnswerKey {
        let correct = normalize(&self.correct_answer);
        if let Some(i) = self.options.iter().position(|o| normalize(o) == correct) {
            return AnswerKey::OptionText(i);
        }
        let mut chars = correct.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_lowercase() {
                let idx = (c as u8 - b'a') as usize;
                if idx < self.options.len() {
                    return AnswerKey::Letter(idx);
                }
            }
        }
        AnswerKey::Unresolved
    }

    /// Index of the correct option, if it can be resolved.
    pub fn correct_index(&self) -> Option<usize> {
        match self.answer_key() {
            AnswerKey::OptionText(i) | AnswerKey::Letter(i) => Some(i),
            AnswerKey::Unresolved => None,
        }
    }

    /// Human-readable correct answer, e.g. "B. Linked List".
    pub fn display_answer(&self) -> String {
        match self.correct_index() {
            Some(i) => format!("{}. {}", option_letter(i), self.options[i]),
            None => self.correct_answer.clone(),
        }
    }
}

/// A free-text question graded by approximate matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortAnswerItem {
    /// Question text; may embed a blank marker such as "____".
    #[serde(default, deserialize_with = "loose_string")]
    pub question: String,
    /// Reference answer.
    #[serde(default, deserialize_with = "loose_string")]
    pub correct_answer: String,
}

/// The questions of a generated quiz. Absent or null arrays are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mcq: Vec<McqItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_answer: Vec<ShortAnswerItem>,
}

// Model output is loosely typed: `null` stands in for a missing value and
// numbers or booleans appear where text is expected.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn loose_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.into_iter().map(value_to_text).collect()),
        other => Err(serde::de::Error::custom(format!(
            "expected a list of options, got {other}"
        ))),
    }
}

impl Quiz {
    /// Number of gradable questions.
    pub fn total(&self) -> usize {
        self.mcq.len() + self.short_answer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All question keys in display order (MCQs first).
    pub fn keys(&self) -> impl Iterator<Item = QuestionKey> + '_ {
        (0..self.mcq.len())
            .map(QuestionKey::Mcq)
            .chain((0..self.short_answer.len()).map(QuestionKey::Short))
    }

    pub fn contains(&self, key: QuestionKey) -> bool {
        match key {
            QuestionKey::Mcq(i) => i < self.mcq.len(),
            QuestionKey::Short(i) => i < self.short_answer.len(),
        }
    }
}

/// A generated quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    #[serde(default)]
    pub quiz: Quiz,
    /// Set when the API could only partially produce the quiz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Generated study notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotesResult {
    #[serde(default)]
    pub notes: String,
}

/// A successful generation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum GenerationResult {
    Quiz(QuizResult),
    Notes(NotesResult),
}

impl GenerationResult {
    pub fn mode(&self) -> Mode {
        match self {
            GenerationResult::Quiz(_) => Mode::Quiz,
            GenerationResult::Notes(_) => Mode::Notes,
        }
    }

    /// The quiz, if this is a quiz result.
    pub fn quiz(&self) -> Option<&Quiz> {
        match self {
            GenerationResult::Quiz(q) => Some(&q.quiz),
            GenerationResult::Notes(_) => None,
        }
    }
}

/// Identifies one question within a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuestionKey {
    Mcq(usize),
    Short(usize),
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKey::Mcq(i) => write!(f, "mcq-{i}"),
            QuestionKey::Short(i) => write!(f, "short-{i}"),
        }
    }
}

impl FromStr for QuestionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_index = |rest: &str| {
            rest.parse::<usize>()
                .map_err(|_| format!("invalid question key: {s}"))
        };
        if let Some(rest) = s.strip_prefix("mcq-") {
            Ok(QuestionKey::Mcq(parse_index(rest)?))
        } else if let Some(rest) = s.strip_prefix("short-") {
            Ok(QuestionKey::Short(parse_index(rest)?))
        } else {
            Err(format!("invalid question key: {s}"))
        }
    }
}

/// Positional letter for an option index (0 → 'A').
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map(char::from)
        .unwrap_or('?')
}

/// Parse a user's option choice: a letter ("b") or a 1-based number ("2").
pub fn parse_option_choice(input: &str, option_count: usize) -> Option<usize> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return (1..=option_count).contains(&n).then(|| n - 1);
    }
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            let idx = (c.to_ascii_uppercase() as u8 - b'A') as usize;
            (idx < option_count).then_some(idx)
        }
        _ => None,
    }
}
