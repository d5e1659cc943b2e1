//! Generation API response parsing and quiz validation.
//!
//! The API is lenient about what it returns: quiz arrays may be missing,
//! failures may arrive as `{"error": ...}` with a success status, and a quiz
//! the backend could not parse is returned as raw model output. Everything
//! here degrades to an empty quiz rather than failing where possible.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::error::GenerationError;
use crate::model::{AnswerKey, GenerationResult, NotesResult, QuestionKey, Quiz, QuizResult};

const UNPARSED_QUIZ_WARNING: &str = "The quiz could not be parsed from the generated output.";

/// Parse a successful (2xx) response body into a result.
pub fn parse_generation_response(body: &str) -> Result<GenerationResult, GenerationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("response is not JSON: {e}")))?;
    let Value::Object(obj) = value else {
        return Err(GenerationError::InvalidResponse(
            "response is not a JSON object".into(),
        ));
    };

    if let Some(error) = obj.get("error") {
        return Err(GenerationError::Rejected(value_to_message(error)));
    }

    let mode = obj
        .get("mode")
        .and_then(Value::as_str)
        .map(|m| m.trim().to_lowercase());

    match mode.as_deref() {
        Some("quiz") => quiz_from_object(&obj),
        Some("notes") => Ok(notes_from_object(&obj)),
        Some(other) => Err(GenerationError::InvalidResponse(format!(
            "unknown result mode: {other}"
        ))),
        None if obj.contains_key("quiz") => quiz_from_object(&obj),
        None if obj.contains_key("notes") => Ok(notes_from_object(&obj)),
        None => Err(GenerationError::InvalidResponse(
            "response has no mode, quiz, or notes".into(),
        )),
    }
}

fn quiz_from_object(obj: &Map<String, Value>) -> Result<GenerationResult, GenerationError> {
    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    let result = match obj.get("quiz") {
        Some(Value::Null) | None => match obj.get("raw_output").and_then(Value::as_str) {
            Some(raw) => match recover_quiz(raw) {
                Some(quiz) => {
                    tracing::info!(
                        questions = quiz.total(),
                        "recovered quiz from raw model output"
                    );
                    QuizResult {
                        quiz,
                        warning: None,
                    }
                }
                None => QuizResult {
                    quiz: Quiz::default(),
                    warning: Some(message.unwrap_or_else(|| UNPARSED_QUIZ_WARNING.to_string())),
                },
            },
            None => QuizResult {
                quiz: Quiz::default(),
                warning: message,
            },
        },
        Some(quiz) => {
            let quiz: Quiz = serde_json::from_value(quiz.clone()).map_err(|e| {
                GenerationError::InvalidResponse(format!("malformed quiz: {e}"))
            })?;
            // Saved results carry their warning directly.
            let warning = match obj.get("status").and_then(Value::as_str) {
                Some("warning") => message,
                _ => obj
                    .get("warning")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            };
            QuizResult { quiz, warning }
        }
    };

    Ok(GenerationResult::Quiz(result))
}

fn notes_from_object(obj: &Map<String, Value>) -> GenerationResult {
    let notes = obj
        .get("notes")
        .map(|n| match n {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    GenerationResult::Notes(NotesResult { notes })
}

/// Try to parse a quiz out of raw model output.
fn recover_quiz(raw: &str) -> Option<Quiz> {
    let json = extract_json_block(raw)?;
    let value: Value = serde_json::from_str(&json).ok()?;
    // Some models wrap the arrays in a "quiz" object of their own.
    let value = match value {
        Value::Object(mut obj) if obj.contains_key("quiz") => obj.remove("quiz")?,
        other => other,
    };
    serde_json::from_value(value).ok()
}

/// Extract JSON text from a markdown-formatted model response.
///
/// Prefers ```json blocks, then generic ``` blocks, then the raw text if it
/// looks like a JSON object.
pub fn extract_json_block(text: &str) -> Option<String> {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json = false;
    let mut current = String::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json = lang == "json";
            current.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json && json_block.is_none() {
                json_block = Some(current.clone());
            } else if !is_json && generic_block.is_none() {
                generic_block = Some(current.clone());
            }
            continue;
        }

        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    json_block.or(generic_block).or_else(|| {
        let trimmed = text.trim();
        (trimmed.starts_with('{') && trimmed.ends_with('}')).then(|| trimmed.to_string())
    })
}

/// Message to show for a failed (non-2xx) response body.
///
/// Uses the JSON `message` field when present, otherwise the JSON text
/// verbatim, otherwise the raw body.
pub fn error_message_from_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => obj
            .get("message")
            .or_else(|| obj.get("detail"))
            .map(value_to_message)
            .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
        Ok(other) => other.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn value_to_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a saved result file's contents.
pub fn parse_result_str(content: &str, source_path: &Path) -> Result<GenerationResult> {
    parse_generation_response(content)
        .with_context(|| format!("failed to parse result: {}", source_path.display()))
}

/// Load a saved generation result from a JSON file.
pub fn load_result_file(path: &Path) -> Result<GenerationResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read result file: {}", path.display()))?;
    parse_result_str(&content, path)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question the warning applies to.
    pub key: QuestionKey,
    pub message: String,
}

/// Check a quiz for questions that cannot be graded sensibly.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (i, item) in quiz.mcq.iter().enumerate() {
        let key = QuestionKey::Mcq(i);
        if item.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                key,
                message: "question text is empty".into(),
            });
        }
        if item.options.len() < 2 {
            warnings.push(ValidationWarning {
                key,
                message: format!("only {} option(s)", item.options.len()),
            });
        }
        if item.answer_key() == AnswerKey::Unresolved {
            warnings.push(ValidationWarning {
                key,
                message: format!(
                    "correct answer '{}' matches no option text or letter",
                    item.correct_answer
                ),
            });
        }
    }

    for (i, item) in quiz.short_answer.iter().enumerate() {
        let key = QuestionKey::Short(i);
        if item.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                key,
                message: "question text is empty".into(),
            });
        }
        if item.correct_answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                key,
                message: "reference answer is empty; no response can be correct".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{McqItem, ShortAnswerItem};

    const QUIZ_RESPONSE: &str = r#"{
        "status": "success",
        "mode": "quiz",
        "quiz": {
            "mcq": [
                {
                    "question": "Which structure is LIFO?",
                    "options": ["Queue", "Stack", "Heap", "Graph"],
                    "correct_answer": "B"
                }
            ],
            "short_answer": [
                {"question": "Name the operation that adds to a stack.", "correct_answer": "Push"}
            ]
        }
    }"#;

    #[test]
    fn parse_quiz_response() {
        let result = parse_generation_response(QUIZ_RESPONSE).unwrap();
        let quiz = result.quiz().unwrap();
        assert_eq!(quiz.mcq.len(), 1);
        assert_eq!(quiz.short_answer[0].correct_answer, "Push");
        assert!(matches!(result, GenerationResult::Quiz(QuizResult { warning: None, .. })));
    }

    #[test]
    fn parse_notes_response() {
        let body = r#"{"status":"success","mode":"notes","notes":"Stacks are LIFO."}"#;
        let result = parse_generation_response(body).unwrap();
        assert_eq!(
            result,
            GenerationResult::Notes(NotesResult {
                notes: "Stacks are LIFO.".into()
            })
        );
    }

    #[test]
    fn missing_arrays_are_empty() {
        let result = parse_generation_response(r#"{"mode":"quiz","quiz":{}}"#).unwrap();
        assert!(result.quiz().unwrap().is_empty());

        let result = parse_generation_response(r#"{"mode":"quiz"}"#).unwrap();
        assert!(result.quiz().unwrap().is_empty());

        let result = parse_generation_response(r#"{"mode":"notes"}"#).unwrap();
        assert_eq!(result, GenerationResult::Notes(NotesResult::default()));
    }

    #[test]
    fn null_arrays_are_empty() {
        let result = parse_generation_response(
            r#"{"mode":"quiz","quiz":{"mcq":null,"short_answer":[
                {"question":"Stack order?","correct_answer":"LIFO"}
            ]}}"#,
        )
        .unwrap();
        let quiz = result.quiz().unwrap();
        assert!(quiz.mcq.is_empty());
        assert_eq!(quiz.short_answer[0].correct_answer, "LIFO");

        let result =
            parse_generation_response(r#"{"mode":"quiz","quiz":{"mcq":[],"short_answer":null}}"#)
                .unwrap();
        assert!(result.quiz().unwrap().is_empty());
    }

    #[test]
    fn null_and_missing_fields_become_empty_text() {
        let result = parse_generation_response(
            r#"{"mode":"quiz","quiz":{
                "mcq":[{"options":["Queue","Stack"],"correct_answer":null}],
                "short_answer":[{"question":null,"correct_answer":null}]
            }}"#,
        )
        .unwrap();
        let quiz = result.quiz().unwrap();
        assert_eq!(quiz.mcq[0].question, "");
        assert_eq!(quiz.mcq[0].correct_answer, "");
        assert_eq!(quiz.short_answer[0], ShortAnswerItem::default());

        let result = parse_generation_response(
            r#"{"mode":"quiz","quiz":{"mcq":[{"question":"Empty","options":null}]}}"#,
        )
        .unwrap();
        assert!(result.quiz().unwrap().mcq[0].options.is_empty());
    }

    #[test]
    fn scalar_options_and_answers_are_stringified() {
        let result = parse_generation_response(
            r#"{"mode":"quiz","quiz":{
                "mcq":[{"question":"2 + 2?","options":[3, 4, 5.5, true, null],"correct_answer":4}],
                "short_answer":[{"question":"Is a stack LIFO?","correct_answer":true}]
            }}"#,
        )
        .unwrap();
        let quiz = result.quiz().unwrap();
        assert_eq!(quiz.mcq[0].options, vec!["3", "4", "5.5", "true", ""]);
        assert_eq!(quiz.mcq[0].correct_answer, "4");
        assert_eq!(quiz.mcq[0].correct_index(), Some(1));
        assert_eq!(quiz.short_answer[0].correct_answer, "true");
    }

    #[test]
    fn non_list_options_are_malformed() {
        let err = parse_generation_response(
            r#"{"mode":"quiz","quiz":{"mcq":[{"question":"Q","options":"A or B"}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn mode_inferred_from_fields() {
        let result = parse_generation_response(r#"{"quiz":{"mcq":[]}}"#).unwrap();
        assert!(result.quiz().is_some());
        let result = parse_generation_response(r#"{"notes":"n"}"#).unwrap();
        assert!(result.quiz().is_none());
        let err = parse_generation_response(r#"{"status":"success"}"#).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn error_body_is_rejected() {
        let err =
            parse_generation_response(r#"{"error":"Only PDF files are supported."}"#).unwrap_err();
        assert!(matches!(err, GenerationError::Rejected(ref m) if m == "Only PDF files are supported."));
    }

    #[test]
    fn non_json_body_is_invalid() {
        let err = parse_generation_response("<html>502</html>").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
        let err = parse_generation_response("[1,2]").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn warning_with_recoverable_raw_output() {
        let body = serde_json::json!({
            "status": "warning",
            "mode": "quiz",
            "message": "Could not parse JSON properly. Here's raw text.",
            "raw_output": "Here you go:\n```json\n{\"mcq\": [{\"question\": \"Q\", \"options\": [\"x\", \"y\"], \"correct_answer\": \"y\"}]}\n```\n"
        })
        .to_string();
        let result = parse_generation_response(&body).unwrap();
        let GenerationResult::Quiz(quiz) = result else {
            panic!("expected quiz");
        };
        assert_eq!(quiz.quiz.mcq.len(), 1);
        assert!(quiz.quiz.short_answer.is_empty());
        assert_eq!(quiz.warning, None);
    }

    #[test]
    fn warning_with_unrecoverable_raw_output() {
        let body = serde_json::json!({
            "status": "warning",
            "mode": "quiz",
            "message": "Could not parse JSON properly. Here's raw text.",
            "raw_output": "1. What is a stack?"
        })
        .to_string();
        let GenerationResult::Quiz(quiz) = parse_generation_response(&body).unwrap() else {
            panic!("expected quiz");
        };
        assert!(quiz.quiz.is_empty());
        assert_eq!(
            quiz.warning.as_deref(),
            Some("Could not parse JSON properly. Here's raw text.")
        );
    }

    #[test]
    fn extract_json_prefers_json_block() {
        let text = "```\n{\"a\":1}\n```\n\n```json\n{\"b\":2}\n```";
        assert_eq!(extract_json_block(text).as_deref(), Some("{\"b\":2}"));
        assert_eq!(
            extract_json_block("```\n{\"a\":1}\n```").as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(extract_json_block("  {\"c\":3} ").as_deref(), Some("{\"c\":3}"));
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn recover_quiz_unwraps_nested_quiz() {
        let quiz = recover_quiz(r#"{"quiz":{"short_answer":[{"question":"q","correct_answer":"a"}]}}"#)
            .unwrap();
        assert_eq!(quiz.short_answer.len(), 1);
    }

    #[test]
    fn error_messages_from_bodies() {
        assert_eq!(
            error_message_from_body(r#"{"message":"quota exceeded"}"#),
            "quota exceeded"
        );
        assert_eq!(
            error_message_from_body(r#"{"detail":[{"msg":"field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
        assert_eq!(error_message_from_body(r#"{"code":7}"#), r#"{"code":7}"#);
        assert_eq!(error_message_from_body("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn validate_flags_ungradable_questions() {
        let quiz = Quiz {
            mcq: vec![
                McqItem {
                    question: "Which is LIFO?".into(),
                    options: vec!["Queue".into(), "Stack".into()],
                    correct_answer: "Stack".into(),
                },
                McqItem {
                    question: "Pick one".into(),
                    options: vec!["Only".into()],
                    correct_answer: "Z".into(),
                },
            ],
            short_answer: vec![ShortAnswerItem {
                question: "".into(),
                correct_answer: " ".into(),
            }],
        };
        let warnings = validate_quiz(&quiz);
        assert!(!warnings.iter().any(|w| w.key == QuestionKey::Mcq(0)));
        assert!(warnings
            .iter()
            .any(|w| w.key == QuestionKey::Mcq(1) && w.message.contains("1 option")));
        assert!(warnings
            .iter()
            .any(|w| w.key == QuestionKey::Mcq(1) && w.message.contains("matches no option")));
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.key == QuestionKey::Short(0))
                .count(),
            2
        );
    }

    #[test]
    fn load_result_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.json");
        std::fs::write(&path, QUIZ_RESPONSE).unwrap();
        let result = load_result_file(&path).unwrap();
        assert_eq!(result.quiz().unwrap().total(), 2);

        let missing = load_result_file(&dir.path().join("missing.json"));
        assert!(missing.is_err());
    }

    #[test]
    fn saved_result_keeps_warning() {
        let saved = GenerationResult::Quiz(QuizResult {
            quiz: Quiz::default(),
            warning: Some("partial output".into()),
        });
        let json = serde_json::to_string(&saved).unwrap();
        assert_eq!(parse_generation_response(&json).unwrap(), saved);
    }
}
