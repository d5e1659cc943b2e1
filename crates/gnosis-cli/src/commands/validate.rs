//! The `gnosis validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gnosis_core::model::GenerationResult;
use gnosis_core::parser::{load_result_file, validate_quiz};

pub fn execute(result_path: PathBuf) -> Result<()> {
    let result = load_result_file(&result_path)?;

    let quiz_result = match &result {
        GenerationResult::Notes(_) => {
            println!("Notes result: no questions to validate.");
            return Ok(());
        }
        GenerationResult::Quiz(q) => q,
    };

    let quiz = &quiz_result.quiz;
    println!(
        "Quiz: {} multiple choice, {} short answer",
        quiz.mcq.len(),
        quiz.short_answer.len()
    );
    if let Some(warning) = &quiz_result.warning {
        println!("  API warning: {warning}");
    }

    let warnings = validate_quiz(quiz);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.key, w.message);
    }

    if warnings.is_empty() {
        println!("All questions gradable.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
