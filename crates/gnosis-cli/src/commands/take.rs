//! The `gnosis take` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use gnosis_client::config::load_config_from;
use gnosis_core::model::{option_letter, parse_option_choice, GenerationResult};
use gnosis_core::parser::load_result_file;
use gnosis_core::report::SessionReport;
use gnosis_core::session::QuizSession;

pub fn execute(
    result_path: PathBuf,
    report_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let result = load_result_file(&result_path)?;

    let mut session = QuizSession::new(config.create_evaluator());
    session.reset_on_new_result(result);

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_quiz(&mut session, stdin.lock(), stdout.lock())?;

    if let Some(path) = report_path {
        SessionReport::from_session(&session).save_json(&path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

/// Walk through every question once, reading answers from `input`.
///
/// A blank line skips a question; end of input stops the quiz early.
pub fn run_quiz<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    mut out: W,
) -> Result<()> {
    let quiz = match session.result() {
        Some(GenerationResult::Notes(notes)) => {
            writeln!(out, "{}", notes.notes)?;
            return Ok(());
        }
        Some(GenerationResult::Quiz(result)) => {
            if let Some(warning) = &result.warning {
                writeln!(out, "Warning: {warning}")?;
            }
            result.quiz.clone()
        }
        None => return Ok(()),
    };

    if quiz.is_empty() {
        writeln!(out, "No questions to answer.")?;
        return Ok(());
    }

    'questions: {
        for (i, item) in quiz.mcq.iter().enumerate() {
            writeln!(out, "\n{}. {}", i + 1, item.question)?;
            for (idx, opt) in item.options.iter().enumerate() {
                writeln!(out, "   {}. {}", option_letter(idx), opt)?;
            }

            let choice = loop {
                write!(out, "Your answer: ")?;
                out.flush()?;
                let Some(line) = read_answer(&mut input)? else {
                    break 'questions;
                };
                if line.is_empty() {
                    break None;
                }
                match parse_option_choice(&line, item.options.len()) {
                    Some(choice) => break Some(choice),
                    None => writeln!(out, "Not an option, try again.")?,
                }
            };

            if let Some(choice) = choice {
                if session.apply_mcq_answer(i, choice)? {
                    writeln!(out, "Correct")?;
                } else {
                    writeln!(out, "Incorrect. Correct answer: {}", item.display_answer())?;
                }
            }
        }

        for (i, item) in quiz.short_answer.iter().enumerate() {
            writeln!(out, "\nSA {}. {}", i + 1, item.question)?;
            write!(out, "Your answer: ")?;
            out.flush()?;
            let Some(line) = read_answer(&mut input)? else {
                break 'questions;
            };
            if line.is_empty() {
                continue;
            }

            session.set_short_answer_draft(i, line)?;
            if session.apply_short_answer_check(i)? {
                writeln!(out, "Correct")?;
            } else {
                writeln!(out, "Incorrect. Answer: {}", item.correct_answer)?;
            }
        }
    }

    writeln!(out, "\nScore: {} / {}", session.score(), session.total())?;
    Ok(())
}

/// Read one trimmed line, or `None` at end of input.
fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
