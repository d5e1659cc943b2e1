//! The `gnosis generate` command.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gnosis_client::config::load_config_from;
use gnosis_core::model::{FileUpload, GenerationRequest, GenerationResult, Mode};
use gnosis_core::session::QuizSession;
use gnosis_core::traits::GenerationClient;

use super::take::run_quiz;

#[derive(Args)]
pub struct GenerateArgs {
    /// What to produce: quiz or notes
    #[arg(long, default_value = "quiz")]
    pub mode: Mode,

    /// Free-form instructions for the generator
    #[arg(long, default_value = "")]
    pub request: String,

    /// Topic hint
    #[arg(long)]
    pub topic: Option<String>,

    /// Study text to generate from
    #[arg(long, conflicts_with = "text_file")]
    pub text: Option<String>,

    /// Read study text from a file
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// PDF document to upload
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Save the generation result as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Start an interactive quiz right away
    #[arg(long)]
    pub take: bool,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    fn into_request(self) -> Result<GenerationRequest> {
        let text_input = match (self.text, &self.text_file) {
            (Some(text), _) => Some(text),
            (None, Some(path)) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read text file: {}", path.display()))?,
            ),
            (None, None) => None,
        };
        let file = self
            .file
            .as_deref()
            .map(FileUpload::from_path)
            .transpose()?;

        Ok(GenerationRequest {
            mode: self.mode,
            user_request: self.request,
            topic: self.topic,
            text_input,
            file,
        })
    }
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let output = args.output.clone();
    let take = args.take;
    let request = args.into_request()?;

    let client = config.create_client()?;
    tracing::debug!(client = client.name(), mode = %request.mode, "submitting request");
    eprintln!("Generating {} via {} ...", request.mode, client.base_url());

    // A failed request leaves nothing behind: no file, no session.
    let result = client
        .generate(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if let Some(path) = &output {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        eprintln!("Result saved to: {}", path.display());
    }

    match &result {
        GenerationResult::Notes(notes) => {
            println!("{}", notes.notes);
            if take {
                eprintln!("Notes have no questions to take.");
            }
            return Ok(());
        }
        GenerationResult::Quiz(quiz_result) => {
            if let Some(warning) = &quiz_result.warning {
                eprintln!("Warning: {warning}");
            }
            let quiz = &quiz_result.quiz;
            println!(
                "Quiz ready: {} multiple choice, {} short answer",
                quiz.mcq.len(),
                quiz.short_answer.len()
            );
            if !take {
                for (i, item) in quiz.mcq.iter().enumerate() {
                    println!("  {}. {}", i + 1, item.question);
                }
                for (i, item) in quiz.short_answer.iter().enumerate() {
                    println!("  SA {}. {}", i + 1, item.question);
                }
            }
        }
    }

    if take {
        let mut session = QuizSession::new(config.create_evaluator());
        session.reset_on_new_result(result);
        let stdin = io::stdin();
        run_quiz(&mut session, stdin.lock(), io::stdout().lock())?;
    }

    Ok(())
}
