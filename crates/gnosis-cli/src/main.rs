//! gnosis CLI — generate quizzes and notes, then take and grade them.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::generate::GenerateArgs;

#[derive(Parser)]
#[command(name = "gnosis", version, about = "AI quiz & notes assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz or notes from a request, text, or PDF
    Generate(GenerateArgs),

    /// Take a saved quiz interactively
    Take {
        /// Saved generation result (.json)
        #[arg(long)]
        result: PathBuf,

        /// Write a session report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a saved quiz against an answer sheet
    Grade {
        /// Saved generation result (.json)
        #[arg(long)]
        result: PathBuf,

        /// Answer sheet (.json)
        #[arg(long)]
        answers: PathBuf,

        /// Write a session report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a saved quiz for questions that cannot be graded
    Validate {
        /// Saved generation result (.json)
        #[arg(long)]
        result: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gnosis=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Take {
            result,
            report,
            config,
        } => commands::take::execute(result, report, config),
        Commands::Grade {
            result,
            answers,
            report,
            config,
        } => commands::grade::execute(result, answers, report, config),
        Commands::Validate { result } => commands::validate::execute(result),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
