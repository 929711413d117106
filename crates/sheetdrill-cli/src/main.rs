//! sheetdrill CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sheetdrill", version, about = "AI-graded Excel skills interviewer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive interview
    Run {
        /// Path to a .toml question set or a directory of them
        #[arg(long)]
        questions: PathBuf,

        /// Question set id to use when --questions is a directory
        #[arg(long)]
        set: Option<String>,

        /// Provider to grade with (defaults to the configured default)
        #[arg(long)]
        provider: Option<String>,

        /// Model to grade with (defaults to the configured default)
        #[arg(long)]
        model: Option<String>,

        /// Output directory for the report JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pause after each evaluation, in milliseconds (overrides config)
        #[arg(long)]
        pacing: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question set TOML files
    Validate {
        /// Path to a question set file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// Write the reference dataset workbook to disk
    Dataset {
        /// Output path for the .xlsx file
        #[arg(long, default_value = "sales_dataset.xlsx")]
        output: PathBuf,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example question set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sheetdrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            questions,
            set,
            provider,
            model,
            output,
            pacing,
            config,
        } => commands::run::execute(questions, set, provider, model, output, pacing, config).await,
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Dataset { output } => commands::dataset::execute(output),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
