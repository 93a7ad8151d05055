//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{
    CompletionsCommand, FilterCommand, GuessCommand, StepArgs, ValidateCommand,
};
use updatecli_resources::Stage;

/// Updatecli - Declarative dependency update CLI
#[derive(Debug, Parser)]
#[command(name = "updatecli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Guess the scm configuration of the working directory
    Guess(GuessCommand),

    /// Select a version out of candidate strings
    Filter(FilterCommand),

    /// Run the source step of a manifest resource
    Source(StepArgs),

    /// Run the condition step of a manifest resource
    Condition(StepArgs),

    /// Run the target step of a manifest resource
    Target(StepArgs),

    /// Validate a manifest
    Validate(ValidateCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Guess(ref cmd) => cmd.execute(&self),
            Commands::Filter(ref cmd) => cmd.execute(&self),
            Commands::Source(ref args) => args.execute(Stage::Source, &self),
            Commands::Condition(ref args) => args.execute(Stage::Condition, &self),
            Commands::Target(ref args) => args.execute(Stage::Target, &self),
            Commands::Validate(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}
