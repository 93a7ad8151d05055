//! Guess command

use clap::Args;
use tracing::info;

use updatecli_core::config::load_config_or_default;
use updatecli_git::NativeGit;
use updatecli_scm::{ScmConfig, ScmKind};

use crate::cli::{output, Cli, OutputFormat};

/// Guess the scm configuration of the working directory
#[derive(Debug, Args)]
pub struct GuessCommand {
    /// Name of the scm configuration, used for environment overrides
    #[arg(short, long, default_value = "default")]
    pub name: String,

    /// Expected scm kind; a different discovered kind is an error
    #[arg(short, long)]
    pub kind: Option<ScmKind>,
}

impl GuessCommand {
    /// Execute the guess command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(name = %self.name, kind = ?self.kind, "executing guess command");
        let cwd = std::env::current_dir()?;
        let (settings, _) = load_config_or_default(&cwd);

        let mut config = ScmConfig {
            kind: self.kind,
            ..Default::default()
        };
        config.auto_guess(&self.name, &cwd, &NativeGit, &|key| std::env::var(key).ok())?;

        let handler = updatecli_scm::build(&config, "", &settings);

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "name": self.name,
                "scm": config,
                "summary": handler.as_ref().ok().and_then(Option::as_ref).map(|h| h.summary()),
                "error": handler.as_ref().err().map(ToString::to_string),
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", output::header(&format!("scms.{}", self.name)));
                    print!("{}", serde_yaml::to_string(&config)?);
                    println!();
                }
                match handler {
                    Ok(Some(handler)) => output::success(&handler.summary()),
                    Ok(None) => output::info("scm disabled"),
                    Err(e) => output::warning(&format!("guessed configuration is incomplete: {}", e)),
                }
            }
        }

        Ok(())
    }
}
