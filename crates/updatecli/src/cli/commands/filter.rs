//! Filter command

use clap::Args;
use console::style;
use tracing::info;

use updatecli_version::{Filter, FilterKind};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Select a version out of candidate strings
#[derive(Debug, Args)]
pub struct FilterCommand {
    /// Filter kind (latest, literal, regex, semver, regex/semver, time, regex/time)
    #[arg(short, long, default_value = "latest")]
    pub kind: FilterKind,

    /// Pattern interpreted according to the kind
    #[arg(short, long, default_value = "")]
    pub pattern: String,

    /// Regular expression whose first capture group is compared
    #[arg(short, long)]
    pub regex: Option<String>,

    /// Disable lenient semantic version parsing
    #[arg(long)]
    pub strict: bool,

    /// Print the pattern selecting versions newer than this one instead
    #[arg(long, value_name = "VERSION", conflicts_with = "candidates")]
    pub greater_than: Option<String>,

    /// Candidate versions
    #[arg(required_unless_present = "greater_than")]
    pub candidates: Vec<String>,
}

impl FilterCommand {
    fn filter(&self) -> anyhow::Result<Filter> {
        let mut filter = Filter::new(self.kind, self.pattern.as_str())
            .with_regex(self.regex.clone().unwrap_or_default())
            .with_strict(self.strict);
        filter.init()?;
        Ok(filter)
    }

    /// Execute the filter command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(kind = %self.kind, pattern = %self.pattern, candidates = self.candidates.len(), "executing filter command");
        let filter = self.filter()?;

        if let Some(version) = &self.greater_than {
            let pattern = filter.greater_than_pattern(version)?;
            match cli.format {
                OutputFormat::Json => output::json(&serde_json::json!({ "pattern": pattern }))?,
                OutputFormat::Text => println!("{}", pattern),
            }
            return Ok(());
        }

        let version = match filter.search(&self.candidates) {
            Ok(version) => version,
            Err(e) if e.is_no_version_found() => {
                match cli.format {
                    OutputFormat::Json => output::json(&serde_json::json!({
                        "found": false,
                        "filter": filter,
                    }))?,
                    OutputFormat::Text => output::warning(&e.to_string()),
                }
                std::process::exit(exit_codes::NO_MATCH);
            }
            Err(e) => return Err(e.into()),
        };

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "found": true,
                "original": version.original_version(),
                "parsed": version.parsed_version(),
                "filter": filter,
            }))?,
            OutputFormat::Text => {
                if cli.quiet {
                    println!("{}", version.original_version());
                } else {
                    println!(
                        "{} {}",
                        style(version.original_version()).green().bold(),
                        style(format!("({})", version.parsed_version())).dim()
                    );
                }
            }
        }

        Ok(())
    }
}
