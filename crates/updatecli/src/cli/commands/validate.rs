//! Validate command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use updatecli_core::config::load_config_or_default;
use updatecli_resources::{
    load_manifest, ManifestIssue, ResourceContext, ResourceRegistry, Stage,
};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Validate a manifest without cloning or fetching anything
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Manifest file
    #[arg(short, long, default_value = "manifest.yaml")]
    pub manifest: PathBuf,
}

/// Validation outcome of one manifest
#[derive(Debug, serde::Serialize)]
struct Report {
    name: Option<String>,
    config_path: Option<PathBuf>,
    scms: usize,
    resources: usize,
    issues: Vec<ManifestIssue>,
}

impl Report {
    fn valid(&self) -> bool {
        self.issues.is_empty()
    }
}

fn validate(manifest: &Path, cwd: &Path) -> anyhow::Result<Report> {
    let (config, config_path) = load_config_or_default(cwd);
    let manifest = load_manifest(manifest)?;

    let registry = ResourceRegistry::new();
    let ctx = ResourceContext::new(config);
    let issues = manifest.validate(&registry, &ctx);

    Ok(Report {
        name: manifest.name.clone(),
        config_path,
        scms: manifest.scms.len(),
        resources: Stage::ALL
            .into_iter()
            .map(|stage| manifest.section(stage).len())
            .sum(),
        issues,
    })
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(manifest = %self.manifest.display(), "executing validate command");
        let cwd = std::env::current_dir()?;
        let report = validate(&self.manifest, &cwd)?;

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "valid": report.valid(),
                "manifest": self.manifest,
                "report": report,
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", output::header("Validation Results"));
                    println!();
                    println!(
                        "{}",
                        output::key_value("Manifest", &style(self.manifest.display()).cyan().to_string())
                    );
                    if let Some(name) = &report.name {
                        println!("{}", output::key_value("Name", name));
                    }
                    if let Some(path) = &report.config_path {
                        println!("{}", output::key_value("Config", &path.display().to_string()));
                    }
                    println!(
                        "{}",
                        output::key_value(
                            "Entries",
                            &format!("{} scm(s), {} resource(s)", report.scms, report.resources)
                        )
                    );
                    println!();
                }

                if report.valid() {
                    if !cli.quiet {
                        output::success("Manifest is valid");
                    }
                } else {
                    println!("{}", style("Errors:").red().bold());
                    for issue in &report.issues {
                        println!("  {} {}", style("✗").red(), issue);
                    }
                    println!();
                    println!(
                        "{} with {} error(s)",
                        style("✗ Validation failed").red().bold(),
                        report.issues.len()
                    );
                }
            }
        }

        if !report.valid() {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
        Ok(())
    }
}
