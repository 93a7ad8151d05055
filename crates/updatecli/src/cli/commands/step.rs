//! Source, condition and target commands

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{info, instrument};

use updatecli_core::config::load_config_or_default;
use updatecli_core::error::ConfigError;
use updatecli_core::types::StepStatus;
use updatecli_core::{Config, UpdatecliError};
use updatecli_git::NativeGit;
use updatecli_resources::{
    load_manifest, Manifest, ResourceConfig, ResourceContext, ResourceRegistry, Stage,
    DEFAULT_SCM_ID,
};
use updatecli_scm::{ScmConfig, ScmHandler};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Arguments shared by the source, condition and target commands
#[derive(Debug, Args)]
pub struct StepArgs {
    /// Manifest file
    #[arg(short, long, default_value = "manifest.yaml")]
    pub manifest: PathBuf,

    /// Resource id within the manifest section
    #[arg(long)]
    pub id: String,

    /// Value to check or apply; defaults to the output of the resource's `sourceid`
    #[arg(long)]
    pub source_value: Option<String>,

    /// Report what a target would change without changing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct StepReport<'a, R> {
    stage: Stage,
    id: &'a str,
    kind: &'a str,
    #[serde(flatten)]
    result: &'a R,
}

/// Everything needed to run resources of one manifest
struct Pipeline {
    manifest: Manifest,
    registry: ResourceRegistry,
    ctx: ResourceContext,
    cwd: PathBuf,
}

impl Pipeline {
    fn load(manifest: &Path) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let (config, _) = load_config_or_default(&cwd);
        Ok(Self {
            manifest: load_manifest(manifest)?,
            registry: ResourceRegistry::new(),
            ctx: ResourceContext::new(config),
            cwd,
        })
    }

    fn settings(&self) -> &Config {
        &self.ctx.config
    }

    fn entry(&self, stage: Stage, id: &str) -> Result<&ResourceConfig, UpdatecliError> {
        self.manifest.section(stage).get(id).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: format!("{}.{}", stage.section(), id),
                message: "no such resource in the manifest".to_string(),
            }
            .into()
        })
    }

    /// Scm handler of `scmid`, cloning the repository when it is not on disk yet
    #[instrument(skip(self))]
    fn scm(&self, scmid: Option<&str>) -> anyhow::Result<Option<Box<dyn ScmHandler>>> {
        let Some(scmid) = scmid else {
            return Ok(None);
        };

        let declared = self.manifest.scms.get(scmid);
        let config = if scmid == DEFAULT_SCM_ID {
            // Declared settings win over what the working directory tells
            let mut config = declared.cloned().unwrap_or_default();
            info!(dir = %self.cwd.display(), declared = declared.is_some(), "completing scm {:?} from the working directory", scmid);
            config.auto_guess(scmid, &self.cwd, &NativeGit, &|key| std::env::var(key).ok())?;
            config
        } else {
            declared.cloned().ok_or_else(|| {
                UpdatecliError::from(ConfigError::InvalidValue {
                    field: "scmid".to_string(),
                    message: format!("unknown scm {:?}", scmid),
                })
            })?
        };

        let Some(handler) = updatecli_scm::build(&config, "", self.settings())? else {
            return Ok(None);
        };
        if !handler.kind().is_search() && !handler.directory().join(".git").exists() {
            handler.clone_repo()?;
        }
        Ok(Some(handler))
    }

    /// Value produced by the source `id`, or `None` when its filter matched nothing
    fn source_value(&self, id: &str) -> anyhow::Result<Option<String>> {
        let entry = self.entry(Stage::Source, id)?;
        let resource = self
            .registry
            .build(&entry.kind, entry.spec.clone(), &self.ctx)?;
        let scm = self.scm(entry.scmid.as_deref())?;
        Ok(resource.source(scm.as_deref())?.value)
    }
}

impl StepArgs {
    /// Execute one step of the resource `id`
    pub fn execute(&self, stage: Stage, cli: &Cli) -> anyhow::Result<()> {
        info!(stage = %stage, id = %self.id, manifest = %self.manifest.display(), "executing step command");
        let pipeline = Pipeline::load(&self.manifest)?;
        let entry = pipeline.entry(stage, &self.id)?;

        let resource = pipeline
            .registry
            .build(&entry.kind, entry.spec.clone(), &pipeline.ctx)?;

        let source = match (stage, &self.source_value, &entry.sourceid) {
            (Stage::Source, _, _) => String::new(),
            (_, Some(value), _) => value.clone(),
            (_, None, Some(sourceid)) => match pipeline.source_value(sourceid)? {
                Some(value) => {
                    info!(sourceid = %sourceid, value = %value, "resolved source value");
                    value
                }
                None => {
                    output::warning(&format!("source {:?} matched nothing", sourceid));
                    std::process::exit(exit_codes::NO_MATCH);
                }
            },
            (_, None, None) => String::new(),
        };

        let scm = pipeline.scm(entry.scmid.as_deref())?;
        let scm = scm.as_deref();

        let (status, code) = match stage {
            Stage::Source => {
                let result = resource.source(scm)?;
                self.print(cli, stage, entry, &result, result.status, &result.description, result.value.as_deref())?;
                let code = (result.status == StepStatus::Unmatched).then_some(exit_codes::NO_MATCH);
                (result.status, code)
            }
            Stage::Condition => {
                let result = resource.condition(&source, scm)?;
                self.print(cli, stage, entry, &result, result.status, &result.description, None)?;
                let code = match result.status {
                    StepStatus::Unmatched => Some(exit_codes::NO_MATCH),
                    _ if result.status.is_failure() || !result.pass => Some(exit_codes::ERROR),
                    _ => None,
                };
                (result.status, code)
            }
            Stage::Target => {
                let result = resource.target(&source, scm, self.dry_run)?;
                self.print(cli, stage, entry, &result, result.status, &result.description, None)?;
                (result.status, None)
            }
        };

        info!(stage = %stage, id = %self.id, status = %status, "step finished");
        if let Some(code) = code {
            std::process::exit(code);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn print<R: Serialize>(
        &self,
        cli: &Cli,
        stage: Stage,
        entry: &ResourceConfig,
        result: &R,
        status: StepStatus,
        description: &str,
        value: Option<&str>,
    ) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => output::json(&StepReport {
                stage,
                id: &self.id,
                kind: &entry.kind,
                result,
            }),
            OutputFormat::Text => {
                if let Some(value) = value.filter(|_| cli.quiet) {
                    println!("{}", value);
                    return Ok(());
                }
                if cli.quiet {
                    return Ok(());
                }

                let name = entry.name.as_deref().unwrap_or(&self.id);
                println!(
                    "{} {} {} {}",
                    output::status(status),
                    style(stage).bold(),
                    name,
                    style(format!("({})", entry.kind)).dim()
                );
                println!("{}", output::key_value("description", description));
                if let Some(value) = value {
                    println!("{}", output::key_value("value", &style(value).green().to_string()));
                }
                if self.dry_run && stage == Stage::Target {
                    output::info("dry run, nothing was changed");
                }
                Ok(())
            }
        }
    }
}
