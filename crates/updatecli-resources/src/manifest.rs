//! Manifest model
//!
//! A manifest names the scm configurations and the resources of a pipeline.
//! Every section is keyed by a user chosen id; resources refer to an scm
//! through `scmid`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use updatecli_core::error::{ConfigError, Result};
use updatecli_scm::ScmConfig;

use crate::registry::{ResourceContext, ResourceRegistry};

/// Scm id that may be left undeclared, it is guessed from the working directory
pub const DEFAULT_SCM_ID: &str = "default";

/// Pipeline stage a resource belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Source,
    Condition,
    Target,
}

impl Stage {
    /// Stages in pipeline order
    pub const ALL: [Stage; 3] = [Self::Source, Self::Condition, Self::Target];

    /// Manifest section holding this stage
    pub fn section(&self) -> &'static str {
        match self {
            Self::Source => "sources",
            Self::Condition => "conditions",
            Self::Target => "targets",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Source => "source",
            Self::Condition => "condition",
            Self::Target => "target",
        };
        write!(f, "{}", name)
    }
}

/// One resource entry of a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Human readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resource kind, selects the shape of `spec`
    pub kind: String,
    /// Scm the resource works in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scmid: Option<String>,
    /// Source feeding a condition or target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourceid: Option<String>,
    /// Kind specific settings, decoded once the kind is known
    #[serde(skip_serializing_if = "Value::is_null")]
    pub spec: Value,
}

/// A pipeline manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Pipeline name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Scm configurations by id
    pub scms: BTreeMap<String, ScmConfig>,
    /// Sources by id
    pub sources: BTreeMap<String, ResourceConfig>,
    /// Conditions by id
    pub conditions: BTreeMap<String, ResourceConfig>,
    /// Targets by id
    pub targets: BTreeMap<String, ResourceConfig>,
}

/// A problem found while validating a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIssue {
    /// Manifest section (`scms`, `sources`, ...)
    pub section: &'static str,
    /// Entry id
    pub id: String,
    /// What is wrong
    pub message: String,
}

impl fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.section, self.id, self.message)
    }
}

/// Load a manifest, TOML by `.toml` extension and YAML otherwise
#[instrument]
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let manifest = if path.extension().is_some_and(|e| e == "toml") {
        Manifest::from_toml(&content)?
    } else {
        Manifest::from_yaml(&content)?
    };

    info!(
        scms = manifest.scms.len(),
        sources = manifest.sources.len(),
        conditions = manifest.conditions.len(),
        targets = manifest.targets.len(),
        "manifest loaded"
    );
    Ok(manifest)
}

impl Manifest {
    /// Parse a YAML manifest
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content).map_err(ConfigError::YamlError)?)
    }

    /// Parse a TOML manifest
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::TomlError)?)
    }

    /// Resources of `stage`
    pub fn section(&self, stage: Stage) -> &BTreeMap<String, ResourceConfig> {
        match stage {
            Stage::Source => &self.sources,
            Stage::Condition => &self.conditions,
            Stage::Target => &self.targets,
        }
    }

    /// Resource `id`, searched in sources, conditions then targets
    pub fn resource(&self, id: &str) -> Option<(Stage, &ResourceConfig)> {
        Stage::ALL
            .into_iter()
            .find_map(|stage| self.section(stage).get(id).map(|config| (stage, config)))
    }

    /// Check every scm configuration and resource spec.
    ///
    /// Nothing is cloned or fetched; scm handlers and resources are only
    /// constructed.
    pub fn validate(&self, registry: &ResourceRegistry, ctx: &ResourceContext) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();

        for (id, scm) in &self.scms {
            if id == DEFAULT_SCM_ID {
                // completed from the working directory before it is built
                continue;
            }
            if let Err(e) = updatecli_scm::build(scm, "", &ctx.config) {
                issues.push(ManifestIssue {
                    section: "scms",
                    id: id.clone(),
                    message: e.to_string(),
                });
            }
        }

        for stage in Stage::ALL {
            for (id, config) in self.section(stage) {
                let mut issue = |message: String| {
                    issues.push(ManifestIssue {
                        section: stage.section(),
                        id: id.clone(),
                        message,
                    })
                };

                if let Some(scmid) = config.scmid.as_deref() {
                    if scmid != DEFAULT_SCM_ID && !self.scms.contains_key(scmid) {
                        issue(format!("unknown scmid {:?}", scmid));
                    }
                }
                if let Some(sourceid) = config.sourceid.as_deref() {
                    if stage == Stage::Source {
                        issue("sourceid is not allowed on a source".to_string());
                    } else if !self.sources.contains_key(sourceid) {
                        issue(format!("unknown sourceid {:?}", sourceid));
                    }
                }
                if let Err(e) = registry.build(&config.kind, config.spec.clone(), ctx) {
                    issue(e.to_string());
                }
            }
        }

        debug!(issues = issues.len(), "manifest validated");
        issues
    }
}
