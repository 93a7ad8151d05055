//! `gittag` resource: tags of a local git repository

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use updatecli_core::error::{ResourceError, Result};
use updatecli_core::types::{ConditionResult, SourceResult, TargetResult};
use updatecli_git::{GitHandler, GitRepo, TagInfo};
use updatecli_scm::ScmHandler;
use updatecli_version::Filter;

use crate::registry::ResourceContext;
use crate::traits::{decode_spec, first_set, select, working_directory, Resource};

/// Resource kind
pub const KIND: &str = "gittag";

/// Annotation used when a spec sets no message
pub const DEFAULT_TAG_MESSAGE: &str = "Generated by updatecli";

/// What a git source returns for the selected reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// The reference name
    #[default]
    #[serde(alias = "")]
    Name,
    /// The commit hash it points to
    Hash,
}

/// `gittag` spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitTagSpec {
    /// Repository path; defaults to the scm working copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Filter selecting the tag
    #[serde(
        rename = "versionfilter",
        alias = "versionFilter",
        skip_serializing_if = "Filter::is_zero"
    )]
    pub version_filter: Filter,
    /// Exact tag checked by the condition and created by the target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Annotation of a created tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Return the tag name or its commit hash
    pub key: Key,
}

/// Tags of a local git repository
pub struct GitTag {
    spec: GitTagSpec,
    filter: Filter,
    git: Arc<dyn GitHandler>,
}

impl GitTag {
    /// Create the resource, initialising its version filter
    pub fn new(spec: GitTagSpec, git: Arc<dyn GitHandler>) -> Result<Self> {
        let mut filter = spec.version_filter.clone();
        filter.init()?;
        Ok(Self { spec, filter, git })
    }

    pub(crate) fn build(spec: Value, ctx: &ResourceContext) -> Result<Box<dyn Resource>> {
        let spec: GitTagSpec = decode_spec(KIND, spec)?;
        Ok(Box::new(Self::new(spec, ctx.git.clone())?))
    }

    /// Resource spec
    pub fn spec(&self) -> &GitTagSpec {
        &self.spec
    }

    fn tags(&self, scm: Option<&dyn ScmHandler>) -> Result<(PathBuf, Vec<TagInfo>)> {
        let dir = working_directory(KIND, self.spec.path.as_deref(), scm)?;
        let tags = self.git.tags(&dir)?;
        Ok((dir, tags))
    }
}

impl Resource for GitTag {
    fn kind(&self) -> &'static str {
        KIND
    }

    #[instrument(skip(self, scm), fields(resource = KIND))]
    fn source(&self, scm: Option<&dyn ScmHandler>) -> Result<SourceResult> {
        let (_, tags) = self.tags(scm)?;
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();

        let Some(version) = select(&self.filter, &names)? else {
            return Ok(SourceResult::unmatched(format!(
                "no git tag found matching pattern {:?}",
                self.filter.pattern
            )));
        };

        let name = version.original_version();
        let value = match self.spec.key {
            Key::Name => name.to_string(),
            Key::Hash => tags
                .iter()
                .find(|t| t.name == name)
                .map(|t| t.commit_hash.clone())
                .unwrap_or_default(),
        };

        info!(tag = name, "git tag found");
        Ok(SourceResult::found(
            value,
            name,
            format!("git tag {:?} found matching pattern {:?}", name, self.filter.pattern),
        ))
    }

    #[instrument(skip(self, scm), fields(resource = KIND))]
    fn condition(&self, source: &str, scm: Option<&dyn ScmHandler>) -> Result<ConditionResult> {
        let (_, tags) = self.tags(scm)?;
        if tags.is_empty() {
            return Ok(ConditionResult::from_pass(false, "no tags found"));
        }

        if let Some(tag) = first_set(self.spec.tag.as_deref(), source) {
            return Ok(if tags.iter().any(|t| t.name == tag) {
                ConditionResult::from_pass(true, format!("git tag {:?} found", tag))
            } else {
                ConditionResult::from_pass(false, format!("no git tag found matching {:?}", tag))
            });
        }

        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        Ok(match select(&self.filter, &names)? {
            Some(_) => ConditionResult::from_pass(
                true,
                format!("git tag matching {:?} found", self.filter.pattern),
            ),
            None => ConditionResult::unmatched(format!(
                "no git tag found matching pattern {:?}",
                self.filter.pattern
            )),
        })
    }

    #[instrument(skip(self, scm), fields(resource = KIND))]
    fn target(
        &self,
        source: &str,
        scm: Option<&dyn ScmHandler>,
        dry_run: bool,
    ) -> Result<TargetResult> {
        let Some(tag) = first_set(self.spec.tag.as_deref(), source) else {
            return Err(ResourceError::Validation("no git tag name specified".to_string()).into());
        };

        let (dir, tags) = self.tags(scm)?;
        if tags.iter().any(|t| t.name == tag) {
            return Ok(TargetResult::unchanged(format!("git tag {:?} already exists", tag)));
        }

        if dry_run {
            return Ok(TargetResult::changed(
                false,
                format!("git tag {:?} should be created", tag),
            ));
        }

        let message = match self.spec.message.as_deref().filter(|m| !m.is_empty()) {
            Some(message) => message,
            None => {
                warn!("no tag message specified, using {:?}", DEFAULT_TAG_MESSAGE);
                DEFAULT_TAG_MESSAGE
            }
        };

        let created = GitRepo::open(&dir)?.create_tag(tag, Some(message))?;
        info!(tag, commit = %created.commit_hash, "git tag created");

        // Only the scm's own working copy can be pushed through it
        let published = match scm.filter(|_| self.spec.path.is_none()) {
            Some(scm) => {
                scm.push_tag(tag)?;
                true
            }
            None => false,
        };

        Ok(TargetResult::changed(published, format!("git tag {:?} created", tag)))
    }
}
