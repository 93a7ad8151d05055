//! `gitbranch` resource: branches of a local git repository

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use updatecli_core::error::{ResourceError, Result};
use updatecli_core::types::{ConditionResult, SourceResult, TargetResult};
use updatecli_git::{BranchInfo, GitHandler, GitRepo};
use updatecli_scm::ScmHandler;
use updatecli_version::Filter;

use crate::gittag::Key;
use crate::registry::ResourceContext;
use crate::traits::{decode_spec, first_set, select, working_directory, Resource};

/// Resource kind
pub const KIND: &str = "gitbranch";

/// `gitbranch` spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitBranchSpec {
    /// Repository path; defaults to the scm working copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Filter selecting the branch
    #[serde(
        rename = "versionfilter",
        alias = "versionFilter",
        skip_serializing_if = "Filter::is_zero"
    )]
    pub version_filter: Filter,
    /// Exact branch checked by the condition and created by the target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Revision a created branch starts from; HEAD when unset
    #[serde(
        rename = "sourcebranch",
        alias = "sourceBranch",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_branch: Option<String>,
    /// Return the branch name or its tip commit hash
    pub key: Key,
}

/// Branches of a local git repository
pub struct GitBranch {
    spec: GitBranchSpec,
    filter: Filter,
    git: Arc<dyn GitHandler>,
}

impl GitBranch {
    /// Create the resource, initialising its version filter
    pub fn new(spec: GitBranchSpec, git: Arc<dyn GitHandler>) -> Result<Self> {
        let mut filter = spec.version_filter.clone();
        filter.init()?;
        Ok(Self { spec, filter, git })
    }

    pub(crate) fn build(spec: Value, ctx: &ResourceContext) -> Result<Box<dyn Resource>> {
        let spec: GitBranchSpec = decode_spec(KIND, spec)?;
        Ok(Box::new(Self::new(spec, ctx.git.clone())?))
    }

    fn branches(&self, scm: Option<&dyn ScmHandler>) -> Result<(PathBuf, Vec<BranchInfo>)> {
        let dir = working_directory(KIND, self.spec.path.as_deref(), scm)?;
        let branches = self.git.branches(&dir)?;
        Ok((dir, branches))
    }
}

impl Resource for GitBranch {
    fn kind(&self) -> &'static str {
        KIND
    }

    #[instrument(skip(self, scm), fields(resource = KIND))]
    fn source(&self, scm: Option<&dyn ScmHandler>) -> Result<SourceResult> {
        let (_, branches) = self.branches(scm)?;
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();

        let Some(version) = select(&self.filter, &names)? else {
            return Ok(SourceResult::unmatched(format!(
                "no git branch found matching pattern {:?}",
                self.filter.pattern
            )));
        };

        let name = version.original_version();
        let value = match self.spec.key {
            Key::Name => name.to_string(),
            Key::Hash => branches
                .iter()
                .find(|b| b.name == name)
                .map(|b| b.commit_hash.clone())
                .unwrap_or_default(),
        };

        Ok(SourceResult::found(
            value,
            name,
            format!("git branch {:?} found matching pattern {:?}", name, self.filter.pattern),
        ))
    }

    #[instrument(skip(self, scm), fields(resource = KIND))]
    fn condition(&self, source: &str, scm: Option<&dyn ScmHandler>) -> Result<ConditionResult> {
        let (_, branches) = self.branches(scm)?;

        if let Some(branch) = first_set(self.spec.branch.as_deref(), source) {
            return Ok(if branches.iter().any(|b| b.name == branch) {
                ConditionResult::from_pass(true, format!("git branch {:?} found", branch))
            } else {
                ConditionResult::from_pass(false, format!("no git branch found matching {:?}", branch))
            });
        }

        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        Ok(match select(&self.filter, &names)? {
            Some(version) => ConditionResult::from_pass(
                true,
                format!("git branch {:?} found", version.original_version()),
            ),
            None => ConditionResult::unmatched(format!(
                "no git branch found matching pattern {:?}",
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
        let Some(branch) = first_set(self.spec.branch.as_deref(), source) else {
            return Err(ResourceError::Validation("empty branch specified".to_string()).into());
        };

        let (dir, branches) = self.branches(scm)?;
        if branches.iter().any(|b| b.name == branch) {
            return Ok(TargetResult::unchanged(format!(
                "git branch {:?} already exists",
                branch
            )));
        }

        if dry_run {
            return Ok(TargetResult::changed(
                false,
                format!("git branch {:?} should be created", branch),
            ));
        }

        GitRepo::open(&dir)?.create_branch(branch, self.spec.source_branch.as_deref())?;
        info!(branch, "git branch created");

        let published = match scm.filter(|_| self.spec.path.is_none()) {
            Some(scm) => {
                scm.push_branch(branch)?;
                true
            }
            None => false,
        };

        Ok(TargetResult::changed(
            published,
            format!("git branch {:?} created", branch),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{init_repo, MockGit, RecordingScm};
    use tempfile::TempDir;
    use updatecli_core::types::StepStatus;
    use updatecli_version::FilterKind;

    fn resource(spec: GitBranchSpec) -> GitBranch {
        let git = Arc::new(MockGit {
            branches: vec![
                ("main", "aaa111"),
                ("release/v1.0", "bbb222"),
                ("release/v1.1", "ccc333"),
            ],
            ..Default::default()
        });
        let spec = GitBranchSpec {
            path: Some(PathBuf::from("/tmp/test-repo")),
            ..spec
        };
        GitBranch::new(spec, git).unwrap()
    }

    #[test]
    fn test_source_regex_semver() {
        let resource = resource(GitBranchSpec {
            version_filter: Filter::new(FilterKind::RegexSemver, "~1")
                .with_regex(r"^release/v(\d+\.\d+)$"),
            ..Default::default()
        });
        let result = resource.source(None).unwrap();
        assert_eq!(result.value.as_deref(), Some("release/v1.1"));
    }

    #[test]
    fn test_source_hash_key() {
        let resource = resource(GitBranchSpec {
            version_filter: Filter::new(FilterKind::Literal, "main"),
            key: Key::Hash,
            ..Default::default()
        });
        let result = resource.source(None).unwrap();
        assert_eq!(result.value.as_deref(), Some("aaa111"));
        assert_eq!(result.original.as_deref(), Some("main"));
    }

    #[test]
    fn test_source_unmatched() {
        let resource = resource(GitBranchSpec {
            version_filter: Filter::new(FilterKind::Regex, "^hotfix/"),
            ..Default::default()
        });
        assert_eq!(resource.source(None).unwrap().status, StepStatus::Unmatched);
    }

    #[test]
    fn test_condition() {
        let res = resource(GitBranchSpec::default());
        assert!(res.condition("main", None).unwrap().pass);

        let result = res.condition("develop", None).unwrap();
        assert!(!result.pass);
        assert_eq!(result.description, "no git branch found matching \"develop\"");

        let resource = resource(GitBranchSpec {
            branch: Some("release/v1.0".to_string()),
            ..Default::default()
        });
        assert!(resource.condition("develop", None).unwrap().pass);
    }

    #[test]
    fn test_target_requires_a_branch() {
        let resource = resource(GitBranchSpec::default());
        let err = resource.target("", None, false).unwrap_err();
        assert!(err.to_string().contains("empty branch specified"));
    }

    #[test]
    fn test_target_existing_branch_is_unchanged() {
        let resource = resource(GitBranchSpec::default());
        let result = resource.target("main", None, false).unwrap();
        assert!(!result.changed);
        assert_eq!(result.status, StepStatus::Success);
    }

    #[test]
    fn test_target_creates_and_pushes_branch() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        let scm = RecordingScm::new(temp.path());
        let resource = GitBranch::new(
            GitBranchSpec {
                source_branch: Some("main".to_string()),
                ..Default::default()
            },
            Arc::new(updatecli_git::NativeGit),
        )
        .unwrap();

        let dry = resource.target("feature/x", Some(&scm), true).unwrap();
        assert!(dry.changed);
        assert!(scm.pushed().is_empty());

        let result = resource.target("feature/x", Some(&scm), false).unwrap();
        assert!(result.changed);
        assert!(result.published);
        assert_eq!(scm.pushed(), vec!["branch:feature/x".to_string()]);
        assert!(GitRepo::open(temp.path()).unwrap().branch_exists("feature/x").unwrap());
    }

    #[test]
    fn test_spec_decoding() {
        let spec: GitBranchSpec = decode_spec(
            KIND,
            serde_json::json!({"branch": "dev", "sourceBranch": "main"}),
        )
        .unwrap();
        assert_eq!(spec.source_branch.as_deref(), Some("main"));

        let spec: GitBranchSpec =
            decode_spec(KIND, serde_json::json!({"sourcebranch": "main"})).unwrap();
        assert_eq!(spec.source_branch.as_deref(), Some("main"));
    }
}
