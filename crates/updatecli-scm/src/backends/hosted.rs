//! Hosted backends: github, gitlab, gitea, bitbucket and stash

use std::path::{Path, PathBuf};

use tracing::warn;

use super::workspace::{working_branches, Workspace, DEFAULT_COMMIT_EMAIL, DEFAULT_COMMIT_USER};
use crate::config::DEFAULT_BRANCH;
use crate::handler::{Branches, ScmHandler};
use crate::kind::ScmKind;
use crate::spec::HostedSpec;
use crate::Result;
use updatecli_core::config::ScmSettings;
use updatecli_core::error::ScmError;
use updatecli_git::credentials::DEFAULT_TOKEN_USERNAME;
use updatecli_git::{authenticated_url, redact_url};

/// Public instance of `kind`, if it has one
pub fn default_host(kind: ScmKind) -> Option<&'static str> {
    match kind {
        ScmKind::Github | ScmKind::GithubSearch => Some("github.com"),
        ScmKind::Gitlab | ScmKind::GitlabSearch => Some("gitlab.com"),
        ScmKind::Bitbucket => Some("bitbucket.org"),
        _ => None,
    }
}

/// `https://` is assumed when `url` carries no scheme
pub(crate) fn with_scheme(url: &str) -> String {
    if url.starts_with("https://") || url.starts_with("http://") {
        url.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", url.trim_end_matches('/'))
    }
}

/// Scm for a single repository on a hosting service
#[derive(Debug)]
pub struct HostedScm {
    kind: ScmKind,
    owner: String,
    repository: String,
    clone_url: String,
    workspace: Workspace,
}

impl HostedScm {
    /// Resolve defaults of `spec`; the spec must already be valid
    pub fn new(
        kind: ScmKind,
        spec: &HostedSpec,
        pipeline_id: &str,
        settings: &ScmSettings,
    ) -> Result<Self> {
        let required = |field: &Option<String>, name: &str| {
            field
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ScmError::Validation {
                    kind: kind.to_string(),
                    message: format!("{} parameter(s) required: [{}]", kind, name),
                })
        };

        let owner = required(&spec.owner, "owner")?;
        let repository = required(&spec.repository, "repository")?;
        let host = match spec.url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => url.to_string(),
            None => default_host(kind)
                .map(str::to_string)
                .ok_or_else(|| ScmError::Validation {
                    kind: kind.to_string(),
                    message: format!("{} parameter(s) required: [url]", kind),
                })?,
        };
        let clone_url = clone_url(kind, &with_scheme(&host), &owner, &repository);

        let branch = match spec.branch.as_deref() {
            Some(branch) => branch,
            None => {
                warn!(kind = %kind, "no git branch specified, fallback to {:?}", DEFAULT_BRANCH);
                DEFAULT_BRANCH
            }
        };

        let directory = spec.directory.clone().unwrap_or_else(|| {
            settings
                .tmp_directory
                .join(kind.as_str())
                .join(&owner)
                .join(&repository)
        });

        let username = spec.username.as_deref().unwrap_or(DEFAULT_TOKEN_USERNAME);
        let workspace = Workspace {
            remote: authenticated_url(&clone_url, Some(username), spec.secret()),
            directory,
            branches: working_branches(
                branch,
                spec.working_branch.unwrap_or(true),
                pipeline_id,
                &settings.working_branch_prefix,
                &settings.working_branch_separator,
            ),
            user: spec
                .user
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMIT_USER.to_string()),
            email: spec
                .email
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMIT_EMAIL.to_string()),
            force: spec.force.unwrap_or(true),
            submodules: spec.submodules.unwrap_or(true),
        };

        Ok(Self {
            kind,
            owner,
            repository,
            clone_url,
            workspace,
        })
    }

    /// Repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

fn clone_url(kind: ScmKind, host: &str, owner: &str, repository: &str) -> String {
    match kind {
        ScmKind::Stash => format!("{}/scm/{}/{}.git", host, owner, repository),
        _ => format!("{}/{}/{}.git", host, owner, repository),
    }
}

impl ScmHandler for HostedScm {
    fn kind(&self) -> ScmKind {
        self.kind
    }

    fn add(&self, files: &[PathBuf]) -> Result<()> {
        self.workspace.add(files)
    }

    fn clone_repo(&self) -> Result<PathBuf> {
        self.workspace.clone_repo()
    }

    fn checkout(&self) -> Result<()> {
        self.workspace.checkout()
    }

    fn directory(&self) -> &Path {
        self.workspace.directory()
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.workspace.commit(message)
    }

    fn push(&self) -> Result<bool> {
        self.workspace.push()
    }

    fn clean(&self) -> Result<()> {
        self.workspace.clean()
    }

    fn clean_working_branch(&self) -> Result<bool> {
        self.workspace.clean_working_branch()
    }

    fn is_remote_branch_up_to_date(&self) -> Result<bool> {
        self.workspace.is_remote_branch_up_to_date()
    }

    fn is_remote_working_branch_exist(&self) -> Result<bool> {
        self.workspace.is_remote_working_branch_exist()
    }

    fn push_tag(&self, tag: &str) -> Result<()> {
        self.workspace.push_tag(tag)
    }

    fn push_branch(&self, branch: &str) -> Result<()> {
        self.workspace.push_branch(branch)
    }

    fn changed_files(&self) -> Result<Vec<PathBuf>> {
        self.workspace.changed_files()
    }

    fn branches(&self) -> Branches {
        self.workspace.branches.clone()
    }

    fn url(&self) -> String {
        redact_url(&self.clone_url)
    }

    fn summary(&self) -> String {
        format!(
            "{}/{} on {} ({} -> {})",
            self.owner,
            self.repository,
            self.kind,
            self.workspace.branches.working,
            self.workspace.branches.target
        )
    }
}
