//! Local working copy shared by the git based backends

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::handler::Branches;
use crate::Result;
use updatecli_core::error::GitError;
use updatecli_git::{
    git_clone, git_fetch, git_push_branch, git_push_tag, redact_url, sanitize_branch_name,
    GitRepo, PushOptions,
};

/// Commit identity used when a spec sets none
pub(crate) const DEFAULT_COMMIT_USER: &str = "updatecli";
pub(crate) const DEFAULT_COMMIT_EMAIL: &str = "bot@updatecli.io";

/// A clone on disk plus the settings needed to publish from it
#[derive(Clone)]
pub(crate) struct Workspace {
    /// Remote URL, possibly carrying credentials; never logged as is
    pub(crate) remote: String,
    pub(crate) directory: PathBuf,
    pub(crate) branches: Branches,
    pub(crate) user: String,
    pub(crate) email: String,
    pub(crate) force: bool,
    pub(crate) submodules: bool,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("remote", &redact_url(&self.remote))
            .field("directory", &self.directory)
            .field("branches", &self.branches)
            .field("force", &self.force)
            .finish()
    }
}

impl Workspace {
    fn open(&self) -> Result<GitRepo> {
        Ok(GitRepo::open(&self.directory)?)
    }

    fn push_options(&self) -> PushOptions<'_> {
        PushOptions {
            remote: &self.remote,
            force: self.force,
        }
    }

    pub(crate) fn directory(&self) -> &Path {
        &self.directory
    }

    #[instrument(skip(self), fields(url = %redact_url(&self.remote), dir = %self.directory.display()))]
    pub(crate) fn clone_repo(&self) -> Result<PathBuf> {
        if self.directory.join(".git").exists() {
            info!("repository already cloned, fetching");
            git_fetch(&self.directory, &self.remote)?;
        } else {
            if let Some(parent) = self.directory.parent() {
                std::fs::create_dir_all(parent)?;
            }
            git_clone(
                &self.remote,
                &self.directory,
                Some(&self.branches.source),
                self.submodules,
            )?;
        }
        Ok(self.directory.clone())
    }

    #[instrument(skip(self), fields(source = %self.branches.source, working = %self.branches.working))]
    pub(crate) fn checkout(&self) -> Result<()> {
        let repo = self.open()?;
        let source = &self.branches.source;

        if !repo.branch_exists(source)? {
            let tracking = format!("origin/{}", source);
            repo.create_branch(source, Some(&tracking))?;
        }
        repo.checkout_branch(&self.branches.working, Some(source))?;
        Ok(())
    }

    pub(crate) fn add(&self, files: &[PathBuf]) -> Result<()> {
        self.open()?.add(files)?;
        Ok(())
    }

    pub(crate) fn commit(&self, message: &str) -> Result<()> {
        let hash = self.open()?.commit(&self.user, &self.email, message)?;
        info!(hash = %hash, "committed changes");
        Ok(())
    }

    /// Push the working branch unless the remote already has its tip
    pub(crate) fn push(&self) -> Result<bool> {
        if self.is_remote_branch_up_to_date()? {
            info!(branch = %self.branches.working, "remote branch up to date, nothing to push");
            return Ok(false);
        }
        git_push_branch(&self.directory, &self.branches.working, &self.push_options())?;
        Ok(true)
    }

    /// Whether the remote working branch points at the local working branch tip
    #[instrument(skip(self), fields(branch = %self.branches.working))]
    pub(crate) fn is_remote_branch_up_to_date(&self) -> Result<bool> {
        let repo = self.open()?;
        let Some(local) = repo.branch_head(&self.branches.working)? else {
            return Ok(false);
        };
        let remote = repo.remote_branch_head(&self.remote, &self.branches.working)?;
        let synced = remote.as_deref() == Some(local.as_str());
        debug!(local = %local, remote = ?remote, synced, "compared working branch with remote");
        Ok(synced)
    }

    pub(crate) fn is_remote_working_branch_exist(&self) -> Result<bool> {
        let head = self
            .open()?
            .remote_branch_head(&self.remote, &self.branches.working)?;
        Ok(head.is_some())
    }

    /// Drop the local working branch when it carries nothing the target
    /// branch does not; returns whether it was deleted
    #[instrument(skip(self), fields(working = %self.branches.working, target = %self.branches.target))]
    pub(crate) fn clean_working_branch(&self) -> Result<bool> {
        let Branches { working, target, .. } = &self.branches;
        if working == target {
            info!("working branch is the target branch, keeping it");
            return Ok(false);
        }

        let repo = self.open()?;
        let Some(working_head) = repo.branch_head(working)? else {
            debug!("no local working branch");
            return Ok(false);
        };
        let target_head = repo
            .branch_head(target)?
            .ok_or_else(|| GitError::BranchNotFound(target.clone()))?;
        if working_head != target_head {
            return Ok(false);
        }

        if repo.current_branch()?.as_deref() == Some(working.as_str()) {
            repo.checkout_branch(target, None)?;
        }
        repo.delete_branch(working)?;
        Ok(true)
    }

    pub(crate) fn push_tag(&self, tag: &str) -> Result<()> {
        git_push_tag(&self.directory, tag, &self.push_options())?;
        Ok(())
    }

    pub(crate) fn push_branch(&self, branch: &str) -> Result<()> {
        git_push_branch(&self.directory, branch, &self.push_options())?;
        Ok(())
    }

    pub(crate) fn clean(&self) -> Result<()> {
        if !self.directory.exists() {
            warn!(dir = %self.directory.display(), "nothing to clean, directory does not exist");
            return Ok(());
        }
        let repo = self.open()?;
        if repo.is_clean()? {
            debug!("working tree already clean");
            return Ok(());
        }
        repo.clean_worktree()?;
        Ok(())
    }

    pub(crate) fn changed_files(&self) -> Result<Vec<PathBuf>> {
        let files = self.open()?.changed_files()?;
        Ok(files.into_iter().map(PathBuf::from).collect())
    }
}

/// Source, working and target branches for `branch`.
///
/// The working branch is `<prefix><sep><branch><sep><pipeline id>` when a
/// working branch is requested and a pipeline id is known.
pub(crate) fn working_branches(
    branch: &str,
    working_branch: bool,
    pipeline_id: &str,
    prefix: &str,
    separator: &str,
) -> Branches {
    let mut branches = Branches::single(branch);
    if working_branch && !pipeline_id.is_empty() {
        branches.working = sanitize_branch_name(&[prefix, branch, pipeline_id].join(separator));
    }
    branches
}

/// Directory name derived from a remote URL, without scheme, credentials
/// or path separators
pub(crate) fn directory_name(url: &str) -> String {
    let url = ["https://", "ssh://", "http://", "file://"]
        .iter()
        .fold(url, |acc, scheme| acc.strip_prefix(scheme).unwrap_or(acc));
    let url = url.rsplit_once('@').map_or(url, |(_, rest)| rest);

    url.chars()
        .filter(|c| !"@~%$* +?\"<>|".contains(*c))
        .map(|c| if "/\\.:".contains(c) { '_' } else { c })
        .collect()
}
