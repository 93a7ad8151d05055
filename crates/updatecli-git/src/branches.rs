//! Branch operations

use git2::build::CheckoutBuilder;
use git2::BranchType;
use tracing::{debug, info, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::{commit_time, BranchInfo};
use updatecli_core::error::GitError;

impl GitRepo {
    /// Local branches, oldest tip commit first
    #[instrument(skip(self))]
    pub fn branches(&self) -> Result<Vec<BranchInfo>> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };
            let commit = branch.get().peel_to_commit()?;
            branches.push(BranchInfo {
                name: name.to_string(),
                commit_hash: commit.id().to_string(),
                timestamp: commit_time(&commit),
            });
        }

        branches.sort_by_key(|b| b.timestamp);
        debug!(count = branches.len(), "listed branches");
        Ok(branches)
    }

    /// Check if a local branch exists
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Commit the local branch `name` points at
    pub fn branch_head(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(branch) => Ok(branch.get().target().map(|oid| oid.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Delete the local branch `name`; it must not be checked out
    #[instrument(skip(self))]
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|_| GitError::BranchNotFound(name.to_string()))?;
        branch.delete()?;
        info!(name, "deleted branch");
        Ok(())
    }

    /// Create a local branch from `from` (any revision) or HEAD.
    ///
    /// Returns false when the branch already exists.
    #[instrument(skip(self))]
    pub fn create_branch(&self, name: &str, from: Option<&str>) -> Result<bool> {
        if self.branch_exists(name)? {
            debug!(name, "branch already exists");
            return Ok(false);
        }

        let commit = match from {
            Some(rev) => self
                .repo
                .revparse_single(rev)
                .map_err(|_| GitError::BranchNotFound(rev.to_string()))?
                .peel_to_commit()?,
            None => self.head_commit()?,
        };

        self.repo.branch(name, &commit, false)?;
        info!(name, from = from.unwrap_or("HEAD"), "created branch");
        Ok(true)
    }

    /// Switch to `name`, creating it from `from` (or HEAD) when missing
    #[instrument(skip(self))]
    pub fn checkout_branch(&self, name: &str, from: Option<&str>) -> Result<()> {
        self.create_branch(name, from)?;

        let refname = format!("refs/heads/{}", name);
        let target = self.repo.revparse_single(&refname)?;
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&refname)?;

        info!(name, "checked out branch");
        Ok(())
    }
}
