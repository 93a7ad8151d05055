//! Repository status operations

use git2::{ResetType, StatusOptions};
use tracing::{debug, info, instrument};

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Check if the working directory is clean (no uncommitted changes)
    pub fn is_clean(&self) -> Result<bool> {
        Ok(self.changed_files()?.is_empty())
    }

    /// Get the current branch name
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            // Detached HEAD
            Ok(None)
        }
    }

    /// Files that differ from HEAD: staged, modified, deleted or untracked
    pub fn changed_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let files: Vec<String> = statuses
            .iter()
            .filter(|entry| !entry.status().is_ignored())
            .filter_map(|entry| entry.path().map(|p| p.to_string()))
            .collect();

        debug!(count = files.len(), "listed changed files");
        Ok(files)
    }

    /// Discard every local change: hard reset to HEAD and remove untracked files
    #[instrument(skip(self))]
    pub fn clean_worktree(&self) -> Result<()> {
        let head = self.head_commit()?;
        self.repo.reset(head.as_object(), ResetType::Hard, None)?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let untracked: Vec<String> = self
            .repo
            .statuses(Some(&mut opts))?
            .iter()
            .filter(|entry| entry.status().is_wt_new())
            .filter_map(|entry| entry.path().map(|p| p.to_string()))
            .collect();

        for file in &untracked {
            std::fs::remove_file(self.directory().join(file))?;
        }

        info!(removed = untracked.len(), "cleaned working tree");
        Ok(())
    }
}
