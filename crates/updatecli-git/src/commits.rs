//! Staging and commit operations

use std::path::Path;

use git2::Signature;
use tracing::{debug, info, instrument};

use crate::repository::{GitRepo, Result};
use updatecli_core::error::GitError;

impl GitRepo {
    /// Stage `files`, given relative to the working tree or as absolute paths inside it.
    ///
    /// Files that no longer exist are staged as deletions.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub fn add<P: AsRef<Path>>(&self, files: &[P]) -> Result<()> {
        let workdir = self.directory();
        let mut index = self.repo.index()?;

        for file in files {
            let file = file.as_ref();
            let relative = if file.is_absolute() {
                file.strip_prefix(workdir).map_err(|_| {
                    GitError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("{} is outside of {}", file.display(), workdir.display()),
                    ))
                })?
            } else {
                file
            };

            if workdir.join(relative).exists() {
                index.add_path(relative)?;
            } else {
                index.remove_path(relative)?;
            }
            debug!(file = %relative.display(), "staged file");
        }

        index.write()?;
        Ok(())
    }

    /// Commit the index on top of HEAD, returning the new commit hash
    #[instrument(skip(self, message), fields(user, email))]
    pub fn commit(&self, user: &str, email: &str, message: &str) -> Result<String> {
        let sig = Signature::now(user, email)?;
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                None
            }
            Err(e) => return Err(e.into()),
        };

        if parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
            return Err(GitError::NothingToCommit(self.directory().to_path_buf()));
        }

        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        info!(hash = %oid, "created commit");
        Ok(oid.to_string())
    }
}
