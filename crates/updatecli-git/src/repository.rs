//! Working copy handle

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};
use tracing::{debug, instrument};

use updatecli_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// A non-bare repository opened through `git2`
pub struct GitRepo {
    pub(crate) repo: Repository,
    directory: PathBuf,
}

impl GitRepo {
    /// Open the working copy rooted at `directory`
    #[instrument(fields(directory = %directory.display()))]
    pub fn open(directory: &Path) -> Result<Self> {
        let repo = Repository::open(directory)
            .map_err(|e| open_error(e, || GitError::RepositoryNotFound(directory.to_path_buf())))?;
        Self::with_workdir(repo)
    }

    /// Open the working copy containing `path`, looking through parent directories
    #[instrument(fields(path = %path.display()))]
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|e| open_error(e, || GitError::NotARepository(path.to_path_buf())))?;
        Self::with_workdir(repo)
    }

    fn with_workdir(repo: Repository) -> Result<Self> {
        let directory = repo
            .workdir()
            .ok_or_else(|| GitError::NotARepository(repo.path().to_path_buf()))?
            .to_path_buf();
        debug!(directory = %directory.display(), "opened working copy");
        Ok(Self { repo, directory })
    }

    /// Root of the working tree
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Commit HEAD points at; fails on an unborn branch
    pub fn head_commit(&self) -> Result<git2::Commit<'_>> {
        Ok(self.repo.head()?.peel_to_commit()?)
    }

    /// Full hash of the HEAD commit
    pub fn head_hash(&self) -> Result<String> {
        Ok(self.head_commit()?.id().to_string())
    }
}

fn open_error(e: git2::Error, not_found: impl FnOnce() -> GitError) -> GitError {
    if e.code() == ErrorCode::NotFound {
        not_found()
    } else {
        GitError::OpenFailed(e.to_string())
    }
}
