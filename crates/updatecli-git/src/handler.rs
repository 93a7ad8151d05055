//! Git query seam

use std::collections::BTreeMap;
use std::path::Path;

use crate::repository::{GitRepo, Result};
use crate::types::{BranchInfo, TagInfo};

/// Read-only queries against a git working copy.
///
/// Scm discovery and the git resources go through this trait so they can
/// be exercised without a real repository.
pub trait GitHandler: Send + Sync {
    /// Map of remote name to URL for the repository containing `directory`
    fn remote_urls(&self, directory: &Path) -> Result<BTreeMap<String, String>>;

    /// Tags, oldest first
    fn tags(&self, directory: &Path) -> Result<Vec<TagInfo>>;

    /// Local branches, oldest first
    fn branches(&self, directory: &Path) -> Result<Vec<BranchInfo>>;
}

/// [`GitHandler`] backed by the local repository
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeGit;

impl GitHandler for NativeGit {
    fn remote_urls(&self, directory: &Path) -> Result<BTreeMap<String, String>> {
        GitRepo::discover(directory)?.remote_urls()
    }

    fn tags(&self, directory: &Path) -> Result<Vec<TagInfo>> {
        GitRepo::discover(directory)?.tags()
    }

    fn branches(&self, directory: &Path) -> Result<Vec<BranchInfo>> {
        GitRepo::discover(directory)?.branches()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;
    use tempfile::TempDir;

    #[test]
    fn test_native_remote_urls() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        repo.remote("origin", "https://github.com/olblak/updatecli")
            .unwrap();

        let urls = NativeGit.remote_urls(temp.path()).unwrap();
        assert_eq!(urls["origin"], "https://github.com/olblak/updatecli");
    }

    #[test]
    fn test_native_outside_repository() {
        let temp = TempDir::new().unwrap();
        assert!(NativeGit.remote_urls(temp.path()).is_err());
    }
}
