//! Test fixtures shared by the resource plugins

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use git2::{Repository, Signature};

use updatecli_core::error::GitError;
use updatecli_git::{BranchInfo, GitHandler, TagInfo};
use updatecli_scm::{Branches, ScmHandler, ScmKind};

/// Canned git answers, oldest first
#[derive(Default)]
pub(crate) struct MockGit {
    pub(crate) tags: Vec<(&'static str, &'static str)>,
    pub(crate) branches: Vec<(&'static str, &'static str)>,
    pub(crate) fail: bool,
}

fn at(index: usize) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + index as i64 * 60, 0).unwrap()
}

impl GitHandler for MockGit {
    fn remote_urls(&self, _directory: &Path) -> updatecli_git::Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }

    fn tags(&self, directory: &Path) -> updatecli_git::Result<Vec<TagInfo>> {
        if self.fail {
            return Err(GitError::NotARepository(directory.to_path_buf()));
        }
        Ok(self
            .tags
            .iter()
            .enumerate()
            .map(|(i, (name, hash))| TagInfo {
                name: name.to_string(),
                commit_hash: hash.to_string(),
                message: None,
                timestamp: at(i),
            })
            .collect())
    }

    fn branches(&self, directory: &Path) -> updatecli_git::Result<Vec<BranchInfo>> {
        if self.fail {
            return Err(GitError::NotARepository(directory.to_path_buf()));
        }
        Ok(self
            .branches
            .iter()
            .enumerate()
            .map(|(i, (name, hash))| BranchInfo {
                name: name.to_string(),
                commit_hash: hash.to_string(),
                timestamp: at(i),
            })
            .collect())
    }
}

/// Scm over a local directory that records what it was asked to push
pub(crate) struct RecordingScm {
    pub(crate) directory: PathBuf,
    pub(crate) pushed: Mutex<Vec<String>>,
}

impl RecordingScm {
    pub(crate) fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            pushed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn pushed(&self) -> Vec<String> {
        self.pushed.lock().unwrap().clone()
    }

    fn record(&self, name: String) -> updatecli_scm::Result<()> {
        self.pushed.lock().unwrap().push(name);
        Ok(())
    }
}

impl ScmHandler for RecordingScm {
    fn kind(&self) -> ScmKind {
        ScmKind::Git
    }

    fn add(&self, _files: &[PathBuf]) -> updatecli_scm::Result<()> {
        Ok(())
    }

    fn clone_repo(&self) -> updatecli_scm::Result<PathBuf> {
        Ok(self.directory.clone())
    }

    fn checkout(&self) -> updatecli_scm::Result<()> {
        Ok(())
    }

    fn directory(&self) -> &Path {
        &self.directory
    }

    fn commit(&self, _message: &str) -> updatecli_scm::Result<()> {
        Ok(())
    }

    fn push(&self) -> updatecli_scm::Result<bool> {
        Ok(false)
    }

    fn clean(&self) -> updatecli_scm::Result<()> {
        Ok(())
    }

    fn clean_working_branch(&self) -> updatecli_scm::Result<bool> {
        Ok(false)
    }

    fn is_remote_branch_up_to_date(&self) -> updatecli_scm::Result<bool> {
        Ok(true)
    }

    fn is_remote_working_branch_exist(&self) -> updatecli_scm::Result<bool> {
        Ok(true)
    }

    fn push_tag(&self, tag: &str) -> updatecli_scm::Result<()> {
        self.record(format!("tag:{}", tag))
    }

    fn push_branch(&self, branch: &str) -> updatecli_scm::Result<()> {
        self.record(format!("branch:{}", branch))
    }

    fn changed_files(&self) -> updatecli_scm::Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }

    fn branches(&self) -> Branches {
        Branches::single("main")
    }

    fn url(&self) -> String {
        self.directory.display().to_string()
    }

    fn summary(&self) -> String {
        self.url()
    }
}

/// Repository with one commit on `main`
pub(crate) fn init_repo(dir: &Path) -> Repository {
    let repo = Repository::init(dir).unwrap();
    {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        std::fs::write(dir.join("README.md"), "hello").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let commit = repo
            .commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
        let commit = repo.find_commit(commit).unwrap();
        if repo.find_branch("main", git2::BranchType::Local).is_err() {
            repo.branch("main", &commit, false).unwrap();
        }
        repo.set_head("refs/heads/main").unwrap();
    }
    repo
}
