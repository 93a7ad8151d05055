//! Search backends
//!
//! `githubsearch` and `gitlabsearch` only describe which repositories a
//! pipeline should run against. They own no working copy, so every git
//! operation reports [`ScmError::Unsupported`].

use std::path::{Path, PathBuf};

use super::hosted::{default_host, with_scheme};
use crate::handler::{Branches, ScmHandler};
use crate::kind::ScmKind;
use crate::spec::SearchSpec;
use crate::Result;
use updatecli_core::config::ScmSettings;
use updatecli_core::error::ScmError;
use updatecli_git::redact_url;

/// Scm selecting repositories through a search API
#[derive(Debug)]
pub struct SearchScm {
    kind: ScmKind,
    query: String,
    url: String,
    directory: PathBuf,
    branch: String,
}

impl SearchScm {
    /// Resolve defaults of `spec`
    pub fn new(kind: ScmKind, spec: &SearchSpec, settings: &ScmSettings) -> Self {
        let query = match kind {
            ScmKind::GitlabSearch => spec.group.clone(),
            _ => spec.search.clone(),
        }
        .unwrap_or_default();

        let url = spec
            .url
            .as_deref()
            .or(default_host(kind))
            .map(with_scheme)
            .unwrap_or_default();

        Self {
            kind,
            query,
            url,
            directory: spec
                .directory
                .clone()
                .unwrap_or_else(|| settings.tmp_directory.join(kind.as_str())),
            branch: spec.branch.clone().unwrap_or_else(|| "*".to_string()),
        }
    }

    /// Search query or group
    pub fn query(&self) -> &str {
        &self.query
    }

    fn unsupported<T>(&self, operation: &'static str) -> Result<T> {
        Err(ScmError::Unsupported {
            kind: self.kind.to_string(),
            operation,
        })
    }
}

impl ScmHandler for SearchScm {
    fn kind(&self) -> ScmKind {
        self.kind
    }

    fn add(&self, _files: &[PathBuf]) -> Result<()> {
        self.unsupported("add")
    }

    fn clone_repo(&self) -> Result<PathBuf> {
        self.unsupported("clone")
    }

    fn checkout(&self) -> Result<()> {
        self.unsupported("checkout")
    }

    fn directory(&self) -> &Path {
        &self.directory
    }

    fn commit(&self, _message: &str) -> Result<()> {
        self.unsupported("commit")
    }

    fn push(&self) -> Result<bool> {
        self.unsupported("push")
    }

    fn clean(&self) -> Result<()> {
        self.unsupported("clean")
    }

    fn clean_working_branch(&self) -> Result<bool> {
        self.unsupported("clean_working_branch")
    }

    fn is_remote_branch_up_to_date(&self) -> Result<bool> {
        self.unsupported("is_remote_branch_up_to_date")
    }

    fn is_remote_working_branch_exist(&self) -> Result<bool> {
        self.unsupported("is_remote_working_branch_exist")
    }

    fn push_tag(&self, _tag: &str) -> Result<()> {
        self.unsupported("push_tag")
    }

    fn push_branch(&self, _branch: &str) -> Result<()> {
        self.unsupported("push_branch")
    }

    fn changed_files(&self) -> Result<Vec<PathBuf>> {
        self.unsupported("changed_files")
    }

    fn branches(&self) -> Branches {
        Branches::single(&self.branch)
    }

    fn url(&self) -> String {
        redact_url(&self.url)
    }

    fn summary(&self) -> String {
        format!("{} {:?} on {}", self.kind, self.query, self.url())
    }
}
