//! `git` scm spec

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{check_force_push, resolve, EnvReader};
use crate::kind::ScmKind;
use updatecli_core::error::ScmError;

/// Settings of a plain git remote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GitSpec {
    /// Remote URL, http(s), ssh or scp-like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Username for http(s) remotes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for http(s) remotes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Branch to work on (default `main`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Commit author name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Commit author email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Local clone directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Run `git push --force` (default false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    /// Check out submodules (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submodules: Option<bool>,

    /// Work on a generated branch instead of `branch` (default false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_branch: Option<bool>,
}

impl GitSpec {
    /// Field-wise merge, `other` wins where set
    pub fn merge(&self, other: &GitSpec) -> GitSpec {
        GitSpec {
            url: resolve(&self.url, &other.url),
            username: resolve(&self.username, &other.username),
            password: resolve(&self.password, &other.password),
            branch: resolve(&self.branch, &other.branch),
            user: resolve(&self.user, &other.user),
            email: resolve(&self.email, &other.email),
            directory: resolve(&self.directory, &other.directory),
            force: resolve(&self.force, &other.force),
            submodules: resolve(&self.submodules, &other.submodules),
            working_branch: resolve(&self.working_branch, &other.working_branch),
        }
    }

    pub(crate) fn populate_from_env(&mut self, env: &EnvReader<'_>) {
        env.apply("BRANCH", &mut self.branch);
        env.apply("EMAIL", &mut self.email);
        env.apply("URL", &mut self.url);
        env.apply("USERNAME", &mut self.username);
        env.apply("USER", &mut self.user);
        env.apply("PASSWORD", &mut self.password);
        if let Some(directory) = env.get("DIRECTORY") {
            self.directory = Some(PathBuf::from(directory));
        }
    }

    /// Check required settings and the force push rule
    pub fn validate(&self) -> Result<(), ScmError> {
        if self.url.as_deref().map_or(true, str::is_empty) {
            return Err(ScmError::Validation {
                kind: ScmKind::Git.to_string(),
                message: "git parameter(s) required: [url]".to_string(),
            });
        }

        check_force_push(
            ScmKind::Git,
            self.branch.as_deref(),
            (self.force, false),
            (self.working_branch, false),
        )
    }
}
