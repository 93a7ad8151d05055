//! Spec shared by the hosted backends (github, gitlab, gitea, bitbucket, stash)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{check_force_push, resolve, EnvReader};
use crate::kind::ScmKind;
use updatecli_core::error::ScmError;

/// Settings of a repository on a hosting service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostedSpec {
    /// Repository owner (user, organization, group or project key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Repository name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// API token, also used as the git password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Password, for hosts that accept app passwords
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Host URL; github and gitlab default to their public instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Username sent with the token (default `oauth2`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Target branch (default `main`)
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

    /// Run `git push --force` (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    /// Check out submodules (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submodules: Option<bool>,

    /// Push to a generated working branch (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_branch: Option<bool>,
}

impl HostedSpec {
    /// Field-wise merge, `other` wins where set
    pub fn merge(&self, other: &HostedSpec) -> HostedSpec {
        HostedSpec {
            owner: resolve(&self.owner, &other.owner),
            repository: resolve(&self.repository, &other.repository),
            token: resolve(&self.token, &other.token),
            password: resolve(&self.password, &other.password),
            url: resolve(&self.url, &other.url),
            username: resolve(&self.username, &other.username),
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
        env.apply("OWNER", &mut self.owner);
        env.apply("REPOSITORY", &mut self.repository);
        env.apply("TOKEN", &mut self.token);
        env.apply("PASSWORD", &mut self.password);
        env.apply("URL", &mut self.url);
        env.apply("USERNAME", &mut self.username);
        env.apply("USER", &mut self.user);
        if let Some(directory) = env.get("DIRECTORY") {
            self.directory = Some(PathBuf::from(directory));
        }
    }

    /// Check the settings `kind` requires, then the force push rule
    pub fn validate(&self, kind: ScmKind) -> Result<(), ScmError> {
        let missing = |field: &Option<String>| field.as_deref().map_or(true, str::is_empty);

        let mut required = Vec::new();
        if matches!(kind, ScmKind::Github | ScmKind::Gitlab | ScmKind::Gitea)
            && missing(&self.token)
        {
            required.push("token");
        }
        if matches!(kind, ScmKind::Gitea | ScmKind::Stash) && missing(&self.url) {
            required.push("url");
        }
        if missing(&self.owner) {
            required.push("owner");
        }
        if missing(&self.repository) {
            required.push("repository");
        }

        if !required.is_empty() {
            return Err(ScmError::Validation {
                kind: kind.to_string(),
                message: format!("{} parameter(s) required: [{}]", kind, required.join(",")),
            });
        }

        check_force_push(
            kind,
            self.branch.as_deref(),
            (self.force, true),
            (self.working_branch, true),
        )
    }

    /// Secret used to authenticate git operations
    pub fn secret(&self) -> Option<&str> {
        self.token
            .as_deref()
            .or(self.password.as_deref())
            .filter(|s| !s.is_empty())
    }
}
