//! Spec of the search backends (githubsearch, gitlabsearch)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{resolve, EnvReader};
use crate::kind::ScmKind;
use updatecli_core::error::ScmError;

/// Settings of a search-selected set of repositories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSpec {
    /// Search query (githubsearch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Group to search in (gitlabsearch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Maximum number of repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Branch pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Host URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Username sent with the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Commit author name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Commit author email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Root directory of the clones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl SearchSpec {
    /// Field-wise merge, `other` wins where set
    pub fn merge(&self, other: &SearchSpec) -> SearchSpec {
        SearchSpec {
            search: resolve(&self.search, &other.search),
            group: resolve(&self.group, &other.group),
            limit: resolve(&self.limit, &other.limit),
            branch: resolve(&self.branch, &other.branch),
            url: resolve(&self.url, &other.url),
            token: resolve(&self.token, &other.token),
            username: resolve(&self.username, &other.username),
            user: resolve(&self.user, &other.user),
            email: resolve(&self.email, &other.email),
            directory: resolve(&self.directory, &other.directory),
        }
    }

    pub(crate) fn populate_from_env(&mut self, env: &EnvReader<'_>) {
        env.apply("BRANCH", &mut self.branch);
        env.apply("EMAIL", &mut self.email);
        env.apply("TOKEN", &mut self.token);
        env.apply("URL", &mut self.url);
        env.apply("USERNAME", &mut self.username);
        env.apply("USER", &mut self.user);
        if let Some(directory) = env.get("DIRECTORY") {
            self.directory = Some(PathBuf::from(directory));
        }
    }

    /// githubsearch needs a query, gitlabsearch a group
    pub fn validate(&self, kind: ScmKind) -> Result<(), ScmError> {
        let (field, value) = match kind {
            ScmKind::GitlabSearch => ("group", &self.group),
            _ => ("search", &self.search),
        };

        if value.as_deref().map_or(true, str::is_empty) {
            return Err(ScmError::Validation {
                kind: kind.to_string(),
                message: format!("{} parameter(s) required: [{}]", kind, field),
            });
        }
        Ok(())
    }
}
