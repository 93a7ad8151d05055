//! Scm kind discriminator

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use updatecli_core::error::ScmError;

/// Supported scm backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScmKind {
    /// Plain git remote
    Git,
    /// GitHub or GitHub Enterprise
    Github,
    /// GitLab
    Gitlab,
    /// Gitea or Forgejo
    Gitea,
    /// Bitbucket Cloud
    Bitbucket,
    /// Bitbucket Server (Stash)
    Stash,
    /// Repositories selected by a GitHub search query
    GithubSearch,
    /// Repositories selected by a GitLab group search
    GitlabSearch,
}

impl ScmKind {
    /// Every kind, in declaration order
    pub const ALL: [ScmKind; 8] = [
        Self::Git,
        Self::Github,
        Self::Gitlab,
        Self::Gitea,
        Self::Bitbucket,
        Self::Stash,
        Self::GithubSearch,
        Self::GitlabSearch,
    ];

    /// Manifest name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Gitea => "gitea",
            Self::Bitbucket => "bitbucket",
            Self::Stash => "stash",
            Self::GithubSearch => "githubsearch",
            Self::GitlabSearch => "gitlabsearch",
        }
    }

    /// Kinds that only select repositories through a search API
    pub fn is_search(&self) -> bool {
        matches!(self, Self::GithubSearch | Self::GitlabSearch)
    }

    /// Kind selected by auto-discovery for a remote hostname
    pub fn from_hostname(hostname: &str) -> Self {
        match hostname.to_ascii_lowercase().as_str() {
            "github.com" => Self::Github,
            "gitlab.com" => Self::Gitlab,
            "bitbucket.org" => Self::Bitbucket,
            _ => Self::Git,
        }
    }
}

impl FromStr for ScmKind {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower != s {
            warn!(kind = s, "The specified value for the parameter 'kind' should be lowercase");
        }

        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| ScmError::UnsupportedKind(s.to_string()))
    }
}

impl TryFrom<String> for ScmKind {
    type Error = ScmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScmKind> for String {
    fn from(kind: ScmKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ScmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
