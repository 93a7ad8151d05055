//! Backend spec variants
//!
//! Every scm kind has its own spec shape. A manifest payload is decoded
//! in two steps: the `kind` discriminator first, then the payload into the
//! variant that kind selects.

mod git;
mod hosted;
mod search;

pub use git::GitSpec;
pub use hosted::HostedSpec;
pub use search::SearchSpec;

use std::path::Path;

use serde::Serialize;

use crate::kind::ScmKind;
use updatecli_core::error::ScmError;

/// Spec of one scm, tagged by its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScmSpec {
    /// `git`
    Git(GitSpec),
    /// `github`
    Github(HostedSpec),
    /// `gitlab`
    Gitlab(HostedSpec),
    /// `gitea`
    Gitea(HostedSpec),
    /// `bitbucket`
    Bitbucket(HostedSpec),
    /// `stash`
    Stash(HostedSpec),
    /// `githubsearch`
    GithubSearch(SearchSpec),
    /// `gitlabsearch`
    GitlabSearch(SearchSpec),
}

impl ScmSpec {
    /// Decode a raw payload into the shape selected by `kind`
    pub fn decode(kind: ScmKind, payload: serde_json::Value) -> Result<Self, ScmError> {
        let decode_err = |source| ScmError::Decode {
            kind: kind.to_string(),
            source,
        };

        Ok(match kind {
            ScmKind::Git => Self::Git(serde_json::from_value(payload).map_err(decode_err)?),
            ScmKind::Github
            | ScmKind::Gitlab
            | ScmKind::Gitea
            | ScmKind::Bitbucket
            | ScmKind::Stash => {
                Self::hosted(kind, serde_json::from_value(payload).map_err(decode_err)?)
            }
            ScmKind::GithubSearch | ScmKind::GitlabSearch => {
                Self::search(kind, serde_json::from_value(payload).map_err(decode_err)?)
            }
        })
    }

    /// Empty spec of the given kind
    pub fn empty(kind: ScmKind) -> Self {
        match kind {
            ScmKind::Git => Self::Git(GitSpec::default()),
            ScmKind::GithubSearch | ScmKind::GitlabSearch => {
                Self::search(kind, SearchSpec::default())
            }
            _ => Self::hosted(kind, HostedSpec::default()),
        }
    }

    /// Wrap a hosted spec into the variant of `kind`
    pub(crate) fn hosted(kind: ScmKind, spec: HostedSpec) -> Self {
        match kind {
            ScmKind::Gitlab => Self::Gitlab(spec),
            ScmKind::Gitea => Self::Gitea(spec),
            ScmKind::Bitbucket => Self::Bitbucket(spec),
            ScmKind::Stash => Self::Stash(spec),
            _ => Self::Github(spec),
        }
    }

    fn search(kind: ScmKind, spec: SearchSpec) -> Self {
        match kind {
            ScmKind::GitlabSearch => Self::GitlabSearch(spec),
            _ => Self::GithubSearch(spec),
        }
    }

    /// Kind this spec belongs to
    pub fn kind(&self) -> ScmKind {
        match self {
            Self::Git(_) => ScmKind::Git,
            Self::Github(_) => ScmKind::Github,
            Self::Gitlab(_) => ScmKind::Gitlab,
            Self::Gitea(_) => ScmKind::Gitea,
            Self::Bitbucket(_) => ScmKind::Bitbucket,
            Self::Stash(_) => ScmKind::Stash,
            Self::GithubSearch(_) => ScmKind::GithubSearch,
            Self::GitlabSearch(_) => ScmKind::GitlabSearch,
        }
    }

    /// Merge `other` over `self`; fields set in `other` win.
    ///
    /// Both specs must be of the same kind.
    pub fn merge(&self, other: &ScmSpec) -> Result<Self, ScmError> {
        let merged = match (self, other) {
            (Self::Git(a), Self::Git(b)) => Self::Git(a.merge(b)),
            (Self::Github(a), Self::Github(b)) => Self::Github(a.merge(b)),
            (Self::Gitlab(a), Self::Gitlab(b)) => Self::Gitlab(a.merge(b)),
            (Self::Gitea(a), Self::Gitea(b)) => Self::Gitea(a.merge(b)),
            (Self::Bitbucket(a), Self::Bitbucket(b)) => Self::Bitbucket(a.merge(b)),
            (Self::Stash(a), Self::Stash(b)) => Self::Stash(a.merge(b)),
            (Self::GithubSearch(a), Self::GithubSearch(b)) => Self::GithubSearch(a.merge(b)),
            (Self::GitlabSearch(a), Self::GitlabSearch(b)) => Self::GitlabSearch(a.merge(b)),
            (a, b) => {
                return Err(ScmError::WrongConfig(format!(
                    "unable to merge {} spec with {} spec",
                    a.kind(),
                    b.kind()
                )))
            }
        };
        Ok(merged)
    }

    /// Override fields from `<prefix>_<FIELD>` variables returned by `lookup`
    pub fn populate_from_env(&mut self, prefix: &str, lookup: &dyn Fn(&str) -> Option<String>) {
        let env = EnvReader::new(prefix, lookup);
        match self {
            Self::Git(spec) => spec.populate_from_env(&env),
            Self::GithubSearch(spec) | Self::GitlabSearch(spec) => spec.populate_from_env(&env),
            Self::Github(spec)
            | Self::Gitlab(spec)
            | Self::Gitea(spec)
            | Self::Bitbucket(spec)
            | Self::Stash(spec) => spec.populate_from_env(&env),
        }
    }

    /// Backend specific validation
    pub fn validate(&self) -> Result<(), ScmError> {
        match self {
            Self::Git(spec) => spec.validate(),
            Self::GithubSearch(spec) | Self::GitlabSearch(spec) => spec.validate(self.kind()),
            Self::Github(spec)
            | Self::Gitlab(spec)
            | Self::Gitea(spec)
            | Self::Bitbucket(spec)
            | Self::Stash(spec) => spec.validate(self.kind()),
        }
    }

    /// Hosted spec, for the hosted kinds
    pub fn as_hosted(&self) -> Option<&HostedSpec> {
        match self {
            Self::Github(spec)
            | Self::Gitlab(spec)
            | Self::Gitea(spec)
            | Self::Bitbucket(spec)
            | Self::Stash(spec) => Some(spec),
            _ => None,
        }
    }

    /// Configured branch, if any
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Git(spec) => spec.branch.as_deref(),
            Self::GithubSearch(spec) | Self::GitlabSearch(spec) => spec.branch.as_deref(),
            _ => self.as_hosted().and_then(|spec| spec.branch.as_deref()),
        }
    }

    /// Configured local directory, if any
    pub fn directory(&self) -> Option<&Path> {
        match self {
            Self::Git(spec) => spec.directory.as_deref(),
            Self::GithubSearch(spec) | Self::GitlabSearch(spec) => spec.directory.as_deref(),
            _ => self.as_hosted().and_then(|spec| spec.directory.as_deref()),
        }
    }

    /// Raw payload, as a manifest would carry it
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Field-wise resolution: the override wins when set
pub(crate) fn resolve<T: Clone>(auto: &Option<T>, over: &Option<T>) -> Option<T> {
    over.clone().or_else(|| auto.clone())
}

/// Reads `<prefix>_<NAME>` through an injectable lookup; empty values count as unset
pub(crate) struct EnvReader<'a> {
    prefix: String,
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvReader<'a> {
    pub(crate) fn new(prefix: &str, lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            prefix: prefix.to_string(),
            lookup,
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{}_{}", self.prefix, name)).filter(|v| !v.is_empty())
    }

    pub(crate) fn apply(&self, name: &str, field: &mut Option<String>) {
        if let Some(value) = self.get(name) {
            *field = Some(value);
        }
    }
}

/// Shared safety rule: pushing with `--force` straight onto the target branch
/// needs both settings spelled out.
pub(crate) fn check_force_push(
    kind: ScmKind,
    branch: Option<&str>,
    force: (Option<bool>, bool),
    working_branch: (Option<bool>, bool),
) -> Result<(), ScmError> {
    let (force_set, force_default) = force;
    let (working_branch_set, working_branch_default) = working_branch;
    let force = force_set.unwrap_or(force_default);
    let working_branch = working_branch_set.unwrap_or(working_branch_default);

    if force && !working_branch && (force_set.is_none() || working_branch_set.is_none()) {
        return Err(ScmError::Validation {
            kind: kind.to_string(),
            message: format!(
                "unclear configuration, better safe than sorry: force push without a working branch may push unwanted changes to the branch {:?}; set both 'force' and 'workingBranch' explicitly",
                branch.unwrap_or(crate::config::DEFAULT_BRANCH)
            ),
        });
    }
    Ok(())
}
