//! Scm handler facade

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::backends::{GitScm, HostedScm, SearchScm};
use crate::config::ScmConfig;
use crate::kind::ScmKind;
use crate::spec::ScmSpec;
use crate::Result;
use updatecli_core::error::ScmError;
use updatecli_core::Config;

/// Branches an scm works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branches {
    /// Branch files are read from
    pub source: String,
    /// Branch changes are committed and pushed to
    pub working: String,
    /// Branch changes are meant to land on
    pub target: String,
}

impl Branches {
    /// Source, working and target all on `branch`
    pub fn single(branch: &str) -> Self {
        Self {
            source: branch.to_string(),
            working: branch.to_string(),
            target: branch.to_string(),
        }
    }
}

/// Operations every scm backend provides to resource plugins.
///
/// Operations a backend cannot perform fail with [`ScmError::Unsupported`].
pub trait ScmHandler: Send + Sync {
    /// Backend kind
    fn kind(&self) -> ScmKind;

    /// Stage `files` for the next commit
    fn add(&self, files: &[PathBuf]) -> Result<()>;

    /// Clone (or refresh) the repository, returning its local path
    fn clone_repo(&self) -> Result<PathBuf>;

    /// Switch to the working branch, creating it from the source branch
    fn checkout(&self) -> Result<()>;

    /// Local repository path
    fn directory(&self) -> &Path;

    /// Commit staged changes
    fn commit(&self, message: &str) -> Result<()>;

    /// Push the working branch; returns false when the remote already had it
    fn push(&self) -> Result<bool>;

    /// Delete the local working branch when it matches the target branch;
    /// returns whether it was deleted
    fn clean_working_branch(&self) -> Result<bool>;

    /// Whether the remote working branch is at the local working branch tip
    fn is_remote_branch_up_to_date(&self) -> Result<bool>;

    /// Whether the working branch exists on the remote
    fn is_remote_working_branch_exist(&self) -> Result<bool>;

    /// Discard local changes
    fn clean(&self) -> Result<()>;

    /// Push the tag `tag`
    fn push_tag(&self, tag: &str) -> Result<()>;

    /// Push the branch `branch`
    fn push_branch(&self, branch: &str) -> Result<()>;

    /// Files differing from the last commit
    fn changed_files(&self) -> Result<Vec<PathBuf>>;

    /// Source, working and target branches
    fn branches(&self) -> Branches;

    /// Repository URL, credentials removed
    fn url(&self) -> String;

    /// One line description
    fn summary(&self) -> String;
}

impl fmt::Debug for dyn ScmHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScmHandler")
            .field("kind", &self.kind())
            .field("url", &self.url())
            .finish()
    }
}

/// Build the handler for `config`.
///
/// Returns `None` for a disabled configuration.
#[instrument(skip(config, settings), fields(kind = ?config.kind))]
pub fn build(
    config: &ScmConfig,
    pipeline_id: &str,
    settings: &Config,
) -> Result<Option<Box<dyn ScmHandler>>> {
    config.validate()?;
    if config.disabled {
        debug!("scm disabled");
        return Ok(None);
    }

    let spec = config
        .spec
        .as_ref()
        .ok_or_else(|| ScmError::WrongConfig("missing value for parameter 'spec'".to_string()))?;
    spec.validate()?;

    let handler: Box<dyn ScmHandler> = match spec {
        ScmSpec::Git(git) => Box::new(GitScm::new(git, pipeline_id, &settings.scm)?),
        ScmSpec::GithubSearch(search) | ScmSpec::GitlabSearch(search) => {
            Box::new(SearchScm::new(spec.kind(), search, &settings.scm))
        }
        ScmSpec::Github(hosted)
        | ScmSpec::Gitlab(hosted)
        | ScmSpec::Gitea(hosted)
        | ScmSpec::Bitbucket(hosted)
        | ScmSpec::Stash(hosted) => {
            Box::new(HostedScm::new(spec.kind(), hosted, pipeline_id, &settings.scm)?)
        }
    };

    debug!(summary = %handler.summary(), "built scm handler");
    Ok(Some(handler))
}
