//! Remote operations

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use git2::{Cred, CredentialType, Direction, RemoteCallbacks};
use tracing::{debug, info, instrument};

use crate::credentials::{redact_text, redact_url, url_credentials};
use crate::repository::{GitRepo, Result};
use updatecli_core::error::GitError;

impl GitRepo {
    /// Names of the configured remotes
    pub fn remotes(&self) -> Result<Vec<String>> {
        let names = self
            .repo
            .remotes()
            .map_err(|_| GitError::RemoteListFailed(self.directory().to_path_buf()))?;
        Ok(names.iter().flatten().map(str::to_string).collect())
    }

    /// Map of remote name to fetch URL; remotes without a URL are left out
    #[instrument(skip(self))]
    pub fn remote_urls(&self) -> Result<BTreeMap<String, String>> {
        let mut urls = BTreeMap::new();
        for name in self.remotes()? {
            if let Some(url) = self.remote_url(&name)? {
                urls.insert(name, url);
            }
        }

        debug!(count = urls.len(), "listed remotes");
        Ok(urls)
    }

    /// Fetch URL of the remote `name`
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(str::to_string)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(GitError::RemoteNotFound(name.to_string()))
            }
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Commit `branch` points at on `remote` (a name or URL), `None` when the
    /// remote has no such branch
    #[instrument(skip(self, remote), fields(remote = %redact_url(remote)))]
    pub fn remote_branch_head(&self, remote: &str, branch: &str) -> Result<Option<String>> {
        let mut remote_handle = match self.repo.find_remote(remote) {
            Ok(found) => found,
            Err(_) => self.repo.remote_anonymous(remote)?,
        };

        let connection =
            remote_handle.connect_auth(Direction::Fetch, Some(remote_callbacks(remote)), None)?;
        let refname = format!("refs/heads/{}", branch);
        let head = connection
            .list()?
            .iter()
            .find(|head| head.name() == refname)
            .map(|head| head.oid().to_string());

        debug!(branch, found = head.is_some(), "listed remote branch");
        Ok(head)
    }
}

/// Authentication for git2 connections: credentials embedded in `url`, else
/// the ssh agent, else whatever libgit2 finds by default
fn remote_callbacks(url: &str) -> RemoteCallbacks<'static> {
    let embedded = url_credentials(url);
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_, username, allowed| match &embedded {
        Some((user, password)) if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) => {
            Cred::userpass_plaintext(user, password)
        }
        _ if allowed.contains(CredentialType::SSH_KEY) => {
            Cred::ssh_key_from_agent(username.unwrap_or("git"))
        }
        _ => Cred::default(),
    });
    callbacks
}

/// Options for CLI pushes
#[derive(Debug, Clone, Default)]
pub struct PushOptions<'a> {
    /// Remote name or (possibly authenticated) URL
    pub remote: &'a str,
    /// Overwrite the remote reference
    pub force: bool,
}

/// Run git in `cwd` and return stdout. Credential URLs never reach logs or errors.
fn run_git(cwd: Option<&Path>, args: &[&str]) -> Result<String> {
    let start = std::time::Instant::now();
    let display_args: Vec<String> = args.iter().map(|a| redact_url(a)).collect();

    let mut command = Command::new("git");
    command.args(args).env("GIT_TERMINAL_PROMPT", "0");
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }
    let output = command.output()?;

    info!(
        args = %display_args.join(" "),
        duration_ms = start.elapsed().as_millis(),
        success = output.status.success(),
        "git (CLI)"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed {
            command: display_args.first().cloned().unwrap_or_default(),
            stderr: redact_text(stderr.trim(), args),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Clone `url` into `directory` using git CLI
#[instrument(fields(url = %redact_url(url), directory = %directory.display()))]
pub fn git_clone(
    url: &str,
    directory: &Path,
    branch: Option<&str>,
    submodules: bool,
) -> Result<()> {
    let directory_arg = directory.to_string_lossy();
    let mut args = vec!["clone"];
    if let Some(branch) = branch {
        args.extend(["--branch", branch]);
    }
    if submodules {
        args.push("--recurse-submodules");
    }
    args.extend([url, directory_arg.as_ref()]);

    run_git(None, &args).map_err(|e| GitError::CloneFailed {
        url: redact_url(url),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Fetch all branches and tags from `remote` using git CLI
#[instrument(fields(directory = %directory.display(), remote = %redact_url(remote)))]
pub fn git_fetch(directory: &Path, remote: &str) -> Result<()> {
    run_git(Some(directory), &["fetch", "--tags", "--prune", remote])?;
    Ok(())
}

/// Push a branch using git CLI
#[instrument(skip(options), fields(directory = %directory.display(), branch, force = options.force))]
pub fn git_push_branch(directory: &Path, branch: &str, options: &PushOptions<'_>) -> Result<()> {
    let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
    push_refspec(directory, &refspec, options)
}

/// Push a tag using git CLI
#[instrument(skip(options), fields(directory = %directory.display(), tag, force = options.force))]
pub fn git_push_tag(directory: &Path, tag: &str, options: &PushOptions<'_>) -> Result<()> {
    let refspec = format!("refs/tags/{}:refs/tags/{}", tag, tag);
    push_refspec(directory, &refspec, options)
}

fn push_refspec(directory: &Path, refspec: &str, options: &PushOptions<'_>) -> Result<()> {
    let mut args = vec!["push"];
    if options.force {
        args.push("--force");
    }
    args.extend([options.remote, refspec]);

    run_git(Some(directory), &args).map_err(|e| match e {
        GitError::CommandFailed { stderr, .. } => GitError::PushFailed(stderr),
        other => other,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn setup_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();

        std::fs::write(temp.path().join("file.txt"), "content").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("file.txt")).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo)
    }

    #[test]
    fn test_remotes_empty() {
        let (_temp, repo) = setup_repo();
        assert!(repo.remotes().unwrap().is_empty());
        assert!(repo.remote_urls().unwrap().is_empty());
    }

    #[test]
    fn test_remote_urls() {
        let (_temp, repo) = setup_repo();
        repo.repo
            .remote("origin", "git@github.com:olblak/updatecli.git")
            .unwrap();
        repo.repo
            .remote("upstream", "https://github.com/updatecli/updatecli.git")
            .unwrap();

        let urls = repo.remote_urls().unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls["origin"], "git@github.com:olblak/updatecli.git");
        assert_eq!(
            urls["upstream"],
            "https://github.com/updatecli/updatecli.git"
        );
    }

    #[test]
    fn test_remote_not_found() {
        let (_temp, repo) = setup_repo();
        let result = repo.remote_url("nonexistent");
        assert!(matches!(result, Err(GitError::RemoteNotFound(_))));
    }

    #[test]
    fn test_remote_branch_head() {
        let (_upstream_dir, upstream) = setup_repo();
        let (_temp, repo) = setup_repo();
        let branch = upstream.current_branch().unwrap().unwrap();
        let remote = upstream.directory().to_str().unwrap();

        assert_eq!(
            repo.remote_branch_head(remote, &branch).unwrap(),
            Some(upstream.head_hash().unwrap())
        );
        assert_eq!(repo.remote_branch_head(remote, "missing").unwrap(), None);

        repo.repo.remote("origin", remote).unwrap();
        assert!(repo.remote_branch_head("origin", &branch).unwrap().is_some());
    }

    #[test]
    fn test_push_to_missing_remote_fails() {
        let (temp, _repo) = setup_repo();
        let missing = temp.path().join("does-not-exist");
        let options = PushOptions {
            remote: missing.to_str().unwrap(),
            force: false,
        };
        let result = git_push_branch(temp.path(), "main", &options);
        assert!(matches!(result, Err(GitError::PushFailed(_)) | Err(GitError::Io(_))));
    }
}
