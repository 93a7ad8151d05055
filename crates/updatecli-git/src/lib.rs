//! Updatecli Git - Git operations for updatecli
//!
//! This crate wraps a local git repository (through `git2`) for the
//! read and commit side, and shells out to the `git` CLI for clone, fetch
//! and push so that the user's credential helpers keep working.

mod branches;
mod commits;
pub mod credentials;
mod handler;
mod remote;
mod repository;
mod sanitize;
mod status;
mod tags;
pub mod types;

pub use credentials::{authenticated_url, redact_url};
pub use handler::{GitHandler, NativeGit};
pub use remote::{git_clone, git_fetch, git_push_branch, git_push_tag, PushOptions};
pub use repository::{GitRepo, Result};
pub use sanitize::sanitize_branch_name;
pub use types::{BranchInfo, TagInfo};
