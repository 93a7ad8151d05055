//! Updatecli SCM - source control backends for updatecli
//!
//! An [`ScmConfig`] names a backend [`ScmKind`] and carries the matching
//! [`ScmSpec`]. It is written by hand in a manifest or discovered from the
//! `origin` remote of a working copy ([`ScmConfig::auto_guess`]).
//! [`build`] turns a configuration into a [`ScmHandler`], the single
//! interface resource plugins use to clone, commit and push.

pub mod api;
pub mod backends;
pub mod config;
mod handler;
pub mod kind;
pub mod remote;
pub mod spec;

pub use api::{paginate, HostedApi, Page, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT};
pub use config::{env_prefix, ScmConfig, DEFAULT_BRANCH, ENV_PREFIX};
pub use handler::{build, Branches, ScmHandler};
pub use kind::ScmKind;
pub use remote::RemoteUrl;
pub use spec::{GitSpec, HostedSpec, ScmSpec, SearchSpec};

/// Result type of this crate
pub type Result<T> = std::result::Result<T, updatecli_core::error::ScmError>;
