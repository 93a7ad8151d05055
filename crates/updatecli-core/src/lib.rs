//! Updatecli Core - Shared types for the updatecli pipeline
//!
//! This crate provides the error taxonomy, tool configuration and step
//! result types shared by the version filter, git, scm and resource crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{
    ApiError, ConfigError, GitError, ResourceError, Result, ScmError, UpdatecliError,
    VersionError,
};
pub use types::{ConditionResult, SourceResult, StepStatus, TargetResult};
