//! Exit codes for the CLI

use updatecli_core::error::{
    ConfigError, GitError, ResourceError, ScmError, UpdatecliError, VersionError,
};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Version error
pub const VERSION_ERROR: i32 = 4;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// Version filter matched nothing
pub const NO_MATCH: i32 = 6;

/// Exit code for an error returned by a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<UpdatecliError>() {
        return match e {
            UpdatecliError::Config(_) => CONFIG_ERROR,
            UpdatecliError::Git(_) => GIT_ERROR,
            UpdatecliError::Version(e) => version_code(e),
            UpdatecliError::Scm(e) => scm_code(e),
            UpdatecliError::Resource(e) => resource_code(e),
            _ => ERROR,
        };
    }
    if let Some(e) = err.downcast_ref::<ScmError>() {
        return scm_code(e);
    }
    if let Some(e) = err.downcast_ref::<VersionError>() {
        return version_code(e);
    }
    if err.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }
    ERROR
}

fn version_code(err: &VersionError) -> i32 {
    match err {
        VersionError::NoVersionFound { .. } => NO_MATCH,
        _ => VERSION_ERROR,
    }
}

fn scm_code(err: &ScmError) -> i32 {
    match err {
        ScmError::Git(_) | ScmError::RemoteQuery(_) | ScmError::NoOriginRemote(_) => GIT_ERROR,
        ScmError::Api(_) | ScmError::Io(_) => ERROR,
        _ => VALIDATION_ERROR,
    }
}

fn resource_code(err: &ResourceError) -> i32 {
    match err {
        ResourceError::Unsupported { .. } => ERROR,
        _ => VALIDATION_ERROR,
    }
}
