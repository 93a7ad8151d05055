//! Resource trait

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use updatecli_core::error::{ResourceError, Result};
use updatecli_core::types::{ConditionResult, SourceResult, TargetResult};
use updatecli_scm::ScmHandler;
use updatecli_version::{Filter, Version};

/// Trait for resource plugins
pub trait Resource: Send + Sync {
    /// Resource kind as written in a manifest (e.g. "gittag")
    fn kind(&self) -> &'static str;

    /// Discover the current value
    fn source(&self, scm: Option<&dyn ScmHandler>) -> Result<SourceResult>;

    /// Check that `source` (or the configured value) holds
    fn condition(&self, source: &str, scm: Option<&dyn ScmHandler>) -> Result<ConditionResult>;

    /// Bring the resource in line with `source`.
    ///
    /// With `dry_run` nothing is written; the result still reports whether
    /// a change would happen.
    fn target(
        &self,
        source: &str,
        scm: Option<&dyn ScmHandler>,
        dry_run: bool,
    ) -> Result<TargetResult>;
}

/// Decode a resource spec payload into its typed shape
pub(crate) fn decode_spec<T: DeserializeOwned>(kind: &str, spec: Value) -> Result<T> {
    let spec = if spec.is_null() {
        Value::Object(Default::default())
    } else {
        spec
    };
    serde_json::from_value(spec).map_err(|source| {
        ResourceError::Decode {
            kind: kind.to_string(),
            source,
        }
        .into()
    })
}

/// Run `filter` over `candidates`, mapping "nothing matched" to `None`
pub(crate) fn select<S: AsRef<str>>(filter: &Filter, candidates: &[S]) -> Result<Option<Version>> {
    match filter.search(candidates) {
        Ok(version) => Ok(Some(version)),
        Err(e) if e.is_no_version_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Repository directory a git resource works in.
///
/// An explicit `path` wins over the scm working copy.
pub(crate) fn working_directory(
    kind: &str,
    path: Option<&Path>,
    scm: Option<&dyn ScmHandler>,
) -> Result<PathBuf> {
    match (path, scm) {
        (Some(path), Some(scm)) => {
            warn!(
                resource = kind,
                "Path setting value {:?} is overriding the scm configuration (value {:?})",
                path,
                scm.directory()
            );
            Ok(path.to_path_buf())
        }
        (Some(path), None) => Ok(path.to_path_buf()),
        (None, Some(scm)) => Ok(scm.directory().to_path_buf()),
        (None, None) => Err(ResourceError::Validation(format!(
            "unknown {} working directory, did you specify one of `scmid` or `spec.path`?",
            kind
        ))
        .into()),
    }
}

/// First non-empty value of `preferred` and `fallback`
pub(crate) fn first_set<'a>(preferred: Option<&'a str>, fallback: &'a str) -> Option<&'a str> {
    preferred
        .filter(|v| !v.is_empty())
        .or(Some(fallback).filter(|v| !v.is_empty()))
}
