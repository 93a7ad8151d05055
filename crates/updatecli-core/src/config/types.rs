//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;

/// Tool-level configuration for updatecli
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosted API client settings
    pub http: HttpConfig,

    /// SCM workspace settings
    pub scm: ScmSettings,
}

/// Hosted API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-query timeout in seconds
    pub timeout_secs: u64,

    /// Items requested per page
    pub page_size: u32,

    /// User agent header
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            page_size: DEFAULT_HTTP_PAGE_SIZE,
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// SCM workspace settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScmSettings {
    /// Prefix of generated working branches
    pub working_branch_prefix: String,

    /// Separator between working branch components
    pub working_branch_separator: String,

    /// Root directory for clones of hosted repositories
    pub tmp_directory: PathBuf,
}

impl Default for ScmSettings {
    fn default() -> Self {
        Self {
            working_branch_prefix: DEFAULT_WORKING_BRANCH_PREFIX.to_string(),
            working_branch_separator: DEFAULT_WORKING_BRANCH_SEPARATOR.to_string(),
            tmp_directory: std::env::temp_dir().join("updatecli"),
        }
    }
}
