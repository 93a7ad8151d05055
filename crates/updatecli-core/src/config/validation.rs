//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::defaults::MAX_HTTP_PAGE_SIZE;
use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_http(config)?;
    validate_scm(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_http(config: &Config) -> Result<()> {
    if config.http.timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "http.timeout_secs".to_string(),
            message: "timeout must be greater than zero".to_string(),
        }
        .into());
    }

    if config.http.page_size == 0 || config.http.page_size > MAX_HTTP_PAGE_SIZE {
        return Err(ConfigError::InvalidValue {
            field: "http.page_size".to_string(),
            message: format!("must be between 1 and {}", MAX_HTTP_PAGE_SIZE),
        }
        .into());
    }

    if config.http.user_agent.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "http.user_agent".to_string(),
            message: "user agent cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_scm(config: &Config) -> Result<()> {
    if config.scm.working_branch_prefix.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "scm.working_branch_prefix".to_string(),
            message: "prefix cannot be empty".to_string(),
        }
        .into());
    }

    if config.scm.working_branch_separator.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "scm.working_branch_separator".to_string(),
            message: "separator cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}
