//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Settings file syntax, chosen by extension; anything but `.toml` is YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Yaml,
    Toml,
}

impl Syntax {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Syntax::Toml,
            _ => Syntax::Yaml,
        }
    }

    fn decode(self, path: &Path, content: &str) -> std::result::Result<Config, ConfigError> {
        let decoded = match self {
            Syntax::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Syntax::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };
        decoded.map_err(|reason| ConfigError::ParseError(format!("{}: {}", path.display(), reason)))
    }
}

/// Read, decode and validate the settings file at `path`
pub fn load_config(path: &Path) -> Result<Config> {
    let syntax = Syntax::of(path);
    info!(path = %path.display(), syntax = ?syntax, "reading settings");

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let config = syntax.decode(path, &content)?;

    validate_config(&config)?;
    debug!(path = %path.display(), "settings accepted");
    Ok(config)
}

/// Nearest settings file at or above `start_dir`.
///
/// In every directory the known file names are tried in order, each one
/// first at the top level and then under `.github/`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let found = start_dir.ancestors().find_map(|dir| {
        config_file_names().iter().find_map(|name| {
            [dir.join(name), dir.join(".github").join(name)]
                .into_iter()
                .find(|candidate| candidate.is_file())
        })
    });

    match &found {
        Some(path) => info!(path = %path.display(), "using settings file"),
        None => debug!(start_dir = %start_dir.display(), "no settings file above directory"),
    }
    found
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or use defaults
pub fn load_config_or_default(dir: &Path) -> (Config, Option<PathBuf>) {
    match load_config_from_dir(dir) {
        Ok((config, path)) => (config, Some(path)),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "no usable config found, using defaults");
            (Config::default(), None)
        }
    }
}
