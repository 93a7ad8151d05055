//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "updatecli.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "updatecli.yaml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".updatecli.yaml";

/// Request timeout applied to each hosted API query, in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Items requested per page from hosted APIs
pub const DEFAULT_HTTP_PAGE_SIZE: u32 = 30;

/// Upper bound accepted by every supported hosting API
pub const MAX_HTTP_PAGE_SIZE: u32 = 100;

/// Prefix used when naming working branches
pub const DEFAULT_WORKING_BRANCH_PREFIX: &str = "updatecli";

/// Separator between working branch name components
pub const DEFAULT_WORKING_BRANCH_SEPARATOR: &str = "_";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ALT_CONFIG_FILE,
        ".updatecli.toml",
    ]
}

/// Default user agent sent to hosted APIs
pub fn default_user_agent() -> String {
    format!("updatecli/{}", env!("CARGO_PKG_VERSION"))
}
