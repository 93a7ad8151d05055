//! Error types for updatecli

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using UpdatecliError
pub type Result<T> = std::result::Result<T, UpdatecliError>;

/// Main error type for updatecli operations
#[derive(Debug, Error)]
pub enum UpdatecliError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version filter errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// SCM configuration and handler errors
    #[error(transparent)]
    Scm(#[from] ScmError),

    /// Hosted API errors
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Resource plugin errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl UpdatecliError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error is the expected "nothing matched" selection outcome
    pub fn is_no_version_found(&self) -> bool {
        matches!(self, Self::Version(VersionError::NoVersionFound { .. }))
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A settings file exists but could not be read
    #[error("unable to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Failed to list remotes
    #[error("Unable to retrieve the list of remotes for the git repository {0}")]
    RemoteListFailed(PathBuf),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// Branch not found
    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    /// Tag already exists
    #[error("Tag already exists: {0}")]
    TagExists(String),

    /// Nothing staged to commit
    #[error("Nothing to commit in {0}")]
    NothingToCommit(PathBuf),

    /// Failed to clone
    #[error("Failed to clone {url}: {reason}")]
    CloneFailed { url: String, reason: String },

    /// Failed to push
    #[error("Failed to push to remote: {0}")]
    PushFailed(String),

    /// A git CLI invocation failed
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Version filter errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// No candidate satisfied the filter
    #[error("no version found matching pattern {pattern:?}")]
    NoVersionFound { pattern: String },

    /// Unknown version filter kind
    #[error("unsupported version kind {0:?}")]
    UnsupportedKind(String),

    /// The pattern is not a valid regular expression
    #[error("invalid regular expression {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The pattern is not a valid semantic version constraint
    #[error("invalid semantic version constraint {constraint:?}: {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    /// Failed to parse a version
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),

    /// A kind requiring a pattern got none
    #[error("version kind {kind:?} requires a {field}")]
    MissingPattern { kind: String, field: &'static str },
}

/// SCM configuration, discovery and handler errors
#[derive(Debug, Error)]
pub enum ScmError {
    /// Inconsistent `{kind, spec, disabled}` triple
    #[error("wrong scm configuration: {0}")]
    WrongConfig(String),

    /// Configured spec type disagrees with the discovered (or declared) kind
    #[error(
        "the SCM discovered in the directory {} has a different type ({discovered:?}) than the specified SCM configuration {step:?} ({configured:?})",
        directory.display()
    )]
    KindMismatch {
        directory: PathBuf,
        step: String,
        discovered: String,
        configured: String,
    },

    /// Unknown scm kind
    #[error("scm of kind {0:?} is not supported")]
    UnsupportedKind(String),

    /// No remote named `origin`
    #[error("no remote named 'origin' could be found in the repository {}", .0.display())]
    NoOriginRemote(PathBuf),

    /// The origin remote could not be decomposed
    #[error("unable to parse the remote URL {0:?}")]
    MalformedRemoteUrl(String),

    /// The git remote query itself failed
    #[error("unable to query git remotes: {0}")]
    RemoteQuery(#[source] GitError),

    /// Backend-specific validation failure
    #[error("wrong {kind} configuration: {message}")]
    Validation { kind: String, message: String },

    /// Operation not meaningful for this backend
    #[error("operation {operation:?} is not supported by the {kind} scm")]
    Unsupported {
        kind: String,
        operation: &'static str,
    },

    /// Spec payload could not be decoded into the kind's shape
    #[error("unable to decode {kind} scm spec: {source}")]
    Decode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// Git error raised by a backend
    #[error(transparent)]
    Git(#[from] GitError),

    /// Hosted API error raised by a backend
    #[error(transparent)]
    Api(#[from] ApiError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Hosted API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to build the client or send the request
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Non-success HTTP status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body could not be decoded
    #[error("invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

/// Resource plugin errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Operation not supported by this resource kind
    #[error("{operation} is not supported by resource of kind {resource:?}")]
    Unsupported {
        resource: String,
        operation: &'static str,
    },

    /// Unknown resource kind
    #[error("resource of kind {0:?} is not supported")]
    UnsupportedKind(String),

    /// Resource spec failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource spec could not be decoded
    #[error("unable to decode {kind} resource spec: {source}")]
    Decode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}
