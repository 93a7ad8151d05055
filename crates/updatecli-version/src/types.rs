//! Version filter types

use serde::{Deserialize, Serialize};

use updatecli_core::error::VersionError;

/// A version selected by a [`Filter`](crate::Filter) search.
///
/// Only a successful search builds one, so both fields are always set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    original_version: String,
    parsed_version: String,
}

impl Version {
    pub(crate) fn new(original: impl Into<String>, parsed: impl Into<String>) -> Self {
        Self {
            original_version: original.into(),
            parsed_version: parsed.into(),
        }
    }

    /// Candidate string exactly as observed upstream
    pub fn original_version(&self) -> &str {
        &self.original_version
    }

    /// Normalized form used for comparison and display
    pub fn parsed_version(&self) -> &str {
        &self.parsed_version
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parsed_version)
    }
}

/// Selection strategy of a version filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterKind {
    /// Greatest candidate under best-effort ordering
    #[default]
    Latest,
    /// Exact string match
    Literal,
    /// Regular expression match, greatest match wins
    Regex,
    /// Semantic version constraint
    Semver,
    /// Regular expression capture searched as semantic versions
    RegexSemver,
    /// Date or date-time parsed with a format string
    Time,
    /// Regular expression capture searched as dates
    RegexTime,
}

impl FilterKind {
    /// All supported kinds
    pub const ALL: [FilterKind; 7] = [
        Self::Latest,
        Self::Literal,
        Self::Regex,
        Self::Semver,
        Self::RegexSemver,
        Self::Time,
        Self::RegexTime,
    ];

    /// Returns the string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Literal => "literal",
            Self::Regex => "regex",
            Self::Semver => "semver",
            Self::RegexSemver => "regex/semver",
            Self::Time => "time",
            Self::RegexTime => "regex/time",
        }
    }

    /// Pattern used when none is configured
    pub fn default_pattern(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Literal => "",
            Self::Regex => ".*",
            Self::Semver | Self::RegexSemver => "*",
            Self::Time | Self::RegexTime => "%Y-%m-%d",
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FilterKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "latest" => Ok(Self::Latest),
            "literal" => Ok(Self::Literal),
            "regex" => Ok(Self::Regex),
            "semver" => Ok(Self::Semver),
            "regex/semver" => Ok(Self::RegexSemver),
            "time" => Ok(Self::Time),
            "regex/time" => Ok(Self::RegexTime),
            other => Err(VersionError::UnsupportedKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for FilterKind {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterKind> for String {
    fn from(kind: FilterKind) -> Self {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.as_str().parse::<FilterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_empty_kind_defaults_to_latest() {
        assert_eq!("".parse::<FilterKind>().unwrap(), FilterKind::Latest);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = "noExist".parse::<FilterKind>().unwrap_err();
        assert!(matches!(err, VersionError::UnsupportedKind(ref k) if k == "noExist"));
    }

    #[test]
    fn test_unknown_kind_rejected_on_decode() {
        let result: std::result::Result<FilterKind, _> = serde_json::from_str("\"calver\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_version_serializes_both_fields() {
        let v = Version::new("v1.2", "1.2.0");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["original_version"], "v1.2");
        assert_eq!(json["parsed_version"], "1.2.0");
        assert_eq!(v.to_string(), "1.2.0");
    }
}
