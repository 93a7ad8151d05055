//! Version filter

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use updatecli_core::error::{Result, VersionError};

use crate::ordering::first_max_by;
use crate::semantic::{self, compare_precedence, parse_lenient, Constraint};
use crate::time;
use crate::types::{FilterKind, Version};

/// Selects one version out of a list of candidate strings.
///
/// `pattern` is interpreted according to `kind`: a semver constraint, a
/// regular expression, a literal value or a date format. The `regex` field
/// is only used by the `regex/semver` and `regex/time` kinds, whose first
/// capture group extracts the part of each candidate to compare.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Selection strategy
    pub kind: FilterKind,

    /// Strategy specific pattern
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,

    /// Extraction expression for the `regex/*` kinds
    #[serde(skip_serializing_if = "String::is_empty")]
    pub regex: String,

    /// Disable lenient semantic version parsing
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub strict: bool,
}

impl Filter {
    /// Create a filter of `kind` with `pattern`
    pub fn new(kind: FilterKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Set the extraction expression
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = regex.into();
        self
    }

    /// Set strict semantic version parsing
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether nothing has been configured
    pub fn is_zero(&self) -> bool {
        self == &Self::default()
    }

    /// Fill the per-kind default pattern and validate the result
    pub fn init(&mut self) -> Result<()> {
        if self.pattern.is_empty() {
            self.pattern = self.kind.default_pattern().to_string();
        }
        self.validate()
    }

    /// Validate the filter without searching
    pub fn validate(&self) -> Result<()> {
        let pattern = self.effective_pattern();
        match self.kind {
            FilterKind::Latest => {}
            FilterKind::Literal => {
                if pattern.is_empty() {
                    return Err(VersionError::MissingPattern {
                        kind: self.kind.to_string(),
                        field: "pattern",
                    }
                    .into());
                }
            }
            FilterKind::Regex => {
                compile(pattern)?;
            }
            FilterKind::Semver => {
                Constraint::parse(pattern)?;
            }
            FilterKind::Time => time::validate_format(pattern)?,
            FilterKind::RegexSemver | FilterKind::RegexTime => {
                if self.regex.is_empty() {
                    return Err(VersionError::MissingPattern {
                        kind: self.kind.to_string(),
                        field: "regex",
                    }
                    .into());
                }
                compile(&self.regex)?;
                if self.kind == FilterKind::RegexSemver {
                    Constraint::parse(pattern)?;
                } else {
                    time::validate_format(pattern)?;
                }
            }
        }
        Ok(())
    }

    /// Select one version from `candidates`.
    ///
    /// Fails with [`VersionError::NoVersionFound`] when the list is empty
    /// or nothing matches; an unusable pattern fails with its own error.
    #[instrument(skip(self, candidates), fields(kind = %self.kind, pattern = %self.effective_pattern(), candidates = candidates.len()))]
    pub fn search<S: AsRef<str>>(&self, candidates: &[S]) -> Result<Version> {
        let pattern = self.effective_pattern();
        let candidates: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();

        let found = if candidates.is_empty() {
            None
        } else {
            match self.kind {
                FilterKind::Latest => select_latest(&candidates).map(|c| Version::new(c, c)),
                FilterKind::Literal => candidates
                    .iter()
                    .find(|c| **c == pattern)
                    .map(|c| Version::new(*c, *c)),
                FilterKind::Regex => {
                    let re = compile(pattern)?;
                    let matching: Vec<&str> =
                        candidates.into_iter().filter(|c| re.is_match(c)).collect();
                    select_latest(&matching).map(|c| Version::new(c, c))
                }
                FilterKind::Semver => {
                    let constraint = Constraint::parse(pattern)?;
                    semantic::search(candidates.iter().map(|c| (*c, *c)), &constraint, self.strict)
                        .map(|(original, parsed)| Version::new(original, parsed.to_string()))
                }
                FilterKind::RegexSemver => {
                    let re = compile(&self.regex)?;
                    let constraint = Constraint::parse(pattern)?;
                    let pairs = extract(&re, &candidates);
                    semantic::search(pairs, &constraint, self.strict)
                        .map(|(original, parsed)| Version::new(original, parsed.to_string()))
                }
                FilterKind::Time => {
                    time::validate_format(pattern)?;
                    time::search(candidates.iter().map(|c| (*c, *c)), pattern)
                        .map(|(original, extracted)| Version::new(original, extracted))
                }
                FilterKind::RegexTime => {
                    let re = compile(&self.regex)?;
                    time::validate_format(pattern)?;
                    time::search(extract(&re, &candidates), pattern)
                        .map(|(original, extracted)| Version::new(original, extracted))
                }
            }
        };

        match found {
            Some(version) => {
                debug!(
                    original = version.original_version(),
                    parsed = version.parsed_version(),
                    "version found"
                );
                Ok(version)
            }
            None => {
                debug!("no version found");
                Err(VersionError::NoVersionFound {
                    pattern: pattern.to_string(),
                }
                .into())
            }
        }
    }

    /// Build a pattern selecting versions newer than `version`.
    ///
    /// For semver kinds the pattern can be one of the shortcuts
    /// `prerelease`, `patch`, `minor`, `minoronly`, `major`, `majoronly`
    /// or `*`; any other constraint is returned as is.
    pub fn greater_than_pattern(&self, version: &str) -> Result<String> {
        match self.kind {
            FilterKind::Latest => Ok(FilterKind::Latest.default_pattern().to_string()),
            FilterKind::Literal | FilterKind::Regex | FilterKind::Time | FilterKind::RegexTime => {
                Ok(self.pattern.clone())
            }
            FilterKind::Semver | FilterKind::RegexSemver => {
                semver_greater_than(self.pattern.as_str(), version, self.strict)
            }
        }
    }

    fn effective_pattern(&self) -> &str {
        if self.pattern.is_empty() {
            self.kind.default_pattern()
        } else {
            &self.pattern
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| {
        VersionError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        }
        .into()
    })
}

/// `(candidate, first capture group)` for every candidate the regex captures
fn extract<'a>(re: &Regex, candidates: &[&'a str]) -> Vec<(&'a str, &'a str)> {
    candidates
        .iter()
        .copied()
        .filter_map(|c| {
            re.captures(c)
                .and_then(|caps| caps.get(1))
                .map(|m| (c, m.as_str()))
        })
        .collect()
}

/// Semver ordering when every candidate parses, lexicographic otherwise
fn select_latest<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    let parsed: Option<Vec<_>> = candidates
        .iter()
        .map(|c| parse_lenient(c, false).map(|v| (*c, v)))
        .collect();

    match parsed {
        Some(versions) => first_max_by(versions, |a, b| compare_precedence(&a.1, &b.1)).map(|v| v.0),
        None => first_max_by(candidates.iter().copied(), |a, b| a.cmp(b)),
    }
}

fn semver_greater_than(pattern: &str, version: &str, strict: bool) -> Result<String> {
    let parse = || {
        parse_lenient(version, strict).ok_or_else(|| {
            VersionError::ParseFailed(version.to_string(), "not a semantic version".to_string())
        })
    };
    let bump = |component: u64| {
        component.checked_add(1).ok_or_else(|| {
            VersionError::ParseFailed(version.to_string(), "version component overflows".to_string())
        })
    };

    let pattern = match pattern {
        "prerelease" => {
            let v = parse()?;
            let pre = if v.pre.is_empty() { "0" } else { v.pre.as_str() };
            format!(
                ">={}.{}.{}-{}, <={}.{}.{}",
                v.major, v.minor, v.patch, pre, v.major, v.minor, v.patch
            )
        }
        "patch" => {
            let v = parse()?;
            if v.pre.is_empty() {
                format!("{}.{}.*", v.major, v.minor)
            } else {
                format!(">={}, <{}.{}.0-0", v, v.major, bump(v.minor)?)
            }
        }
        "minor" => {
            let v = parse()?;
            if v.pre.is_empty() {
                format!("{}.*", v.major)
            } else {
                format!(">={}, <{}.0.0-0", v, bump(v.major)?)
            }
        }
        "minoronly" => {
            let v = parse()?;
            format!("={} || >{}.{}, <{}", v, v.major, v.minor, bump(v.major)?)
        }
        "major" => {
            let v = parse()?;
            if v.pre.is_empty() {
                format!(">={}", v.major)
            } else {
                format!(">={}", v)
            }
        }
        "majoronly" => {
            let v = parse()?;
            if v.pre.is_empty() {
                format!("={} || >{}", v, v.major)
            } else {
                format!("={} || >{}", v, v)
            }
        }
        "" | "*" => match parse_lenient(version, strict) {
            Some(v) => format!(">={}", v),
            None => {
                Constraint::parse(version)?;
                version.to_string()
            }
        },
        other => other.to_string(),
    };

    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use updatecli_core::UpdatecliError;

    fn versions(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case::latest_semver(Filter::new(FilterKind::Latest, ""), &["1.0", "2.0", "3.0"], "3.0", "3.0")]
    #[case::latest_semver_not_lexicographic(Filter::new(FilterKind::Latest, ""), &["1.10.0", "1.9.0"], "1.10.0", "1.10.0")]
    #[case::latest_lexicographic(Filter::new(FilterKind::Latest, ""), &["1.10.0", "1.9.0", "nightly"], "nightly", "nightly")]
    #[case::latest_tie_keeps_first(Filter::new(FilterKind::Latest, ""), &["v1.2.0", "1.2.0"], "v1.2.0", "v1.2.0")]
    #[case::latest_ignores_pattern(Filter::new(FilterKind::Latest, "2.0"), &["1.0", "2.0", "3.0"], "3.0", "3.0")]
    #[case::literal(Filter::new(FilterKind::Literal, "2.0"), &["1.0", "2.0", "3.0"], "2.0", "2.0")]
    #[case::semver_tilde(Filter::new(FilterKind::Semver, "~2"), &["1.0", "2.0", "3.0"], "2.0", "2.0.0")]
    #[case::semver_range(Filter::new(FilterKind::Semver, ">=1.2.0 <2.0.0"), &["1.0.0", "1.2.0", "1.9.3", "2.0.0", "1.10.0"], "1.10.0", "1.10.0")]
    #[case::semver_v_prefix(Filter::new(FilterKind::Semver, "*"), &["v1.0.0", "v2.0.0", "v4.0.0", "v3.0.0", "v6.0.0", "v5.0.0"], "v6.0.0", "6.0.0")]
    #[case::semver_default_pattern(Filter::new(FilterKind::Semver, ""), &["1.0.0", "6.0.0", "5.0.0"], "6.0.0", "6.0.0")]
    #[case::semver_release_above_prerelease(Filter::new(FilterKind::Semver, ">=1.0.0-rc.1"), &["1.0.0-rc.1", "1.0.0"], "1.0.0", "1.0.0")]
    #[case::semver_build_metadata_tie(Filter::new(FilterKind::Semver, "*"), &["1.0.0+build.2", "1.0.0+build.1"], "1.0.0+build.2", "1.0.0+build.2")]
    #[case::semver_strict(Filter::new(FilterKind::Semver, "*").with_strict(true), &["v2.0.0", "1.0.0"], "1.0.0", "1.0.0")]
    #[case::semver_alternatives(Filter::new(FilterKind::Semver, "~1.2 || ~3"), &["1.2.5", "2.0.0", "3.1.0", "1.3.0"], "3.1.0", "3.1.0")]
    #[case::semver_hyphen(Filter::new(FilterKind::Semver, "1.2 - 1.4"), &["1.1.0", "1.3.9", "1.4.2", "1.5.0"], "1.4.2", "1.4.2")]
    #[case::semver_wildcard(Filter::new(FilterKind::Semver, "1.x"), &["1.0.0", "1.5.0", "2.0.0"], "1.5.0", "1.5.0")]
    #[case::regex(Filter::new(FilterKind::Regex, "^updatecli-2.(\\d*)$"), &["updatecli-1.0", "updatecli-2.0", "updatecli-3.0"], "updatecli-2.0", "updatecli-2.0")]
    #[case::regex_default_pattern(Filter::new(FilterKind::Regex, ""), &["updatecli-1.0", "updatecli-3.0", "updatecli-2.0"], "updatecli-3.0", "updatecli-3.0")]
    #[case::regex_semver(Filter::new(FilterKind::RegexSemver, "~2").with_regex("^updatecli-(.*)$"), &["updatecli-1.0", "updatecli-2.0", "updatecli-3.0"], "updatecli-2.0", "2.0.0")]
    #[case::time(Filter::new(FilterKind::Time, ""), &["2022-01-13", "2023-05-01", "2021-12-31"], "2023-05-01", "2023-05-01")]
    #[case::time_custom_format(Filter::new(FilterKind::Time, "%Y_%m_%d"), &["2022_01_13", "alpine"], "2022_01_13", "2022_01_13")]
    #[case::regex_time(Filter::new(FilterKind::RegexTime, "").with_regex("^release-(\\d{4}-\\d{2}-\\d{2})$"), &["release-2022-01-01", "release-2023-01-01", "other"], "release-2023-01-01", "2023-01-01")]
    fn test_search_found(
        #[case] filter: Filter,
        #[case] candidates: &[&str],
        #[case] original: &str,
        #[case] parsed: &str,
    ) {
        let found = filter.search(&versions(candidates)).unwrap();
        assert_eq!(found.original_version(), original);
        assert_eq!(found.parsed_version(), parsed);
    }

    #[rstest]
    #[case::semver_no_match(Filter::new(FilterKind::Semver, "~9"), &["1.0.0", "2.0.0", "5.0.0"])]
    #[case::semver_unparsable(Filter::new(FilterKind::Semver, "*"), &["updatecli-1.0", "updatecli-2.0"])]
    #[case::semver_strict_rejects_partial(Filter::new(FilterKind::Semver, "*").with_strict(true), &["v1.0.0", "1.1"])]
    #[case::regex_no_match(Filter::new(FilterKind::Regex, "^updatecli-4.(\\d*)$"), &["updatecli-1.0", "updatecli-2.0"])]
    #[case::literal_no_match(Filter::new(FilterKind::Literal, "4.0"), &["1.0", "2.0"])]
    #[case::regex_semver_no_capture(Filter::new(FilterKind::RegexSemver, "*").with_regex("^updatecli-.*$"), &["updatecli-1.0"])]
    #[case::time_unparsable(Filter::new(FilterKind::Time, ""), &["alpine", "2022_01_13"])]
    fn test_search_not_found(#[case] filter: Filter, #[case] candidates: &[&str]) {
        let err = filter.search(&versions(candidates)).unwrap_err();
        assert!(err.is_no_version_found(), "unexpected error: {err}");
    }

    #[rstest]
    fn test_search_empty_list_for_every_kind(
        #[values(
            FilterKind::Latest,
            FilterKind::Literal,
            FilterKind::Regex,
            FilterKind::Semver,
            FilterKind::RegexSemver,
            FilterKind::Time,
            FilterKind::RegexTime
        )]
        kind: FilterKind,
    ) {
        let filter = Filter::new(kind, "").with_regex("(.*)");
        let candidates: Vec<String> = Vec::new();
        let err = filter.search(&candidates).unwrap_err();
        assert!(err.is_no_version_found());
    }

    #[test]
    fn test_search_invalid_regex_is_distinct() {
        let filter = Filter::new(FilterKind::Regex, "(");
        let err = filter.search(&versions(&["1.0"])).unwrap_err();
        assert!(matches!(
            err,
            UpdatecliError::Version(VersionError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_search_invalid_constraint_is_distinct() {
        let filter = Filter::new(FilterKind::Semver, "xyz");
        let err = filter.search(&versions(&["1.0.0"])).unwrap_err();
        assert!(matches!(
            err,
            UpdatecliError::Version(VersionError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_semver_search_stays_within_constraint() {
        let filter = Filter::new(FilterKind::Semver, ">=1.2.0 <2.0.0");
        let pools: [&[&str]; 3] = [
            &["0.9.0", "1.2.0", "2.0.0", "3.1.4"],
            &["1.99.99", "2.0.0-rc.1", "1.2.1"],
            &["2.0.0", "1.2.0-beta", "1.1.9"],
        ];
        let constraint = Constraint::parse(">=1.2.0 <2.0.0").unwrap();
        for pool in pools {
            match filter.search(&versions(pool)) {
                Ok(found) => {
                    let v = semver::Version::parse(found.parsed_version()).unwrap();
                    assert!(constraint.matches(&v));
                    for candidate in pool {
                        if let Some(other) = parse_lenient(candidate, false) {
                            if constraint.matches(&other) {
                                assert_ne!(compare_precedence(&other, &v), std::cmp::Ordering::Greater);
                            }
                        }
                    }
                }
                Err(err) => assert!(err.is_no_version_found()),
            }
        }
    }

    #[rstest]
    #[case(FilterKind::Latest, "", "latest")]
    #[case(FilterKind::Semver, "", "*")]
    #[case(FilterKind::Regex, "", ".*")]
    #[case(FilterKind::Time, "", "%Y-%m-%d")]
    #[case(FilterKind::Semver, "~2", "~2")]
    fn test_init_fills_default_pattern(
        #[case] kind: FilterKind,
        #[case] pattern: &str,
        #[case] expected: &str,
    ) {
        let mut filter = Filter::new(kind, pattern);
        filter.init().unwrap();
        assert_eq!(filter.pattern, expected);
    }

    #[test]
    fn test_default_filter_is_latest() {
        let mut filter = Filter::default();
        assert!(filter.is_zero());
        filter.init().unwrap();
        assert_eq!(filter.kind, FilterKind::Latest);
        assert_eq!(filter.pattern, "latest");
    }

    #[rstest]
    #[case::literal_without_pattern(Filter::new(FilterKind::Literal, ""))]
    #[case::regex_semver_without_regex(Filter::new(FilterKind::RegexSemver, "~1"))]
    #[case::regex_time_without_regex(Filter::new(FilterKind::RegexTime, ""))]
    #[case::bad_regex(Filter::new(FilterKind::Regex, "[a-"))]
    #[case::bad_constraint(Filter::new(FilterKind::Semver, ">>1"))]
    #[case::bad_time_format(Filter::new(FilterKind::Time, "%Q"))]
    fn test_validate_rejects(#[case] filter: Filter) {
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_decode_rejects_unsupported_kind() {
        let result: std::result::Result<Filter, _> =
            serde_yaml::from_str("kind: calver\npattern: '2024'\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_defaults_kind() {
        let filter: Filter = serde_yaml::from_str("pattern: latest\n").unwrap();
        assert_eq!(filter.kind, FilterKind::Latest);
    }

    #[rstest]
    #[case(FilterKind::Latest, "~1", "1.2.3", "latest")]
    #[case(FilterKind::Regex, "^v1", "v1.2.3", "^v1")]
    #[case(FilterKind::Semver, "patch", "1.2.3", "1.2.*")]
    #[case(FilterKind::Semver, "patch", "1.2.3-beta.1", ">=1.2.3-beta.1, <1.3.0-0")]
    #[case(FilterKind::Semver, "minor", "1.2.3", "1.*")]
    #[case(FilterKind::Semver, "minoronly", "1.2.3", "=1.2.3 || >1.2, <2")]
    #[case(FilterKind::Semver, "major", "1.2.3", ">=1")]
    #[case(FilterKind::Semver, "majoronly", "1.2.3", "=1.2.3 || >1")]
    #[case(FilterKind::Semver, "prerelease", "1.2.3-beta.1", ">=1.2.3-beta.1, <=1.2.3")]
    #[case(FilterKind::Semver, "prerelease", "1.2.3", ">=1.2.3-0, <=1.2.3")]
    #[case(FilterKind::Semver, "*", "v1.2.3", ">=1.2.3")]
    #[case(FilterKind::Semver, "", "~1.2", "~1.2")]
    #[case(FilterKind::Semver, "~1", "1.2.3", "~1")]
    fn test_greater_than_pattern(
        #[case] kind: FilterKind,
        #[case] pattern: &str,
        #[case] version: &str,
        #[case] expected: &str,
    ) {
        let filter = Filter::new(kind, pattern);
        let got = filter.greater_than_pattern(version).unwrap();
        assert_eq!(got, expected);
        if matches!(kind, FilterKind::Semver) {
            assert!(Constraint::parse(&got).is_ok(), "{got} should parse");
        }
    }

    #[test]
    fn test_greater_than_pattern_minoronly_selects_same_major() {
        let filter = Filter::new(FilterKind::Semver, "minoronly");
        let pattern = filter.greater_than_pattern("1.2.3").unwrap();
        let found = Filter::new(FilterKind::Semver, pattern)
            .search(&versions(&["1.2.3", "1.2.9", "1.5.0", "2.0.0"]))
            .unwrap();
        assert_eq!(found.original_version(), "1.5.0");
    }

    #[test]
    fn test_greater_than_pattern_rejects_garbage() {
        let filter = Filter::new(FilterKind::Semver, "*");
        assert!(filter.greater_than_pattern("@@").is_err());
        let filter = Filter::new(FilterKind::Semver, "patch");
        assert!(filter.greater_than_pattern("nightly").is_err());
    }

    #[rstest]
    #[case("minor", "18446744073709551615.0.0-rc.1")]
    #[case("minoronly", "18446744073709551615.3.0")]
    #[case("patch", "1.18446744073709551615.0-rc.1")]
    fn test_greater_than_pattern_component_overflow(#[case] pattern: &str, #[case] version: &str) {
        let filter = Filter::new(FilterKind::Semver, pattern);
        let err = filter.greater_than_pattern(version).unwrap_err();
        assert!(matches!(
            err,
            UpdatecliError::Version(VersionError::ParseFailed(_, _))
        ));
    }

    #[test]
    fn test_semver_excludes_version() {
        let found = Filter::new(FilterKind::Semver, "!=1.2.0")
            .search(&versions(&["1.2.0", "1.1.0"]))
            .unwrap();
        assert_eq!(found.original_version(), "1.1.0");
    }
}
