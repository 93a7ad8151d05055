//! Semantic version parsing, ordering and constraints

use std::cmp::Ordering;

use semver::{Version as SemVersion, VersionReq};
use tracing::trace;

use updatecli_core::error::{Result, VersionError};

use crate::ordering::first_max_by;

/// Parse a candidate as a semantic version.
///
/// Unless `strict`, a leading `v` is stripped and partial versions are
/// padded with zeros:
/// - "v1" -> 1.0.0
/// - "1.2" -> 1.2.0
/// - "1.2-rc.1" -> 1.2.0-rc.1
pub fn parse_lenient(candidate: &str, strict: bool) -> Option<SemVersion> {
    let candidate = candidate.trim();
    if strict {
        return SemVersion::parse(candidate).ok();
    }

    let stripped = strip_v(candidate);
    let (core, rest) = split_core(stripped);
    let normalized = match core.split('.').count() {
        1 => format!("{}.0.0{}", core, rest),
        2 => format!("{}.0{}", core, rest),
        _ => stripped.to_string(),
    };
    SemVersion::parse(&normalized).ok()
}

/// Compare two versions by semver precedence.
///
/// Build metadata is ignored, so `1.0.0+a` and `1.0.0+b` are equal.
pub fn compare_precedence(a: &SemVersion, b: &SemVersion) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// A semantic version constraint made of `||` alternatives.
///
/// Accepts space or comma separated comparators (`>=1.2.0 <2.0.0`),
/// hyphen ranges (`1.2 - 1.4`), `x` wildcards (`1.x`) and `v` prefixes.
/// A bare version (`1.2.3`) means an exact match and `!=1.2.3` excludes one.
#[derive(Debug, Clone)]
pub struct Constraint {
    raw: String,
    alternatives: Vec<Alternative>,
}

/// Comparators joined by "and", minus the excluded versions
#[derive(Debug, Clone)]
struct Alternative {
    req: VersionReq,
    excluded: Vec<VersionReq>,
}

impl Alternative {
    fn matches(&self, version: &SemVersion) -> bool {
        self.req.matches(version) && !self.excluded.iter().any(|req| req.matches(version))
    }
}

impl Constraint {
    /// Parse a constraint
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Self {
                raw: raw.to_string(),
                alternatives: vec![Alternative {
                    req: VersionReq::STAR,
                    excluded: Vec::new(),
                }],
            });
        }

        let invalid = |reason: String| VersionError::InvalidConstraint {
            constraint: raw.to_string(),
            reason,
        };

        let mut alternatives = Vec::new();
        for alternative in trimmed.split("||") {
            let (comparators, excluded) = normalize_alternative(alternative)
                .ok_or_else(|| invalid("empty alternative".to_string()))?;
            let req = VersionReq::parse(&comparators).map_err(|e| invalid(e.to_string()))?;
            let excluded = excluded
                .iter()
                .map(|version| VersionReq::parse(&format!("={}", version)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| invalid(e.to_string()))?;
            alternatives.push(Alternative { req, excluded });
        }

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// Whether `version` satisfies any alternative
    pub fn matches(&self, version: &SemVersion) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(version))
    }

    /// The constraint as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Greatest `(original, extracted)` pair whose extracted string parses and
/// satisfies `constraint`. Unparsable candidates are skipped.
pub(crate) fn search<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    constraint: &Constraint,
    strict: bool,
) -> Option<(&'a str, SemVersion)> {
    let satisfying = pairs.into_iter().filter_map(|(original, extracted)| {
        let Some(parsed) = parse_lenient(extracted, strict) else {
            trace!(candidate = extracted, "skipping candidate that is not a semantic version");
            return None;
        };
        constraint.matches(&parsed).then_some((original, parsed))
    });

    first_max_by(satisfying, |a, b| compare_precedence(&a.1, &b.1))
}

fn strip_v(s: &str) -> &str {
    s.strip_prefix('v')
        .or_else(|| s.strip_prefix('V'))
        .unwrap_or(s)
}

/// Split `1.2.3-rc.1+b` into `("1.2.3", "-rc.1+b")`
fn split_core(s: &str) -> (&str, &str) {
    let at = s.find(|c: char| c == '-' || c == '+').unwrap_or(s.len());
    s.split_at(at)
}

fn normalize_version(s: &str) -> String {
    let (core, rest) = split_core(strip_v(s.trim()));
    let core = core
        .split('.')
        .map(|part| match part {
            "x" | "X" => "*",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(".");
    format!("{}{}", core, rest)
}

fn split_operator(token: &str) -> (&str, &str) {
    let at = token
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '~' | '^' | '!'))
        .unwrap_or(token.len());
    token.split_at(at)
}

/// Comma separated comparators understood by `semver`, plus the versions
/// excluded with `!=`
fn normalize_alternative(alternative: &str) -> Option<(String, Vec<String>)> {
    let alternative = alternative.trim();
    if alternative.is_empty() {
        return None;
    }

    if let Some((low, high)) = alternative.split_once(" - ") {
        return Some((
            format!(">={}, <={}", normalize_version(low), normalize_version(high)),
            Vec::new(),
        ));
    }

    let mut comparators = Vec::new();
    let mut excluded = Vec::new();
    let mut pending_op = String::new();
    let tokens = alternative
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    for token in tokens {
        let (op, version) = split_operator(token);
        if version.is_empty() {
            // operator written apart from its version: ">= 1.2.0"
            pending_op.push_str(op);
            continue;
        }

        let op = format!("{}{}", std::mem::take(&mut pending_op), op);
        let version = normalize_version(version);
        match op.as_str() {
            "!=" => excluded.push(version),
            "" if !version.contains('*') => comparators.push(format!("={}", version)),
            _ => comparators.push(format!("{}{}", op, version)),
        }
    }

    if !pending_op.is_empty() {
        comparators.push(pending_op);
    }
    if comparators.is_empty() {
        comparators.push("*".to_string());
    }

    Some((comparators.join(", "), excluded))
}
