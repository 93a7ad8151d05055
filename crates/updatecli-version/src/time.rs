//! Date based version selection

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::trace;

use updatecli_core::error::{Result, VersionError};

use crate::ordering::first_max_by;

/// Check that `format` is a usable strftime format
pub(crate) fn validate_format(format: &str) -> Result<()> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(VersionError::InvalidConstraint {
            constraint: format.to_string(),
            reason: "invalid date format".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Parse `candidate` with `format` as a zoned date-time, a naive
/// date-time, or a plain date (midnight).
pub(crate) fn parse_time(candidate: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_str(candidate, format) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(candidate, format) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(candidate, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Most recent `(original, extracted)` pair; unparsable candidates are skipped.
pub(crate) fn search<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    format: &str,
) -> Option<(&'a str, &'a str)> {
    let dated = pairs.into_iter().filter_map(|(original, extracted)| {
        let Some(at) = parse_time(extracted, format) else {
            trace!(candidate = extracted, format, "skipping candidate that is not a date");
            return None;
        };
        Some((original, extracted, at))
    });

    first_max_by(dated, |a, b| a.2.cmp(&b.2)).map(|(original, extracted, _)| (original, extracted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let parsed = parse_time("2022-01-13", "%Y-%m-%d").unwrap();
        assert_eq!(parsed.to_string(), "2022-01-13 00:00:00");
    }

    #[test]
    fn test_parse_date_time() {
        let parsed = parse_time("2022-01-13T10:30:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        assert_eq!(parsed.to_string(), "2022-01-13 10:30:00");
    }

    #[test]
    fn test_parse_rejects_other_layouts() {
        assert!(parse_time("2022_01_13", "%Y-%m-%d").is_none());
        assert!(parse_time("alpine", "%Y-%m-%d").is_none());
    }

    #[test]
    fn test_search_picks_most_recent() {
        let found = search(
            [
                ("2022-01-13", "2022-01-13"),
                ("2023-05-01", "2023-05-01"),
                ("2021-12-31", "2021-12-31"),
            ],
            "%Y-%m-%d",
        );
        assert_eq!(found, Some(("2023-05-01", "2023-05-01")));
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("%Y-%m-%d").is_ok());
        assert!(validate_format("%Q").is_err());
        assert!(validate_format("").is_err());
    }
}
