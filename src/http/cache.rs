//! HTTP cache validation module
//!
//! Provides `Last-Modified` generation and `If-Modified-Since` handling.

use chrono::{DateTime, SubsecRound, Utc};
use std::time::SystemTime;

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an IMF-fixdate, e.g. `Fri, 16 Oct 2026 10:00:00 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE).to_string()
}

/// Parse an HTTP date header value
///
/// Accepts the RFC 1123 form sent by browsers and HTTP client libraries.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Check whether a conditional GET may be answered with `304 Not Modified`
///
/// `If-Modified-Since` is ignored when `If-None-Match` is present, and any
/// unparsable date is treated as absent.
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    has_if_none_match: bool,
    modified: SystemTime,
) -> bool {
    if has_if_none_match {
        return false;
    }
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    // HTTP dates carry whole seconds only
    DateTime::<Utc>::from(modified).trunc_subsecs(0) <= since
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_time() -> SystemTime {
        // 2026-10-16T10:00:00Z plus a fraction
        SystemTime::UNIX_EPOCH + Duration::from_millis(1_792_144_800_250)
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(sample_time()), "Fri, 16 Oct 2026 10:00:00 GMT");
    }

    #[test]
    fn test_round_trip_date_is_not_modified() {
        let header = format_http_date(sample_time());
        assert!(is_not_modified(Some(&header), false, sample_time()));
    }

    #[test]
    fn test_older_header_is_modified() {
        assert!(!is_not_modified(
            Some("Thu, 15 Oct 2026 10:00:00 GMT"),
            false,
            sample_time()
        ));
    }

    #[test]
    fn test_if_none_match_disables_date_check() {
        let header = format_http_date(sample_time());
        assert!(!is_not_modified(Some(&header), true, sample_time()));
    }

    #[test]
    fn test_garbage_header_ignored() {
        assert!(!is_not_modified(Some("yesterday"), false, sample_time()));
        assert!(!is_not_modified(None, false, sample_time()));
    }
}
