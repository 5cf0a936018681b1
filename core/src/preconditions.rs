//! Conditional request evaluation.
//!
//! A precondition is *satisfied* when the client proves it holds the current
//! version of the resource, either by entity tag or by timestamp:
//!
//! 1. A client entity tag is compared with the server's by exact string equality.
//! 2. Otherwise a client date is compared with the server timestamp in epoch
//!    milliseconds.
//! 3. Otherwise the precondition is unsatisfied.
//!
//! Reads ask with `If-None-Match`/`If-Modified-Since` (satisfied means "not
//! modified"). Writes ask with `If-Match`/`If-Unmodified-Since` (unsatisfied
//! means "stale copy").

use chrono::{DateTime, NaiveDateTime};
use http::HeaderMap;
use http::header::{
    HeaderName, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE,
};

/// Which validator headers a request is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionPair {
    /// `If-None-Match` and `If-Modified-Since`.
    Read,
    /// `If-Match` and `If-Unmodified-Since`.
    Write,
}

impl PreconditionPair {
    /// Header carrying the client's entity tag.
    #[must_use]
    pub fn validator_header(self) -> HeaderName {
        match self {
            Self::Read => IF_NONE_MATCH,
            Self::Write => IF_MATCH,
        }
    }

    /// Header carrying the client's timestamp.
    #[must_use]
    pub fn timestamp_header(self) -> HeaderName {
        match self {
            Self::Read => IF_MODIFIED_SINCE,
            Self::Write => IF_UNMODIFIED_SINCE,
        }
    }

    /// Evaluate this pair from request headers.
    #[must_use]
    pub fn evaluate(
        self,
        headers: &HeaderMap,
        server_validator: Option<&str>,
        server_timestamp: Option<i64>,
    ) -> bool {
        let client_validator = header_str(headers, &self.validator_header());
        let client_timestamp = header_str(headers, &self.timestamp_header());
        evaluate(server_validator, server_timestamp, client_validator, client_timestamp)
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &HeaderName) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Compare client validators against the server's current ones.
///
/// Empty header values count as absent. Unparseable dates are unsatisfied.
#[must_use]
pub fn evaluate(
    server_validator: Option<&str>,
    server_timestamp: Option<i64>,
    client_validator: Option<&str>,
    client_timestamp: Option<&str>,
) -> bool {
    if let Some(client) = client_validator.filter(|value| !value.is_empty()) {
        return server_validator == Some(client);
    }

    if let Some(client) = client_timestamp.filter(|value| !value.is_empty()) {
        return match (parse_http_date(client), server_timestamp) {
            (Some(client_millis), Some(server_millis)) => client_millis == server_millis,
            _ => false,
        };
    }

    false
}

// Obsolete HTTP date layouts, both always in GMT.
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Parse an HTTP date into epoch milliseconds.
///
/// Accepts IMF-fixdate (RFC 2822), the obsolete RFC 850 and asctime forms
/// HTTP/1.1 recipients must still read, and RFC 3339 timestamps.
#[must_use]
pub fn parse_http_date(value: &str) -> Option<i64> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|date| date.timestamp_millis())
        .or_else(|_| NaiveDateTime::parse_from_str(value, RFC850_FORMAT).map(|date| date.and_utc().timestamp_millis()))
        .or_else(|_| NaiveDateTime::parse_from_str(value, ASCTIME_FORMAT).map(|date| date.and_utc().timestamp_millis()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use proptest::prelude::*;

    #[test]
    fn matching_entity_tag_is_satisfied() {
        assert!(evaluate(Some("abc"), None, Some("abc"), None));
    }

    #[test]
    fn different_entity_tag_is_unsatisfied() {
        assert!(!evaluate(Some("abc"), None, Some("xyz"), None));
    }

    #[test]
    fn no_client_validators_is_unsatisfied() {
        assert!(!evaluate(Some("abc"), Some(1000), None, None));
    }

    #[test]
    fn entity_tag_wins_over_timestamp() {
        let date = "Thu, 01 Jan 1970 00:00:01 GMT";
        assert!(!evaluate(Some("abc"), Some(1000), Some("xyz"), Some(date)));
    }

    #[test]
    fn equal_timestamp_is_satisfied() {
        let date = "Thu, 01 Jan 1970 00:00:01 GMT";
        assert!(evaluate(Some("abc"), Some(1000), None, Some(date)));
        assert!(!evaluate(Some("abc"), Some(2000), None, Some(date)));
    }

    #[test]
    fn rfc3339_timestamps_are_accepted() {
        assert!(evaluate(None, Some(1500), None, Some("1970-01-01T00:00:01.500Z")));
    }

    #[test]
    fn obsolete_http_date_forms_are_accepted() {
        let imf = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(imf, Some(784_111_777_000));
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), imf);
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), imf);
        assert!(evaluate(None, Some(784_111_777_000), None, Some("Sun Nov  6 08:49:37 1994")));
    }

    #[test]
    fn malformed_date_is_unsatisfied() {
        assert!(!evaluate(None, Some(1000), None, Some("yesterday-ish")));
    }

    #[test]
    fn empty_entity_tag_falls_through_to_timestamp() {
        let date = "Thu, 01 Jan 1970 00:00:01 GMT";
        assert!(evaluate(Some("abc"), Some(1000), Some(""), Some(date)));
    }

    #[test]
    fn pairs_read_their_own_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"v1\""));

        assert!(PreconditionPair::Read.evaluate(&headers, Some("\"v1\""), Some(0)));
        assert!(!PreconditionPair::Write.evaluate(&headers, Some("\"v1\""), Some(0)));

        headers.insert(IF_MATCH, HeaderValue::from_static("\"v0\""));
        assert!(!PreconditionPair::Write.evaluate(&headers, Some("\"v1\""), Some(0)));
    }

    proptest! {
        #[test]
        fn entity_tag_equality_decides(server in "[a-z0-9]{1,12}", client in "[a-z0-9]{1,12}") {
            prop_assert_eq!(
                evaluate(Some(server.as_str()), Some(0), Some(client.as_str()), None),
                server == client
            );
        }

        #[test]
        fn arbitrary_dates_never_panic(date in ".*", millis in any::<i64>()) {
            let _ = evaluate(None, Some(millis), None, Some(date.as_str()));
        }
    }
}
