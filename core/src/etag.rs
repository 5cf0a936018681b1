//! Entity tags and HTTP dates.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::DateTime;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of digest bytes kept in an entity tag.
const TAG_BYTES: usize = 16;

/// Strong entity tag for the JSON serialization of `value`, quoted.
///
/// Equal serializations always produce equal tags.
///
/// # Errors
///
/// Returns the serialization error if `value` cannot be encoded as JSON.
///
/// # Example
///
/// ```
/// use resourceful_core::etag::entity_tag;
///
/// let a = entity_tag(&("book", 1)).unwrap();
/// let b = entity_tag(&("book", 1)).unwrap();
/// assert_eq!(a, b);
/// assert!(a.starts_with('"') && a.ends_with('"'));
/// ```
pub fn entity_tag<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("\"{}\"", URL_SAFE_NO_PAD.encode(&digest[..TAG_BYTES])))
}

/// Format epoch milliseconds as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`).
///
/// Returns `None` for timestamps outside chrono's range.
#[must_use]
pub fn http_date(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|date| date.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}
